use crate::{
    cmd::print_json,
    modules::{context::Context, settings::Settings},
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[arg(long)]
    user: Option<String>,
    /// Recompute instead of reading the cached classification
    #[arg(long)]
    fresh: bool,
}

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let context = Context::connect(&Settings::from_env()).await?;
    let user_id = context.user(&args.user);

    let result = context.classifier.classify_tags(user_id, !args.fresh).await;
    print_json(&result)
}
