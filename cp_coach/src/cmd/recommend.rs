use crate::{
    cmd::print_json,
    modules::{context::Context, settings::Settings},
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct RecommendArgs {
    #[arg(long)]
    user: Option<String>,
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    count: i64,
}

pub async fn run(args: RecommendArgs) -> Result<()> {
    let context = Context::connect(&Settings::from_env()).await?;
    let problems = context
        .selector
        .recommend(context.user(&args.user), args.count)
        .await;
    tracing::info!("{} problems recommended", problems.len());
    print_json(&problems)
}
