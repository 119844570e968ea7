use crate::{
    cmd::print_json,
    modules::{context::Context, settings::Settings},
};
use anyhow::Result;
use clap::Args;
use cp_coach_libs::analytics::summary::summarize_practice;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[arg(long)]
    user: Option<String>,
    #[arg(long, default_value_t = 30)]
    days: u32,
}

pub async fn run(args: SummaryArgs) -> Result<()> {
    let context = Context::connect(&Settings::from_env()).await?;
    let summary = summarize_practice(
        context.history.as_ref(),
        context.clock.as_ref(),
        context.user(&args.user),
        args.days,
    )
    .await;
    print_json(&summary)
}
