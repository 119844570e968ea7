use crate::{
    cmd::print_json,
    modules::{context::Context, settings::Settings},
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[arg(long)]
    user: Option<String>,
}

pub async fn run(args: PlanArgs) -> Result<()> {
    let context = Context::connect(&Settings::from_env()).await?;
    let plan = context.planner.build_plan(context.user(&args.user)).await;
    print_json(&plan)
}
