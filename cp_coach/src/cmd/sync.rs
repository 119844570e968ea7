use crate::modules::{context::Context, settings::Settings};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[arg(long)]
    user: Option<String>,
}

pub async fn run(args: SyncArgs) -> Result<()> {
    let context = Context::connect(&Settings::from_env()).await?;
    let user_id = context.user(&args.user);

    let report = context.sync.run(user_id, &context.handles).await;
    tracing::info!(
        "sync of {} finished: synced={:?} failed={:?} skipped={:?}",
        user_id,
        report.synced,
        report.failed,
        report.skipped
    );

    if !report.failed.is_empty() && report.synced.is_empty() {
        let message = format!("practice sync failed for {:?}", report.failed);
        tracing::error!(message);
        anyhow::bail!(message);
    }

    Ok(())
}
