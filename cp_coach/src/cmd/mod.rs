pub mod analyze;
pub mod plan;
pub mod recommend;
pub mod server;
pub mod summary;
pub mod sync;

use anyhow::{Context, Result};
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).with_context(|| {
        let message = "failed to serialize command output";
        tracing::error!(message);
        message
    })?;
    println!("{}", json);
    Ok(())
}
