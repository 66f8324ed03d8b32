//! config command - Inspect the active configuration

use anyhow::{Context as _, Result};
use serde_json::json;

use super::{print_json, Context};
use crate::core::config::Config;

/// Show the selected adapter with secrets redacted.
pub fn show(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let adapter = ctx.load_adapter()?.redacted();

    let rendered = serde_json::to_value(&adapter).context("Failed to render adapter")?;
    print_json(&json!({
        "path": config.loaded_from().map(|p| p.display().to_string()),
        "adapter": rendered,
    }))
}

/// Print the config file in use, or where one would be read from.
pub fn path(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let path = match config.loaded_from() {
        Some(path) => path.to_path_buf(),
        None => Config::default_path().context("Failed to locate config directory")?,
    };
    println!("{}", path.display());
    Ok(())
}
