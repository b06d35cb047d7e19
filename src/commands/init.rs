use crate::args::InitArgs;
use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories, an initial `config.json` and the database.
///
/// # Arguments
/// - `cashbook_home` - The directory that will be the root of data directory, e.g. `$HOME/cashbook`
/// - `args` - The shop name and optional account id.
///
/// # Errors
/// - Returns an error if any file operations fail or if the directory is already initialized.
pub async fn init(cashbook_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let config = Config::create(cashbook_home, args.shop_name(), args.account_id())
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the cashbook for {} at {}",
        config.shop_name(),
        config.root().display()
    )
    .into())
}
