use crate::args::ExportArgs;
use crate::commands::{load_period, Out};
use crate::report::{build_report, CsvRenderer};
use crate::{Config, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::debug;

/// Writes the report of the current month, or of a closed one, as CSV files under `args.out`.
/// Returns the directory holding the files.
pub async fn export(config: &Config, today: NaiveDate, args: &ExportArgs) -> Result<Out<PathBuf>> {
    let month = load_period(config, args.period.archived(), today).await?;
    let report = build_report(&month, config.shop_name(), config.supplier_spend());
    debug!(
        "Built {} tables for {}",
        report.tables.len(),
        month.period_label()
    );
    let dir = CsvRenderer::new(&args.out).render(&report).await?;
    Ok(Out::new(
        format!(
            "Exported {} to {}",
            month.period_label(),
            dir.to_string_lossy()
        ),
        dir,
    ))
}
