use crate::report::{Cell, Report, Table};
use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes a `Report` as a directory of CSV files, one per table, named
/// `<out>/<file stem>/<NN>-<table>.csv` so that a directory listing keeps the table order.
#[derive(Debug, Clone)]
pub struct CsvRenderer {
    out_dir: PathBuf,
}

impl CsvRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Renders every table of `report` and returns the directory that holds them. Files from an
    /// earlier export of the same month are overwritten.
    pub async fn render(&self, report: &Report) -> Result<PathBuf> {
        let dir = self.out_dir.join(&report.file_stem);
        utils::make_dir(&dir).await?;
        for (ix, table) in report.tables.iter().enumerate() {
            let path = dir.join(table_file_name(ix, &table.name));
            write_table(&path, table).await?;
        }
        debug!("Wrote {} tables to {}", report.tables.len(), dir.display());
        Ok(dir)
    }
}

fn table_file_name(ix: usize, name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("{:02}-{slug}.csv", ix + 1)
}

async fn write_table(path: &Path, table: &Table) -> Result<()> {
    // Rows have different lengths: a title row has two cells, a transaction row six.
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in &table.rows {
        let fields: Vec<String> = row.cells.iter().map(cell_text).collect();
        writer
            .write_record(&fields)
            .with_context(|| format!("Failed to encode table '{}'", table.name))?;
    }
    let bytes = writer
        .into_inner()
        .with_context(|| format!("Failed to flush table '{}'", table.name))?;
    utils::write(path, bytes).await
}

/// Amounts are written as plain numbers, without thousands separators, so that spreadsheet
/// programs read them as numbers.
fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        Cell::Amount(a) => a.value().normalize().to_string(),
        Cell::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::SupplierSpend;
    use crate::model::{Amount, Month, Transaction, TransactionKind};
    use crate::report::build_report;
    use tempfile::TempDir;

    #[test]
    fn test_table_file_name() {
        assert_eq!(table_file_name(0, "Day 01"), "01-day-01.csv");
        assert_eq!(table_file_name(31, "Summary"), "32-summary.csv");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Cell::Amount(Amount::from(85000))), "85000");
        assert_eq!(cell_text(&Cell::Amount("12.50".parse().unwrap())), "12.5");
        assert_eq!(cell_text(&Cell::Empty), "");
    }

    #[tokio::test]
    async fn test_render_writes_one_file_per_table() {
        let temp = TempDir::new().unwrap();
        let mut month = Month::for_period(1, 2026);
        month.add_transaction(
            3,
            Transaction::new(
                "rin, 14\"",
                Amount::from(45000),
                TransactionKind::CashSale,
                None,
            ),
        );
        let report = build_report(&month, "Districauchos", SupplierSpend::default());

        let dir = CsvRenderer::new(temp.path()).render(&report).await.unwrap();
        assert_eq!(
            dir,
            temp.path().join("Accounting_Districauchos_February_2026")
        );
        let count = std::fs::read_dir(&dir).unwrap().count();
        assert_eq!(count, 29);

        let day3 = std::fs::read_to_string(dir.join("03-day-03.csv")).unwrap();
        assert!(day3.contains("\"rin, 14\"\"\",Cash sale,45000,,,"));
        let summary = std::fs::read_to_string(dir.join("29-summary.csv")).unwrap();
        assert!(summary.contains("(no entries)"));
    }
}
