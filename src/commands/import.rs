use crate::access::{Credentials, Permission};
use crate::args::ImportArgs;
use crate::backup::IMPORT;
use crate::commands::{authorize, check_day, load_month, save_month, Out};
use crate::model::Day;
use crate::ocr::{draft_day, Ocr};
use crate::{Config, Result};
use chrono::NaiveDate;
use tracing::info;

/// Reads transactions from the extraction files in `args` and records them on a day.
///
/// The extracted transactions are appended to the day unless `args.replace` is set, in which
/// case the day is replaced by the draft and a backup of the month is written first. Returns the
/// day as stored.
pub async fn import(
    config: &Config,
    credentials: Option<Credentials<'_>>,
    today: NaiveDate,
    args: &ImportArgs,
    ocr: &dyn Ocr,
) -> Result<Out<Day>> {
    let created_by = authorize(config, credentials, Permission::Record)?;
    let mut month = load_month(config, today).await?;
    if let Some(day) = args.day {
        check_day(&month, day)?;
    }

    let extraction = ocr.extract(&args.files).await?;
    let draft = draft_day(&month, &extraction, args.day, today, created_by.as_deref())?;
    let day_number = draft.day_number;
    let count = draft.transactions.len();

    if args.replace {
        let path = config.backup().save_json(IMPORT, &month).await?;
        info!("Backed up the month to {}", path.to_string_lossy());
        month.upsert_day(draft);
    } else {
        for transaction in draft.transactions {
            month.add_transaction(day_number, transaction);
        }
    }
    save_month(config, &month).await?;

    let stored = month.day(day_number).cloned().unwrap_or_else(|| Day::new(day_number));
    let verb = if args.replace { "Replaced" } else { "Added" };
    Ok(Out::new(
        format!("{verb} {count} imported transactions on day {day_number}"),
        stored,
    ))
}
