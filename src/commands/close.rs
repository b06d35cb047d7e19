use crate::access::{Credentials, Permission};
use crate::args::CloseArgs;
use crate::backup::CLOSE;
use crate::commands::{authorize, load_month, save_month, Out};
use crate::store::Store;
use crate::{Config, Result};
use anyhow::bail;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{info, warn};

/// Closes the current month: writes a backup, archives the month so that it can still be
/// summarized and exported, then replaces it with an empty month for the period containing
/// `today`. Needs an admin. Returns the path of the backup.
///
/// A period that already has an archived copy is refused unless `args.replace_archive` is set.
pub async fn close(
    config: &Config,
    credentials: Option<Credentials<'_>>,
    today: NaiveDate,
    args: &CloseArgs,
) -> Result<Out<PathBuf>> {
    authorize(config, credentials, Permission::Administer)?;
    let month = load_month(config, today).await?;

    let archived = config
        .store()
        .load_archived(config.account_id(), month.month_index, month.year)
        .await?;
    if archived.is_some() {
        if !args.replace_archive {
            bail!(
                "{} was already closed, use --replace-archive to overwrite the archived copy",
                month.period_label()
            );
        }
        warn!("Replacing the archived copy of {}", month.period_label());
    }

    let backup = config.backup().save_json(CLOSE, &month).await?;
    info!("Backed up {} to {}", month.period_label(), backup.display());
    config.store().archive(config.account_id(), &month).await?;

    let next = month.closed(today, !args.clear_fixed);
    save_month(config, &next).await?;

    let fixed = if args.clear_fixed {
        "with empty fixed expenses"
    } else {
        "carrying over the fixed expenses"
    };
    Ok(Out::new(
        format!(
            "Closed {}, started {} {fixed}",
            month.period_label(),
            next.period_label()
        ),
        backup,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{AddTransactionArgs, UtilityArgs};
    use crate::commands::{add_fixed_item, add_transaction, NewFixedItem};
    use crate::model::{Amount, TransactionKind};
    use crate::test::TestEnv;

    async fn fill(env: &TestEnv) {
        let config = env.config();
        let args = AddTransactionArgs {
            day: 8,
            kind: TransactionKind::CashSale,
            amount: Amount::from(30000),
            description: String::new(),
        };
        add_transaction(&config, None, env.today(), &args)
            .await
            .unwrap();
        let water = NewFixedItem::Utility(UtilityArgs {
            name: "water".to_string(),
            amount: Amount::from(50000),
        });
        add_fixed_item(&config, None, env.today(), &water)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_close_keeps_fixed_expenses() {
        let env = TestEnv::new().await;
        fill(&env).await;
        let config = env.config();
        let next_month = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();

        let out = close(&config, None, next_month, &CloseArgs::default())
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_file());
        assert!(out.message().contains("NOVEMBER 2026"));

        let month = load_month(&config, next_month).await.unwrap();
        assert_eq!(month.month_index, 10);
        assert!(month.days.is_empty());
        assert_eq!(month.fixed_expenses.utilities.len(), 1);

        let archived = config
            .store()
            .load_archived(config.account_id(), 9, 2026)
            .await
            .unwrap();
        assert!(archived.is_some());
    }

    #[tokio::test]
    async fn test_close_can_clear_fixed_expenses() {
        let env = TestEnv::new().await;
        fill(&env).await;
        let config = env.config();
        close(&config, None, env.today(), &CloseArgs {
                clear_fixed: true,
                ..CloseArgs::default()
            })
            .await
            .unwrap();
        let month = load_month(&config, env.today()).await.unwrap();
        assert!(month.fixed_expenses.utilities.is_empty());
    }

    #[tokio::test]
    async fn test_second_close_of_a_period_is_refused() {
        let env = TestEnv::new().await;
        fill(&env).await;
        let config = env.config();
        let today = env.today();
        close(&config, None, today, &CloseArgs::default())
            .await
            .unwrap();
        let first = config
            .store()
            .load_archived(config.account_id(), 9, 2026)
            .await
            .unwrap()
            .unwrap();

        // The reopened October is empty; closing it again must not clobber the first archive.
        let err = close(&config, None, today, &CloseArgs::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already closed"));
        let kept = config
            .store()
            .load_archived(config.account_id(), 9, 2026)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept, first);

        let args = CloseArgs {
            replace_archive: true,
            ..CloseArgs::default()
        };
        close(&config, None, today, &args).await.unwrap();
        let replaced = config
            .store()
            .load_archived(config.account_id(), 9, 2026)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(replaced, first);
    }

    #[tokio::test]
    async fn test_close_needs_admin() {
        let env = TestEnv::with_operators().await;
        let config = env.config();
        let employee = Some(Credentials {
            name: "Ana",
            pin: "0000",
        });
        let args = CloseArgs::default();
        assert!(close(&config, employee, env.today(), &args).await.is_err());
    }
}
