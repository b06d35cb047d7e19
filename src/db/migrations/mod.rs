//! Versioned schema changes for the month store.
//!
//! Schema version `n` is reached by running `STEPS[n - 1].up` and left again by running
//! `STEPS[n - 1].down`. The scripts sit next to this file as `migration_NN_up.sql` and
//! `migration_NN_down.sql`.

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::Result;

struct Step {
    up: &'static str,
    down: &'static str,
}

const STEPS: &[Step] = &[
    // 1: the current month document of each account
    Step {
        up: include_str!("migration_01_up.sql"),
        down: include_str!("migration_01_down.sql"),
    },
    // 2: closed months
    Step {
        up: include_str!("migration_02_up.sql"),
        down: include_str!("migration_02_down.sql"),
    },
];

/// The schema version this build reads and writes.
pub(crate) const CURRENT_VERSION: i32 = STEPS.len() as i32;

/// A script together with the schema version that holds once it has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Planned {
    sql: &'static str,
    version_after: i32,
}

/// Moves the schema at `from` to `to`, upgrading or downgrading one version at a time. Every
/// step commits together with its `schema_version` update, so a failed step leaves the database
/// at the last version that was reached.
pub(crate) async fn run(pool: &SqlitePool, from: i32, to: i32) -> Result<()> {
    let steps = plan(from, to)?;
    if steps.is_empty() {
        debug!("Schema already at version {to}");
        return Ok(());
    }
    for step in steps {
        apply(pool, step)
            .await
            .with_context(|| format!("Schema migration to version {} failed", step.version_after))?;
        debug!("Schema now at version {}", step.version_after);
    }
    Ok(())
}

/// Resolves the scripts between two versions before anything is executed.
fn plan(from: i32, to: i32) -> Result<Vec<Planned>> {
    let known = 0..=CURRENT_VERSION;
    if !known.contains(&from) || !known.contains(&to) {
        bail!(
            "Cannot migrate the schema from version {from} to {to}, \
             this build knows versions 0 to {CURRENT_VERSION}"
        );
    }
    let (low, high) = (from.min(to), from.max(to));
    let range = STEPS[low as usize..high as usize].iter().zip(low..high);
    let steps = if from <= to {
        range
            .map(|(step, v)| Planned {
                sql: step.up,
                version_after: v + 1,
            })
            .collect()
    } else {
        range
            .rev()
            .map(|(step, v)| Planned {
                sql: step.down,
                version_after: v,
            })
            .collect()
    };
    Ok(steps)
}

async fn apply(pool: &SqlitePool, step: Planned) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;
    tx.execute(step.sql)
        .await
        .context("Failed to execute migration SQL")?;
    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(step.version_after)
        .execute(&mut *tx)
        .await
        .context("Failed to record the schema version")?;
    tx.commit()
        .await
        .context("Failed to commit migration transaction")?;
    Ok(())
}
