use cashbook::args::{Args, Command, DaySubcommand, FixedSubcommand};
use cashbook::commands::{self, FixedAmount, NewFixedItem};
use cashbook::ocr::JsonFileOcr;
use cashbook::{Config, Result};
use chrono::Local;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().cashbook_home().path();
    let creds = args.common().credentials();

    // The only place the clock is read. Everything below receives the date.
    let today = Local::now().date_naive();

    if let Command::Init(init_args) = args.command() {
        commands::init(home, init_args).await?.print();
        return Ok(());
    }
    let config = Config::load(home).await?;

    // Route to appropriate command handler
    let _: () = match args.command() {
        // Handled before the config is loaded.
        Command::Init(_) => {}

        Command::Day(day) => match day {
            DaySubcommand::Show(a) => commands::show_day(&config, today, a.day).await?.print(),
            DaySubcommand::Add(a) => commands::add_transaction(&config, creds, today, a)
                .await?
                .print(),
            DaySubcommand::Remove(a) => commands::remove_transaction(&config, creds, today, a)
                .await?
                .print(),
            DaySubcommand::Float(a) => commands::set_day_float(&config, creds, today, a)
                .await?
                .print(),
        },

        Command::Fixed(fixed) => {
            let item = match fixed {
                FixedSubcommand::Utility(a) => NewFixedItem::Utility(a.clone()),
                FixedSubcommand::Payroll(a) => NewFixedItem::Payroll(a.clone()),
                FixedSubcommand::Bank(a) => NewFixedItem::Bank(a.clone()),
                FixedSubcommand::Occasional(a) => NewFixedItem::Occasional(a.clone()),
                FixedSubcommand::Formal(a) => NewFixedItem::Formal(a.clone()),
                FixedSubcommand::Rent(a) => {
                    let which = FixedAmount::Rent;
                    commands::set_fixed_amount(&config, creds, today, which, a.amount)
                        .await?
                        .print();
                    return Ok(());
                }
                FixedSubcommand::Other(a) => {
                    let which = FixedAmount::Other;
                    commands::set_fixed_amount(&config, creds, today, which, a.amount)
                        .await?
                        .print();
                    return Ok(());
                }
                FixedSubcommand::Remove(a) => {
                    commands::remove_fixed_item(&config, creds, today, a.category, &a.id)
                        .await?
                        .print();
                    return Ok(());
                }
            };
            commands::add_fixed_item(&config, creds, today, &item)
                .await?
                .print()
        }

        Command::DefaultFloat(a) => commands::set_default_float(&config, creds, today, a.amount)
            .await?
            .print(),

        Command::Summary(a) => commands::summary(&config, today, a).await?.print(),

        Command::Export(a) => commands::export(&config, today, a).await?.print(),

        Command::Import(a) => commands::import(&config, creds, today, a, &JsonFileOcr)
            .await?
            .print(),

        Command::Close(a) => commands::close(&config, creds, today, a).await?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
