use clap::Parser;
use nursery_ledger::args::{
    Args, BalanceSubcommand, Command, CostsSubcommand, SalesSubcommand,
};
use nursery_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args)?.print(),

        Command::Config(config_args) => {
            commands::config(Config::load(home)?, config_args.action())?.print()
        }

        Command::Sales(sales_args) => {
            let config = Config::load(home)?;
            match sales_args.action() {
                SalesSubcommand::List(args) => commands::sales_list(&config, args)?.print(),
                SalesSubcommand::Add(updates) => {
                    commands::sales_add(&config, *updates.clone())?.print()
                }
                SalesSubcommand::Edit(args) => commands::sales_edit(&config, args)?.print(),
                SalesSubcommand::Delete(args) => commands::sales_delete(&config, args)?.print(),
                SalesSubcommand::Duplicate(args) => {
                    commands::sales_duplicate(&config, args)?.print()
                }
            }
        }

        Command::Costs(costs_args) => {
            let config = Config::load(home)?;
            match costs_args.action() {
                CostsSubcommand::List { period } => commands::costs_list(&config, period)?.print(),
                CostsSubcommand::Add { period, updates } => {
                    commands::costs_add(&config, period, updates.clone())?.print()
                }
                CostsSubcommand::Edit {
                    period,
                    row,
                    updates,
                } => commands::costs_edit(&config, period, *row, updates.clone())?.print(),
                CostsSubcommand::Delete { period, args } => {
                    commands::costs_delete(&config, period, args)?.print()
                }
                CostsSubcommand::Duplicate { period, args } => {
                    commands::costs_duplicate(&config, period, args)?.print()
                }
            }
        }

        Command::Frequencies(frequencies_args) => {
            commands::frequencies(&Config::load(home)?, frequencies_args)?.print()
        }

        Command::Balance(balance_args) => {
            let config = Config::load(home)?;
            match balance_args.action() {
                BalanceSubcommand::Show { year } => {
                    commands::balance_show(&config, *year)?.print()
                }
                BalanceSubcommand::Split { period, a, b, c } => {
                    commands::balance_split(&config, period, *a, *b, *c)?.print()
                }
                BalanceSubcommand::CopySplit { year, from, to } => {
                    commands::balance_copy_split(&config, *year, *from, to)?.print()
                }
                BalanceSubcommand::ResetSplit { year, months, yes } => {
                    commands::balance_reset_split(&config, *year, months, *yes)?.print()
                }
            }
        }
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
            // RUST_LOG does not exist; use the log level for this crate and binary only.
            EnvFilter::new(format!(
                "nursery_ledger={},{}={}",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
