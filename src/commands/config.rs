//! Config command handler.

use crate::args::ConfigSubcommand;
use crate::commands::Out;
use crate::config::Paths;
use crate::period::Period;
use crate::{Config, Result};

/// Shows the configured locations, or changes one of them and rewrites `config.json`.
///
/// Moving a directory does not move the sheets already in it.
pub fn config(mut config: Config, action: &ConfigSubcommand) -> Result<Out<Paths>> {
    let changed = match action {
        ConfigSubcommand::Show => None,
        ConfigSubcommand::SetBase { dir } => {
            config.set_base_dir(dir.clone())?;
            Some("base")
        }
        ConfigSubcommand::SetSales { dir } => {
            config.set_sales_dir(dir.clone())?;
            Some("sales")
        }
        ConfigSubcommand::SetCosts { dir } => {
            config.set_costs_dir(dir.clone())?;
            Some("costs")
        }
    };

    let paths = config.paths();
    let period = Period::current();
    let mut message = match changed {
        Some(what) => format!("Changed the {what} directory\n"),
        None => String::new(),
    };
    message.push_str(&format!(
        "config file:   {}\n\
         base dir:      {}\n\
         sales:         {}\n\
         costs ({period}): {}\n\
         balance ({}):  {}\n\
         frequencies:   {}",
        config.config_path().display(),
        paths.base_dir().display(),
        paths.sales_file().display(),
        paths.costs_file(period).display(),
        period.year(),
        paths.balance_file(period.year()).display(),
        paths.frequencies_file(period).display(),
    ));
    Ok(Out::new(message, paths.clone()))
}
