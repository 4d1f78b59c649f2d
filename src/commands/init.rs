use crate::args::InitArgs;
use crate::commands::Out;
use crate::config::Paths;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Item, Sale};
use crate::store::Store;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;
use tracing::warn;

/// Creates the nursery home, its subdirectories and:
/// - Creates an initial `config.json` file pointing at the base directory
/// - Creates an empty sales sheet in the sales directory
///
/// # Arguments
/// - `nursery_home` - The directory that will hold `config.json`, e.g. `$HOME/nursery`
/// - `args` - The base directory, and whether an existing sales sheet should be replaced. With
///   `force`, an existing configuration is reused instead of being an error.
///
/// # Errors
/// - Returns an error if the configuration already exists and `force` is not set.
/// - Returns an error if any file operations fail.
pub fn init(nursery_home: &Path, args: &InitArgs) -> Result<Out<Paths>> {
    let existing = match args.force() {
        true => Config::load(nursery_home).ok(),
        false => None,
    };
    let config = match existing {
        Some(config) => {
            warn!("Reusing the existing configuration in {}", nursery_home.display());
            config
        }
        None => Config::create(nursery_home, args.base_dir().map(Path::to_path_buf))
            .context("Unable to create the nursery directory and config")
            .pub_result(ErrorType::Config)?,
    };

    let sales_file = config.paths().sales_file();
    let created = Store::csv().create_if_missing(
        &sales_file,
        Sale::headers(),
        Vec::<Vec<String>>::new(),
        args.force(),
    )?;
    let message = if created {
        format!(
            "Created the nursery configuration and an empty sales sheet at {}",
            sales_file.display()
        )
    } else {
        format!(
            "Created the nursery configuration, kept the existing sales sheet at {}",
            sales_file.display()
        )
    };
    Ok(Out::new(message, config.paths().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_config_and_sales() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("nursery");
        let out = init(&home, &InitArgs::new(None, false)).unwrap();
        let paths = out.structure().unwrap();
        assert!(home.join("config.json").is_file());
        assert!(paths.base_dir().join("costs").is_dir());
        assert!(paths.base_dir().join("balances").is_dir());
        assert!(paths.base_dir().join("frequencies").is_dir());
        let rows = Store::csv().load(&paths.sales_file()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "Date");
    }

    #[test]
    fn test_init_twice_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("nursery");
        init(&home, &InitArgs::new(None, false)).unwrap();
        let err = init(&home, &InitArgs::new(None, false)).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[test]
    fn test_force_recreates_sales() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("nursery");
        let base = dir.path().join("sheets");
        let out = init(&home, &InitArgs::new(Some(base.clone()), false)).unwrap();
        let sales_file = out.structure().unwrap().sales_file();
        assert_eq!(sales_file, base.join("sales.csv"));

        let store = Store::csv();
        store
            .save(
                &sales_file,
                Sale::headers(),
                vec![vec!["2024-03-15", "Rose", "1", "5", "5", "Maria", "cash"]],
            )
            .unwrap();
        init(&home, &InitArgs::new(None, true)).unwrap();
        assert_eq!(store.load(&sales_file).unwrap().len(), 1);
    }
}
