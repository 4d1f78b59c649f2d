//! Configuration file handling for the nursery ledger.
//!
//! The configuration file is stored at `$NURSERY_HOME/config.json`. It says where the spreadsheet
//! files live: a base directory with one subfolder per dataset, and optionally separate
//! directories for the sales and costs sheets.

use crate::error::{ErrorType, IntoResult, Res, Result};
use crate::period::Period;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_NAME: &str = "nursery";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DEFAULT_BASE_DIR: &str = "data";
const COSTS: &str = "costs";
const BALANCES: &str = "balances";
const FREQUENCIES: &str = "frequencies";
const SALES_CSV: &str = "sales.csv";
const EXT: &str = "csv";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$NURSERY_HOME` and from there it loads `$NURSERY_HOME/config.json`. It provides
/// the paths of every spreadsheet file through `paths()`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    paths: Paths,
}

impl Config {
    /// Creates the home directory, writes an initial `config.json` and creates the base directory
    /// with its dataset subfolders.
    ///
    /// # Arguments
    /// - `dir` - The nursery home directory, e.g. `$HOME/nursery`
    /// - `base_dir` - Where the spreadsheet files go. A relative path is resolved against `dir`.
    ///   When `None`, `data` inside the home directory is used.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if `config.json` already exists.
    pub fn create(dir: impl Into<PathBuf>, base_dir: Option<PathBuf>) -> Result<Self> {
        Self::create_inner(dir.into(), base_dir).pub_result(ErrorType::Config)
    }

    fn create_inner(maybe_relative: PathBuf, base_dir: Option<PathBuf>) -> Res<Self> {
        utils::make_dir(&maybe_relative).context("Unable to create the nursery home directory")?;
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A configuration file already exists at '{}'",
                config_path.display()
            );
        }

        let config_file = ConfigFile {
            base_dir: base_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR)),
            ..Default::default()
        };
        config_file.save(&config_path)?;

        let paths = Paths::resolve(&root, &config_file);
        paths.make_dirs()?;
        debug!("Created the configuration at {}", config_path.display());

        Ok(Self {
            root,
            config_path,
            config_file,
            paths,
        })
    }

    /// This will
    /// - validate that the nursery home exists and that the config file exists
    /// - load the config file
    /// - return the loaded configuration object
    pub fn load(nursery_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(nursery_home.into()).pub_result(ErrorType::Config)
    }

    fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        if !maybe_relative.is_dir() {
            bail!(
                "The nursery home '{}' is missing, run 'nursery init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path)?;
        let paths = Paths::resolve(&root, &config_file);
        if !paths.base_dir.is_dir() {
            warn!(
                "The base directory '{}' does not exist, it will be created when a sheet is saved",
                paths.base_dir.display()
            );
        }

        Ok(Self {
            root,
            config_path,
            config_file,
            paths,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Points the ledger at a new base directory, creates its subfolders and rewrites the config
    /// file.
    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) -> Result<()> {
        self.config_file.base_dir = dir.into();
        self.apply().pub_result(ErrorType::Config)
    }

    /// Keeps the sales sheet in its own directory. `None` puts it back in the base directory.
    pub fn set_sales_dir(&mut self, dir: Option<PathBuf>) -> Result<()> {
        self.config_file.sales_dir = dir;
        self.apply().pub_result(ErrorType::Config)
    }

    /// Keeps the monthly costs sheets in their own directory. `None` puts them back in the
    /// `costs` folder of the base directory.
    pub fn set_costs_dir(&mut self, dir: Option<PathBuf>) -> Result<()> {
        self.config_file.costs_dir = dir;
        self.apply().pub_result(ErrorType::Config)
    }

    fn apply(&mut self) -> Res<()> {
        let paths = Paths::resolve(&self.root, &self.config_file);
        paths.make_dirs()?;
        self.config_file.save(&self.config_path)?;
        self.paths = paths;
        Ok(())
    }
}

/// The resolved locations of every spreadsheet file.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Paths {
    base_dir: PathBuf,
    sales_dir: PathBuf,
    costs_dir: PathBuf,
    balances_dir: PathBuf,
    frequencies_dir: PathBuf,
}

impl Paths {
    fn resolve(root: &Path, config_file: &ConfigFile) -> Self {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            }
        };
        let base_dir = resolve(config_file.base_dir.as_path());
        Self {
            sales_dir: config_file
                .sales_dir
                .as_deref()
                .map(resolve)
                .unwrap_or_else(|| base_dir.clone()),
            costs_dir: config_file
                .costs_dir
                .as_deref()
                .map(resolve)
                .unwrap_or_else(|| base_dir.join(COSTS)),
            balances_dir: base_dir.join(BALANCES),
            frequencies_dir: base_dir.join(FREQUENCIES),
            base_dir,
        }
    }

    /// A base directory with the default layout.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            sales_dir: base_dir.clone(),
            costs_dir: base_dir.join(COSTS),
            balances_dir: base_dir.join(BALANCES),
            frequencies_dir: base_dir.join(FREQUENCIES),
            base_dir,
        }
    }

    fn make_dirs(&self) -> Res<()> {
        for dir in [
            &self.base_dir,
            &self.sales_dir,
            &self.costs_dir,
            &self.balances_dir,
            &self.frequencies_dir,
        ] {
            utils::make_dir(dir)?;
        }
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn sales_file(&self) -> PathBuf {
        self.sales_dir.join(SALES_CSV)
    }

    /// e.g. `costs/costs_2024_03.csv`
    pub fn costs_file(&self, period: Period) -> PathBuf {
        self.costs_dir
            .join(format!("costs_{}", period.file_suffix()))
            .with_extension(EXT)
    }

    /// e.g. `balances/balance_2024.csv`
    pub fn balance_file(&self, year: i32) -> PathBuf {
        self.balances_dir
            .join(format!("balance_{year}"))
            .with_extension(EXT)
    }

    /// e.g. `frequencies/frequencies_2024_03.csv`
    pub fn frequencies_file(&self, period: Period) -> PathBuf {
        self.frequencies_dir
            .join(format!("frequencies_{}", period.file_suffix()))
            .with_extension(EXT)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "nursery",
///   "config_version": 1,
///   "base_dir": "/home/ana/Documents/Nursery",
///   "sales_dir": "/home/ana/Dropbox/Sales"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "nursery"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The root of the dataset subfolders, relative to the nursery home or absolute
    base_dir: PathBuf,

    /// Where `sales.csv` lives. Defaults to the base directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sales_dir: Option<PathBuf>,

    /// Where the monthly costs sheets live. Defaults to the `costs` folder of the base directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    costs_dir: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            sales_dir: None,
            costs_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    fn load(path: impl AsRef<Path>) -> Res<Self> {
        let config: ConfigFile = utils::deserialize(path.as_ref())?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data).context("Unable to write config file")
    }
}
