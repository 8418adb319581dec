use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DataConfig {
    pub users_csv: String,
    pub orders_csv: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReportConfig {
    pub top_countries_limit: usize,
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                users_csv: "data/users.csv".to_string(),
                orders_csv: "data/orders.csv".to_string(),
            },
            report: ReportConfig {
                top_countries_limit: crate::views::DEFAULT_TOP_COUNTRIES,
                pretty: false,
            },
        }
    }
}

thread_local! {
    static TEST_CONFIG_PATH: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
}

#[cfg(test)]
pub fn set_test_config_path(path: PathBuf) {
    TEST_CONFIG_PATH.with(|p| *p.borrow_mut() = Some(path));
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(test)]
        {
            if let Some(path) = TEST_CONFIG_PATH.with(|p| p.borrow().clone()) {
                return Ok(path);
            }
        }

        Ok(dirs::home_dir()
            .context("Could not find home directory")?
            .join(".storelens.toml"))
    }

    pub fn load() -> Result<Option<Config>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(Some(config))
    }

    pub fn save(&self, silent: bool) -> Result<()> {
        let config_path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context("Failed to write config file")?;

        if !silent {
            println!("Configuration saved to: {}", config_path.display());
        }

        Ok(())
    }
}

// CLI helper functions
pub fn create_default_config(overwrite: bool) -> Result<()> {
    let config = Config::default();
    if !std::fs::exists(Config::config_path()?)? || overwrite {
        config.save(true)?;

        println!("Created default configuration file:");
        println!("   {}", Config::config_path()?.display());
        println!("Point it at your CSV exports with:");
        println!("   storelens config set users-csv path/to/users.csv");
        println!("   storelens config set orders-csv path/to/orders.csv");
    } else {
        println!("Configuration already exists.  Pass `--overwrite` to overwrite.");
    }

    Ok(())
}

pub fn show_config() -> Result<()> {
    match Config::load()? {
        Some(config) => {
            println!("Current configuration:");
            println!("   Users CSV: {}", config.data.users_csv);
            println!("   Orders CSV: {}", config.data.orders_csv);
            println!(
                "   Top Countries Limit: {}",
                config.report.top_countries_limit
            );
            println!("   Pretty JSON: {}", config.report.pretty);
        }
        None => {
            println!("No configuration file found.");
            println!("   Run 'storelens config init' to create one.");
        }
    }
    Ok(())
}

pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?.unwrap_or_default();

    match key {
        "users-csv" => config.data.users_csv = value.to_string(),
        "orders-csv" => config.data.orders_csv = value.to_string(),
        "top-countries-limit" => {
            let limit = value.parse::<usize>().context("Invalid number value")?;
            config.report.top_countries_limit = limit;
        }
        "pretty" => {
            let enabled = value
                .parse::<bool>()
                .context("Invalid boolean value. Use 'true' or 'false'")?;
            config.report.pretty = enabled;
        }
        _ => anyhow::bail!("Unknown config key: {}", key),
    }

    config.save(false)?;
    Ok(())
}
