use std::{collections::HashMap, time::Duration};

use chrono_tz::Tz;
use clap::Parser;
use engine::Currency;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/moneta.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Bearer token; only read from the config file or the environment.
    pub api_token: Option<String>,
    pub timezone: String,
    pub currency: Currency,
    pub removal_delay_ms: u64,
    /// Serve an in-memory month of sample data instead of the backend.
    pub demo: bool,
    pub log_file: String,
    pub level: String,
    /// Extra category icons, merged over the built-in table.
    pub categories: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/api/".to_string(),
            api_token: None,
            timezone: "America/Sao_Paulo".to_string(),
            currency: Currency::Brl,
            removal_delay_ms: 300,
            demo: false,
            log_file: "moneta.log".to_string(),
            level: "info".to_string(),
            categories: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Timezone(self.timezone.clone()))
    }
}

#[derive(Debug, Parser)]
#[command(name = "moneta_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000/api/).
    #[arg(long)]
    base_url: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Override currency (BRL or EUR).
    #[arg(long)]
    currency: Option<String>,
    /// Run on sample data, without a backend.
    #[arg(long)]
    demo: bool,
    /// Override the length of the row removal transition.
    #[arg(long)]
    removal_delay_ms: Option<u64>,
}

pub fn load() -> Result<AppConfig> {
    load_from(Args::parse())
}

fn load_from(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("MONETA"));
    let settings: AppConfig = builder.build()?.try_deserialize()?;

    apply_overrides(settings, args)
}

fn apply_overrides(mut settings: AppConfig, args: Args) -> Result<AppConfig> {
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(currency) = args.currency {
        settings.currency = Currency::try_from(currency.as_str())?;
    }
    if args.demo {
        settings.demo = true;
    }
    if let Some(delay) = args.removal_delay_ms {
        settings.removal_delay_ms = delay;
    }

    // Validate early rather than on first render.
    settings.tz()?;
    Ok(settings)
}
