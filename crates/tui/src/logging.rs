use std::{fs::OpenOptions, path::Path, sync::Mutex};

use tracing_subscriber::EnvFilter;

use crate::{
    config::AppConfig,
    error::{AppError, Result},
};

/// Route `tracing` output to the configured log file.
///
/// The terminal belongs to the dashboard, so nothing is ever written to it.
pub fn init(config: &AppConfig) -> Result<()> {
    let path = Path::new(&config.log_file);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(&config.level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("moneta_tui={level},engine={level}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_covers_both_crates() {
        let rendered = filter("debug").to_string();
        assert!(rendered.contains("moneta_tui=debug"));
        assert!(rendered.contains("engine=debug"));
    }
}
