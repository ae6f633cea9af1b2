use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use storeviz::config::ConfigManager;
use storeviz::{AppConfig, Args, CacheManager, APP_NAME};

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    if args.generate_config {
        match ConfigManager::new(APP_NAME) {
            Ok(manager) => match manager.write_default_config(args.force) {
                Ok(path) => {
                    println!("Wrote default configuration to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

/// Command-line flags win over the config file.
fn apply_cli_overrides(config: &mut AppConfig, args: &Args) -> Result<()> {
    if let Some(limit) = args.chart_row_limit {
        config.chart.row_limit = Some(limit);
    }
    if args.debug {
        config.debug.enabled = true;
    }
    config.validate()
}

/// Config file values, then command-line overrides. A broken config file falls back to
/// the defaults; a bad flag value is an error.
fn load_config(manager: Result<ConfigManager>, args: &Args) -> Result<AppConfig> {
    let mut config = match manager.and_then(|m| m.load()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring configuration: {}", e);
            AppConfig::default()
        }
    };
    apply_cli_overrides(&mut config, args)?;
    Ok(config)
}

/// `--log-file`, else the cache dir when debug is on from either the flag or the config.
fn log_path(args: &Args, config: &AppConfig, cache: Option<&CacheManager>) -> Option<PathBuf> {
    storeviz::logging::log_file_path(args.log_file.as_deref(), config.debug.enabled, cache)
}

fn init_logging(args: &Args, config: &AppConfig) {
    let cache = CacheManager::new(APP_NAME).ok();
    let Some(path) = log_path(args, config, cache.as_ref()) else {
        return;
    };
    if let Err(e) = storeviz::logging::init_file_logging(&path, &config.logging.level) {
        eprintln!("Warning: logging disabled: {}", e);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let config = load_config(ConfigManager::new(APP_NAME), &args)?;
    init_logging(&args, &config);

    let debug = config.debug.enabled;
    if let Err(e) = storeviz::run(args.path.clone(), config, debug) {
        tracing::error!(error = %e, "exited with error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_with(temp: &TempDir, contents: &str) -> ConfigManager {
        let manager = ConfigManager::with_dir(temp.path().to_path_buf());
        std::fs::write(manager.config_path("config.toml"), contents).unwrap();
        manager
    }

    #[test]
    fn test_cli_overrides_config() {
        let temp = TempDir::new().unwrap();
        let manager = manager_with(&temp, "[chart]\nrow_limit = 500\n");
        let args = Args::parse_from(["storeviz", "--chart-row-limit", "50", "--debug"]);
        let config = load_config(Ok(manager), &args).unwrap();
        assert_eq!(config.chart.row_limit, Some(50));
        assert!(config.debug.enabled);
    }

    #[test]
    fn test_zero_chart_row_limit_flag_is_rejected() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(temp.path().to_path_buf());
        let args = Args::parse_from(["storeviz", "--chart-row-limit", "0"]);
        assert!(load_config(Ok(manager), &args).is_err());
    }

    #[test]
    fn test_debug_from_config_file_enables_log_file() {
        let temp = TempDir::new().unwrap();
        let manager = manager_with(&temp, "[debug]\nenabled = true\n");
        let args = Args::parse_from(["storeviz"]);
        let config = load_config(Ok(manager), &args).unwrap();

        let cache = CacheManager::with_dir(temp.path().join("cache"));
        let path = log_path(&args, &config, Some(&cache));
        assert_eq!(path, Some(cache.cache_file(storeviz::cache::LOG_FILE)));
    }

    #[test]
    fn test_no_log_file_without_debug() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(temp.path().to_path_buf());
        let args = Args::parse_from(["storeviz"]);
        let config = load_config(Ok(manager), &args).unwrap();
        let cache = CacheManager::with_dir(temp.path().join("cache"));
        assert_eq!(log_path(&args, &config, Some(&cache)), None);
    }
}
