//! Config command implementations

use anyhow::Result;
use spendlens_core::config::default_config_path;
use spendlens_core::AnalyticsConfig;

/// Print the effective configuration
pub fn cmd_config_show(config: &AnalyticsConfig) -> Result<()> {
    match config.source {
        Some(ref path) => println!("# Loaded from {}", path.display()),
        None => println!("# Built-in defaults"),
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Show the path where a config override should be placed
pub fn cmd_config_path(config: &AnalyticsConfig) -> Result<()> {
    match default_config_path() {
        Some(path) => {
            println!("{}", path.display());

            if !path.exists() {
                eprintln!();
                eprintln!("Note: No override file exists yet.");
                eprintln!("Run 'spendlens config show > {}' to start one.", path.display());
            }
        }
        None => {
            eprintln!("Could not determine config directory.");
            eprintln!("The data directory is not available on this system.");
        }
    }

    if let Some(ref source) = config.source {
        eprintln!("Active config: {}", source.display());
    }

    Ok(())
}
