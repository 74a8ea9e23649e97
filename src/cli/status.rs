//! Status command implementation

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::cli::context::{open_store, resolve_config};
use crate::config::Config;
use crate::error::Result;
use crate::models::ConfigDisplay;
use crate::output::Formattable;

/// Run the status command to display the resolved configuration
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let config = resolve_config(opts)?;
    let config_path = Config::resolve_path(opts.config_ref())?;
    let found = config_path.exists();
    let (_store, store_label) = open_store(&config);

    if opts.format != OutputFormat::Pretty {
        return ConfigDisplay::rows(&config, &config_path, found, &store_label).print(opts.format);
    }

    println!("{}\n", "Dripfy Configuration Status".bold());

    if found {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!(
            "Config file: {} {}",
            config_path.display().to_string().cyan(),
            "(not found, using defaults)".dimmed()
        );
    }
    println!("API base: {}", config.api_base.cyan());
    println!();

    if config.token.is_some() {
        println!("{} Access token configured", "✓".green());
    } else {
        println!("{} Access token not configured", "✗".red());
        println!("  → Run 'dripfy init' to configure");
    }

    println!("{} Role: {}", "✓".green(), config.role.to_string().bold());
    println!("{} Language: {}", "✓".green(), config.language.as_str());

    match config.dashboard_url {
        Some(ref url) => println!("{} Dashboard URL: {}", "✓".green(), url),
        None => println!("{} No dashboard URL set (audit links need --link)", "○".dimmed()),
    }

    println!("{} Store: {}", "✓".green(), store_label);

    Ok(())
}
