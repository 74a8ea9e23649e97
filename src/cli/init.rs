//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, Select, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::models::Role;
use crate::config::Config;
use crate::error::Result;
use crate::i18n::Language;

const LANGUAGES: [(Language, &str); 3] = [
    (Language::En, "English"),
    (Language::Tr, "Türkçe"),
    (Language::De, "Deutsch"),
];

/// Run the init command
///
/// Starts from the existing file when there is one, so re-running init only
/// changes what the user edits.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let theme = ColorfulTheme::default();
    let config_path = Config::resolve_path(opts.config_ref())?;
    let current = Config::load_at(opts.config_ref())?;

    println!("{}", "Welcome to Dripfy!".bold().green());
    println!("Let's set up your dashboard connection.\n");

    let api_base: String = Input::with_theme(&theme)
        .with_prompt("Dashboard API base URL")
        .with_initial_text(opts.api_base.clone().unwrap_or(current.api_base.clone()))
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            url::Url::parse(input.trim())
                .map(|_| ())
                .map_err(|e| format!("Not a valid URL: {}", e))
        })
        .interact_text()?;

    let token: String = Password::with_theme(&theme)
        .with_prompt("Access token (leave empty to keep the current one)")
        .allow_empty_password(true)
        .interact()?;
    let token = if token.trim().is_empty() {
        current.token.clone()
    } else {
        Some(token.trim().to_string())
    };

    let role_names: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
    let role_idx = Select::with_theme(&theme)
        .with_prompt("Your dashboard role")
        .items(&role_names)
        .default(Role::ALL.iter().position(|r| *r == current.role).unwrap_or(0))
        .interact()?;

    let language_names: Vec<&str> = LANGUAGES.iter().map(|(_, name)| *name).collect();
    let language_idx = Select::with_theme(&theme)
        .with_prompt("Display language")
        .items(&language_names)
        .default(
            LANGUAGES
                .iter()
                .position(|(l, _)| *l == current.language)
                .unwrap_or(0),
        )
        .interact()?;

    let dashboard_url: String = Input::with_theme(&theme)
        .with_prompt("Dashboard page URL for shareable audit links (optional)")
        .with_initial_text(current.dashboard_url.clone().unwrap_or_default())
        .allow_empty(true)
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            if input.trim().is_empty() {
                return Ok(());
            }
            url::Url::parse(input.trim())
                .map(|_| ())
                .map_err(|e| format!("Not a valid URL: {}", e))
        })
        .interact_text()?;

    let config = Config {
        api_base: api_base.trim().trim_end_matches('/').to_string(),
        token,
        role: Role::ALL[role_idx],
        language: LANGUAGES[language_idx].0,
        dashboard_url: Some(dashboard_url.trim().to_string()).filter(|u| !u.is_empty()),
        store_path: current.store_path,
    };
    config.save_to(&config_path)?;

    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );
    println!("  Role: {}", config.role.to_string().bold());

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "dripfy status".cyan());
    println!("  {} - Browse the audit log", "dripfy audit list".cyan());
    println!("  {} - Pending approvals", "dripfy approvals list --pending".cyan());

    Ok(())
}
