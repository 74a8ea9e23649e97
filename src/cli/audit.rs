//! Audit log commands

use chrono::NaiveDate;
use colored::Colorize;
use dialoguer::{Input, Select, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use std::path::Path;
use std::time::Duration;

use crate::audit::{AuditLogSession, FetchOutcome, FilterState, download_csv};
use crate::cli::args::GlobalOptions;
use crate::cli::{AuditFilterArgs, CommandContext, OutputFormat, PageArgs};
use crate::error::{ApiError, Result};
use crate::i18n::{Language, fill};
use crate::models::{AuditDisplay, describe_filters};
use crate::output::Formattable;
use crate::output::json::JsonOutput;
use crate::output::table::format_table_or;

/// Run the audit list command
pub async fn list(
    opts: &GlobalOptions,
    filters: &AuditFilterArgs,
    pages: &PageArgs,
    interactive: bool,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let session = open_session(&ctx, filters)?;

    let outcome = load_with_spinner(&session, pages.max_pages(), ctx.format).await;
    check_outcome(&session, outcome)?;

    if interactive {
        browse(&ctx, &session).await
    } else {
        print_logs(&session, ctx.format, ctx.config.language)
    }
}

/// Run the audit export command
pub async fn export(
    opts: &GlobalOptions,
    filters: &AuditFilterArgs,
    pages: &PageArgs,
    dir: Option<&Path>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let session = open_session(&ctx, filters)?;

    let outcome = load_with_spinner(&session, pages.max_pages(), ctx.format).await;
    check_outcome(&session, outcome)?;

    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir()?,
    };
    write_export(&session, &dir, ctx.config.language)
}

/// Run the audit link command: print the dashboard URL for the filters
pub fn link(opts: &GlobalOptions, filters: &AuditFilterArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let mut location = ctx.require_location(filters.link.as_deref())?;
    let merged = filters.apply_to(location.filters());
    location.replace_filters(&merged);

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&JsonOutput::new(location.as_str()))?
        ),
        _ => println!("{}", location.as_str()),
    }
    Ok(())
}

/// Build a session starting from `--link` (or the configured dashboard URL)
/// with the filter flags laid over it
pub(crate) fn open_session(ctx: &CommandContext, filters: &AuditFilterArgs) -> Result<AuditLogSession> {
    let location = ctx.location(filters.link.as_deref())?;
    let base = location.as_ref().map(|l| l.filters()).unwrap_or_default();
    let merged = filters.apply_to(base);
    Ok(ctx.audit_session(location).with_filters(merged))
}

pub(crate) async fn load_with_spinner(
    session: &AuditLogSession,
    max_pages: Option<usize>,
    format: OutputFormat,
) -> FetchOutcome {
    let spinner = if format == OutputFormat::Json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Loading audit log...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = session.load_pages(max_pages).await;

    spinner.finish_and_clear();
    outcome
}

/// A failure with nothing to show is an error; a failure after some pages
/// loaded is a warning and the loaded entries are still printed
pub(crate) fn check_outcome(session: &AuditLogSession, outcome: FetchOutcome) -> Result<()> {
    if let FetchOutcome::Failed(message) = outcome {
        error!("Audit log fetch failed: {}", message);
        if session.logs().is_empty() {
            return Err(ApiError::Server(message).into());
        }
        eprintln!("{} {}", "⚠".yellow(), message);
    }
    Ok(())
}

pub(crate) fn print_logs(session: &AuditLogSession, format: OutputFormat, language: Language) -> Result<()> {
    let logs = session.logs();
    match format {
        OutputFormat::Json => {
            let output = JsonOutput::new(&logs)
                .with_total(session.total())
                .with_link(session.location());
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            let rows: Vec<AuditDisplay> = logs.iter().map(AuditDisplay::from).collect();
            rows.print(format)?;
        }
        OutputFormat::Pretty => {
            let messages = language.messages();
            let rows: Vec<AuditDisplay> = logs.iter().map(AuditDisplay::from).collect();
            println!("{}", format_table_or(&rows, messages.audit_empty));
            if !rows.is_empty() {
                let total = fill(messages.audit_total, "count", &session.total().to_string());
                println!("\n{} ({} loaded)", total.bold(), rows.len());
            }
            if session.has_more() {
                println!(
                    "{}",
                    "More entries available: use --pages N or --all to load them.".dimmed()
                );
            }
            if let Some(link) = session.location() {
                println!("{} {}", "Link:".bold(), link.cyan());
            }
        }
    }
    Ok(())
}

fn write_export(session: &AuditLogSession, dir: &Path, language: Language) -> Result<()> {
    let logs = session.logs();
    match download_csv(&logs, dir)? {
        Some(path) => println!(
            "{} Exported {} entries to {}",
            "✓".green(),
            logs.len(),
            path.display()
        ),
        None => println!("{}", language.messages().audit_empty),
    }
    Ok(())
}

// ============================================================================
// Interactive browsing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseAction {
    LoadMore,
    EditFilters,
    ClearFilters,
    SaveFilters,
    ApplySaved,
    Export,
    Quit,
}

impl BrowseAction {
    fn label(self) -> &'static str {
        match self {
            BrowseAction::LoadMore => "Load more",
            BrowseAction::EditFilters => "Edit filters",
            BrowseAction::ClearFilters => "Clear filters",
            BrowseAction::SaveFilters => "Save current filters",
            BrowseAction::ApplySaved => "Apply a saved filter set",
            BrowseAction::Export => "Export CSV",
            BrowseAction::Quit => "Quit",
        }
    }
}

/// Actions on offer for the session's current state
fn available_actions(session: &AuditLogSession) -> Vec<BrowseAction> {
    let mut actions = Vec::new();
    if session.has_more() {
        actions.push(BrowseAction::LoadMore);
    }
    actions.push(BrowseAction::EditFilters);
    if !session.filters().is_empty() {
        actions.push(BrowseAction::ClearFilters);
        actions.push(BrowseAction::SaveFilters);
    }
    if !session.saved_filters().is_empty() {
        actions.push(BrowseAction::ApplySaved);
    }
    if !session.logs().is_empty() {
        actions.push(BrowseAction::Export);
    }
    actions.push(BrowseAction::Quit);
    actions
}

async fn browse(ctx: &CommandContext, session: &AuditLogSession) -> Result<()> {
    let theme = ColorfulTheme::default();
    loop {
        print_logs(session, OutputFormat::Pretty, ctx.config.language)?;
        println!("{} {}", "Filters:".bold(), describe_filters(&session.filters()));

        let actions = available_actions(session);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let Some(choice) = Select::with_theme(&theme)
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };

        let outcome = match actions[choice] {
            BrowseAction::LoadMore => session.on_sentinel_visible().await,
            BrowseAction::EditFilters => {
                edit_draft(session, &theme)?;
                session.apply_draft().await
            }
            BrowseAction::ClearFilters => session.reset_filters().await,
            BrowseAction::SaveFilters => {
                let name: String = Input::with_theme(&theme)
                    .with_prompt("Name for this filter set")
                    .allow_empty(true)
                    .interact_text()?;
                match session.save_filters(&name) {
                    Some(set) => println!("{} Saved as {}", "✓".green(), set.id.bold()),
                    None => println!("{}", "Nothing saved: the name was blank.".yellow()),
                }
                continue;
            }
            BrowseAction::ApplySaved => {
                let sets = session.saved_filters();
                let names: Vec<&str> = sets.iter().map(|s| s.name.as_str()).collect();
                let Some(idx) = Select::with_theme(&theme)
                    .with_prompt("Saved filter set")
                    .items(&names)
                    .default(0)
                    .interact_opt()?
                else {
                    continue;
                };
                match session.apply_saved_filter(&sets[idx].id).await {
                    Some(outcome) => outcome,
                    None => continue,
                }
            }
            BrowseAction::Export => {
                write_export(session, &std::env::current_dir()?, ctx.config.language)?;
                continue;
            }
            BrowseAction::Quit => return Ok(()),
        };

        if let FetchOutcome::Failed(message) = outcome {
            error!("Audit log fetch failed: {}", message);
            eprintln!("{} {}", "✗".red(), message);
        }
    }
}

/// Prompt for each filter field, starting from the current draft
fn edit_draft(session: &AuditLogSession, theme: &ColorfulTheme) -> Result<()> {
    let draft = session.draft();
    let vocabulary = session.vocabulary();

    let start_date = prompt_date(theme, "From (YYYY-MM-DD)", draft.start_date)?;
    let end_date = prompt_date(theme, "To (YYYY-MM-DD)", draft.end_date)?;
    let user = prompt_choice(theme, "User", &vocabulary.users, draft.user.as_deref())?;
    let action = prompt_choice(theme, "Action", &session.action_options(), draft.action.as_deref())?;
    let label = prompt_choice(theme, "Label", &vocabulary.labels, draft.label.as_deref())?;
    let source_module = prompt_choice(
        theme,
        "Source module",
        &vocabulary.source_modules,
        draft.source_module.as_deref(),
    )?;
    let criticality = prompt_choice(
        theme,
        "Criticality",
        &session.criticality_options(),
        draft.criticality.map(|c| c.as_str()),
    )?
    .and_then(|c| c.parse().ok());

    session.update_draft(|d| {
        *d = FilterState {
            start_date,
            end_date,
            user,
            action,
            label,
            source_module,
            criticality,
        }
    });
    Ok(())
}

fn prompt_date(theme: &ColorfulTheme, prompt: &str, current: Option<NaiveDate>) -> Result<Option<NaiveDate>> {
    let initial = current.map(|d| d.to_string()).unwrap_or_default();
    let raw: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            if input.trim().is_empty() || NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").is_ok() {
                Ok(())
            } else {
                Err("Use YYYY-MM-DD".to_string())
            }
        })
        .interact_text()?;
    Ok(NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
}

/// Pick from known values when there are some, otherwise type freely.
/// The first option clears the field.
fn prompt_choice(
    theme: &ColorfulTheme,
    prompt: &str,
    options: &[String],
    current: Option<&str>,
) -> Result<Option<String>> {
    if options.is_empty() {
        let raw: String = Input::with_theme(theme)
            .with_prompt(prompt)
            .with_initial_text(current.unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        return Ok(Some(raw).filter(|v| !v.trim().is_empty()));
    }

    let mut items = vec!["(any)".to_string()];
    items.extend(options.iter().cloned());
    let default = current
        .and_then(|c| options.iter().position(|o| o == c))
        .map(|i| i + 1)
        .unwrap_or(0);
    let choice = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&items)
        .default(default)
        .interact()?;
    Ok((choice > 0).then(|| items[choice].clone()))
}
