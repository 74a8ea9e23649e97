//! Saved audit filter set commands

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::audit::{check_outcome, open_session, print_logs};
use crate::cli::{AuditFilterArgs, CommandContext, OutputFormat};
use crate::error::{Error, Result};
use crate::models::SavedFilterDisplay;
use crate::output::Formattable;

/// List saved filter sets
pub fn list(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let session = ctx.audit_session(None);

    let rows: Vec<SavedFilterDisplay> = session
        .saved_filters()
        .iter()
        .map(SavedFilterDisplay::from)
        .collect();
    rows.print(ctx.format)
}

/// Save the filters given by flags (and `--link`) under a name
pub fn save(opts: &GlobalOptions, name: &str, filters: &AuditFilterArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let session = open_session(&ctx, filters)?;

    match session.save_filters(name) {
        Some(set) => match ctx.format {
            OutputFormat::Json => vec![SavedFilterDisplay::from(&set)].print(ctx.format),
            _ => {
                println!("{} Saved \"{}\" as {}", "✓".green(), set.name, set.id.bold());
                Ok(())
            }
        },
        None => {
            println!("{}", "Nothing saved: the name was blank.".yellow());
            Ok(())
        }
    }
}

/// Delete a saved filter set by id
pub fn delete(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let session = ctx.audit_session(None);

    if session.delete_saved_filter(id) {
        println!("{} Deleted {}", "✓".green(), id);
        Ok(())
    } else {
        Err(Error::Other(format!("No saved filter set with id {}", id)))
    }
}

/// Apply a saved filter set and print the first page of results
pub async fn apply(opts: &GlobalOptions, id: &str, link: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let args = AuditFilterArgs {
        link: link.map(str::to_string),
        ..AuditFilterArgs::default()
    };
    let session = open_session(&ctx, &args)?;

    let Some(outcome) = session.apply_saved_filter(id).await else {
        return Err(Error::Other(format!("No saved filter set with id {}", id)));
    };
    check_outcome(&session, outcome)?;
    print_logs(&session, ctx.format, ctx.config.language)
}
