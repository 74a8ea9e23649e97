//! Dripfy CLI - audit log queries and approval flows for the Dripfy dashboard

use clap::{CommandFactory, Parser};
use std::time::Duration;

mod approval;
mod audit;
mod cli;
mod client;
mod config;
mod error;
mod i18n;
mod models;
mod output;
mod store;

use cli::args::GlobalOptions;
use cli::{ApprovalCommands, AuditCommands, Cli, Commands, FilterCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            eprintln!("  Caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    log::debug!("Debug logging enabled");

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts),
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("dripfy version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Audit(audit_cmd) => match audit_cmd {
            AuditCommands::List {
                filters,
                pages,
                interactive,
            } => cli::audit::list(&opts, &filters, &pages, interactive).await,
            AuditCommands::Export {
                filters,
                pages,
                dir,
            } => cli::audit::export(&opts, &filters, &pages, dir.as_deref()).await,
            AuditCommands::Link { filters } => cli::audit::link(&opts, &filters),
            AuditCommands::Filters(filter_cmd) => match filter_cmd {
                FilterCommands::List => cli::saved::list(&opts),
                FilterCommands::Save { name, filters } => cli::saved::save(&opts, &name, &filters),
                FilterCommands::Delete { id } => cli::saved::delete(&opts, &id),
                FilterCommands::Apply { id, link } => {
                    cli::saved::apply(&opts, &id, link.as_deref()).await
                }
            },
        },
        Commands::Approvals(approval_cmd) => match approval_cmd {
            ApprovalCommands::List { flow_type, pending } => {
                cli::approvals::list(&opts, flow_type, pending).await
            }
            ApprovalCommands::Decide {
                flow_id,
                step_id,
                decision,
                comment,
            } => {
                cli::approvals::decide(&opts, &flow_id, &step_id, decision, comment.as_deref())
                    .await
            }
            ApprovalCommands::Watch {
                flow_type,
                interval,
            } => cli::approvals::watch(&opts, flow_type, Duration::from_secs(interval.max(1))).await,
        },
        Commands::Completion { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "dripfy", &mut std::io::stdout());
            Ok(())
        }
    }
}
