//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;
use std::path::PathBuf;

pub mod approvals;
pub mod args;
pub mod audit;
pub mod context;
pub mod init;
pub mod saved;
pub mod status;

pub use args::{AuditFilterArgs, DecisionArg, OutputFormat, PageArgs};
pub use context::CommandContext;

use crate::client::models::{FlowType, Role};
use crate::i18n::Language;

/// Dripfy CLI - audit log queries and approval flows for the Dripfy dashboard
#[derive(Parser, Debug)]
#[command(name = "dripfy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "DRIPFY_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "DRIPFY_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the dashboard API base URL
    #[arg(long, global = true, env = "DRIPFY_API_BASE", hide_env = true)]
    pub api_base: Option<String>,

    /// Override the access token
    #[arg(long, global = true, env = "DRIPFY_TOKEN", hide_env = true)]
    pub token: Option<String>,

    /// Act with this role instead of the configured one
    #[arg(long, global = true, env = "DRIPFY_ROLE", hide_env = true, hide_possible_values = true)]
    pub role: Option<Role>,

    /// Display language (en, tr, de)
    #[arg(long, global = true, env = "DRIPFY_LANG", hide_env = true, hide_possible_values = true)]
    pub lang: Option<Language>,

    /// Enable debug logging
    #[arg(long, global = true, env = "DRIPFY_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Dripfy configuration
    Init,

    /// Show the resolved configuration
    Status,

    /// Display version information
    Version,

    /// Query and export the audit log
    #[command(subcommand)]
    Audit(AuditCommands),

    /// Review and decide approval flows
    #[command(subcommand)]
    Approvals(ApprovalCommands),

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   dripfy completion bash > /etc/bash_completion.d/dripfy
  zsh:    dripfy completion zsh > \"${fpath[1]}/_dripfy\"
  fish:   dripfy completion fish > ~/.config/fish/completions/dripfy.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Audit log subcommands
#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// List audit log entries
    #[command(
        visible_alias = "ls",
        after_help = "EXAMPLES:\n  \
            dripfy audit list                              # First 50 entries\n  \
            dripfy audit list --user ayse --label Finance  # Filtered\n  \
            dripfy audit list --from 2024-03-01 --all      # Everything since March\n  \
            dripfy audit list --link 'https://ops.example/dashboard?tab=audit&user=ayse'\n  \
            dripfy audit list --interactive                # Browse, refine and save filters"
    )]
    List {
        #[command(flatten)]
        filters: AuditFilterArgs,

        #[command(flatten)]
        pages: PageArgs,

        /// Browse interactively: load more, edit and save filters
        #[arg(long, short = 'i')]
        interactive: bool,
    },

    /// Export audit log entries to CSV
    #[command(after_help = "EXAMPLES:\n  \
            dripfy audit export --criticality high --all   # All high-criticality entries\n  \
            dripfy audit export --dir ./reports            # Into a directory")]
    Export {
        #[command(flatten)]
        filters: AuditFilterArgs,

        #[command(flatten)]
        pages: PageArgs,

        /// Directory to write the CSV file into (defaults to the current one)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Print the dashboard URL that reproduces the filters
    #[command(after_help = "EXAMPLES:\n  \
            dripfy audit link --user ayse --criticality high\n  \
            dripfy audit link --link 'https://ops.example/dashboard?tab=audit' --label HR")]
    Link {
        #[command(flatten)]
        filters: AuditFilterArgs,
    },

    /// Manage saved filter sets
    #[command(subcommand)]
    Filters(FilterCommands),
}

/// Saved filter set subcommands
#[derive(Subcommand, Debug)]
pub enum FilterCommands {
    /// List saved filter sets
    #[command(visible_alias = "ls")]
    List,

    /// Save the given filters under a name
    #[command(after_help = "EXAMPLES:\n  \
            dripfy audit filters save \"Finance highs\" --label Finance --criticality high")]
    Save {
        /// Name for the filter set
        name: String,

        #[command(flatten)]
        filters: AuditFilterArgs,
    },

    /// Delete a saved filter set
    #[command(visible_alias = "rm")]
    Delete {
        /// Saved filter set ID (see `dripfy audit filters list`)
        id: String,
    },

    /// Load audit entries using a saved filter set
    Apply {
        /// Saved filter set ID
        id: String,

        /// Dashboard URL to rewrite with the saved filters
        #[arg(long, value_name = "URL")]
        link: Option<String>,
    },
}

/// Approval flow subcommands
#[derive(Subcommand, Debug)]
pub enum ApprovalCommands {
    /// List approval flows
    #[command(
        visible_alias = "ls",
        after_help = "EXAMPLES:\n  \
            dripfy approvals list                       # All flows\n  \
            dripfy approvals list --type invoice        # Invoice flows only\n  \
            dripfy approvals list --pending --format table  # Pending steps with SLA"
    )]
    List {
        /// Only flows of this type (signup, finance, invoice, task)
        #[arg(long = "type", short = 't', value_enum, hide_possible_values = true)]
        flow_type: Option<FlowType>,

        /// Only flows with a step waiting on a decision
        #[arg(long)]
        pending: bool,
    },

    /// Approve or reject a pending step
    #[command(after_help = "EXAMPLES:\n  \
            dripfy approvals decide invoice:INV-7 finance approve\n  \
            dripfy approvals decide signup:42 review reject --comment \"Missing documents\"")]
    Decide {
        /// Flow ID (`<type>:<entity id>`)
        flow_id: String,

        /// Step ID within the flow
        step_id: String,

        /// approve or reject
        #[arg(value_enum)]
        decision: DecisionArg,

        /// Comment stored with the decision
        #[arg(long, short = 'm')]
        comment: Option<String>,
    },

    /// Keep pending flows on screen with live SLA countdowns
    Watch {
        /// Only flows of this type
        #[arg(long = "type", short = 't', value_enum, hide_possible_values = true)]
        flow_type: Option<FlowType>,

        /// Seconds between refreshes
        #[arg(long, default_value_t = 30, hide = true)]
        interval: u64,
    },
}
