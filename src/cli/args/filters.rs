//! Filter and paging arguments for audit commands

use chrono::NaiveDate;
use clap::Args;

use crate::audit::FilterState;
use crate::client::models::Criticality;

/// Audit log filters. Flags override values taken from `--link`.
#[derive(Debug, Clone, Args, Default)]
pub struct AuditFilterArgs {
    /// Only entries on or after this date (YYYY-MM-DD)
    #[arg(long = "from", value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// Only entries on or before this date (YYYY-MM-DD)
    #[arg(long = "to", value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    /// Filter by user
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Filter by action (created, updated, deleted, approved, denied)
    #[arg(long, short = 'a')]
    pub action: Option<String>,

    /// Filter by label
    #[arg(long, short = 'l')]
    pub label: Option<String>,

    /// Filter by source module
    #[arg(long = "module", short = 'm')]
    pub source_module: Option<String>,

    /// Filter by criticality
    #[arg(long, short = 'c', value_enum, hide_possible_values = true)]
    pub criticality: Option<Criticality>,

    /// Dashboard URL whose query string supplies the starting filters
    #[arg(long, value_name = "URL")]
    pub link: Option<String>,
}

impl AuditFilterArgs {
    /// Overlay the flags on `base`; flags that were not given keep the base value
    pub fn apply_to(&self, base: FilterState) -> FilterState {
        FilterState {
            start_date: self.start_date.or(base.start_date),
            end_date: self.end_date.or(base.end_date),
            user: self.user.clone().or(base.user),
            action: self.action.clone().or(base.action),
            label: self.label.clone().or(base.label),
            source_module: self.source_module.clone().or(base.source_module),
            criticality: self.criticality.or(base.criticality),
        }
        .normalised()
    }
}

/// How many pages to pull before printing
#[derive(Debug, Clone, Args, Default)]
pub struct PageArgs {
    /// Number of pages to load (50 entries each)
    #[arg(long, default_value_t = 1, conflicts_with = "all")]
    pub pages: usize,

    /// Keep loading until the server reports no more entries
    #[arg(long)]
    pub all: bool,
}

impl PageArgs {
    /// `None` means no limit
    pub fn max_pages(&self) -> Option<usize> {
        if self.all { None } else { Some(self.pages.max(1)) }
    }
}
