//! Approval flow engine
//!
//! Role-gated decisions on pending steps and the SLA countdown shown next to
//! them.

pub mod desk;
pub mod sla;

pub use desk::{ApprovalDesk, is_actionable};
pub use sla::{
    SLA_REFRESH_INTERVAL, SlaState, SlaTicker, deadline_local, sla_message,
    sla_state,
};
