//! Approval flow commands

use chrono::{DateTime, Utc};
use colored::Colorize;
use log::{debug, error};
use std::time::Duration;

use crate::approval::{
    ApprovalDesk, SlaState, SlaTicker, deadline_local, is_actionable, sla_message, sla_state,
};
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, DecisionArg, OutputFormat};
use crate::client::models::{ApprovalFlowSummary, ApprovalStep, FlowType, Role, StepStatus};
use crate::error::Result;
use crate::i18n::{Language, fill};
use crate::models::{FlowDisplay, StepDisplay, step_status_label};
use crate::output::Formattable;
use crate::output::formatters::{format_optional_timestamp, format_timestamp_local};
use crate::output::json::JsonOutput;

/// Run the approvals list command
pub async fn list(opts: &GlobalOptions, flow_type: Option<FlowType>, pending_only: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let desk = ctx.approval_desk();
    desk.refresh(flow_type).await?;

    let flows = visible_flows(&desk, pending_only);
    print_flows(&flows, &desk, ctx.format, pending_only, Utc::now())
}

/// Run the approvals decide command
pub async fn decide(
    opts: &GlobalOptions,
    flow_id: &str,
    step_id: &str,
    decision: DecisionArg,
    comment: Option<&str>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let desk = ctx.approval_desk();
    desk.refresh(flow_type_of(flow_id)).await?;

    let updated = desk.decide(flow_id, step_id, decision.into(), comment).await?;

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&JsonOutput::new(&updated))?);
        }
        _ => {
            let language = desk.language();
            let step = updated.step(step_id);
            let status = step
                .map(|s| step_status_label(s.status, language.messages()))
                .unwrap_or_default();
            println!("{} {} / {}: {}", "✓".green(), updated.id, step_id, status.bold());
            if let Some(line) = step.and_then(|s| actor_line(s, language)) {
                println!("  {}", line.dimmed());
            }
            println!();
            print!("{}", render_flow(&updated, desk.actor_role(), language, Utc::now()));
        }
    }
    Ok(())
}

/// Run the approvals watch command: re-render pending flows on every SLA tick
/// until nothing is pending or the user interrupts
pub async fn watch(opts: &GlobalOptions, flow_type: Option<FlowType>, interval: Duration) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let desk = ctx.approval_desk();
    desk.refresh(flow_type).await?;

    let Some(mut ticker) = SlaTicker::start_if_pending(&desk.flows(), interval) else {
        println!("{}", "No approval steps are pending.".green());
        return Ok(());
    };

    loop {
        tokio::select! {
            tick = ticker.tick() => {
                let Some(now) = tick else { break };
                let flows = visible_flows(&desk, true);
                if ctx.format == OutputFormat::Pretty {
                    // Clear screen and home the cursor
                    print!("\x1B[2J\x1B[H");
                }
                print_flows(&flows, &desk, ctx.format, true, now)?;
                if ctx.format != OutputFormat::Json {
                    println!(
                        "\n{}",
                        format!("Refreshing every {}s. Press Ctrl+C to stop.", interval.as_secs()).dimmed()
                    );
                }

                if let Err(e) = desk.refresh(flow_type).await {
                    error!("Failed to refresh approval flows: {}", e);
                }
                if !desk.has_pending_steps() {
                    println!("{}", "All approval steps are decided.".green());
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping approval watch");
                break;
            }
        }
    }
    Ok(())
}

/// Flow ids are `<type>:<entityId>`; narrow the refresh when the type parses
fn flow_type_of(flow_id: &str) -> Option<FlowType> {
    let (prefix, _) = flow_id.split_once(':')?;
    FlowType::ALL.iter().copied().find(|t| t.as_str() == prefix)
}

fn visible_flows(desk: &ApprovalDesk, pending_only: bool) -> Vec<ApprovalFlowSummary> {
    desk.flows()
        .into_iter()
        .filter(|f| !pending_only || f.has_pending_step())
        .collect()
}

fn print_flows(
    flows: &[ApprovalFlowSummary],
    desk: &ApprovalDesk,
    format: OutputFormat,
    pending_only: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&JsonOutput::new(flows))?);
            Ok(())
        }
        OutputFormat::Table if pending_only => {
            StepDisplay::rows(flows, true, desk.actor_role(), desk.language(), now).print(format)
        }
        OutputFormat::Table => flows.iter().map(FlowDisplay::from).collect::<Vec<_>>().print(format),
        OutputFormat::Pretty => {
            if flows.is_empty() {
                println!("No results found.");
            }
            for flow in flows {
                println!("{}", render_flow(flow, desk.actor_role(), desk.language(), now));
            }
            Ok(())
        }
    }
}

/// "Decided by X at T" for a decided step
fn actor_line(step: &ApprovalStep, language: Language) -> Option<String> {
    let name = step.decided_by.as_deref()?;
    let when = format_optional_timestamp(step.decided_at);
    let line = fill(language.messages().actor, "name", name);
    Some(fill(&line, "timestamp", &when))
}

fn status_icon(status: StepStatus) -> colored::ColoredString {
    match status {
        StepStatus::Pending => "●".yellow(),
        StepStatus::Waiting => "○".dimmed(),
        StepStatus::Approved => "✓".green(),
        StepStatus::Rejected => "✗".red(),
        StepStatus::Skipped => "-".dimmed(),
    }
}

/// Human-oriented rendering of one flow and its steps
pub(crate) fn render_flow(
    flow: &ApprovalFlowSummary,
    role: Role,
    language: Language,
    now: DateTime<Utc>,
) -> String {
    let messages = language.messages();
    let mut out = String::new();

    out.push_str(&format!(
        "{} {} [{}]\n",
        flow.title.bold(),
        flow.id.dimmed(),
        flow.status
    ));
    if let Some(ref by) = flow.submitted_by {
        let who = by.name.as_deref().or(by.email.as_deref()).unwrap_or("--");
        out.push_str(&format!(
            "  Submitted by {} at {}\n",
            who,
            format_timestamp_local(flow.submitted_at)
        ));
    }
    for (key, value) in &flow.metadata {
        out.push_str(&format!("  {}: {}\n", key.dimmed(), value));
    }

    for step in &flow.steps {
        out.push_str(&format!(
            "  {} {} ({}) {}\n",
            status_icon(step.status),
            step.label,
            step.required_role_label(),
            step_status_label(step.status, messages)
        ));

        match step.status {
            StepStatus::Pending => {
                let sla = sla_message(step, now, language);
                let sla = match sla_state(step, now) {
                    SlaState::Overdue(_) => sla.red().bold(),
                    SlaState::Remaining(s) if s < 3_600 => sla.yellow(),
                    _ => sla.normal(),
                };
                match deadline_local(step) {
                    Some(deadline) => out.push_str(&format!("      {} ({})\n", sla, deadline)),
                    None => out.push_str(&format!("      {}\n", sla)),
                }

                let assignees = if step.pending_users.is_empty() {
                    messages.no_assignees.to_string()
                } else {
                    step.pending_users
                        .iter()
                        .map(|u| format!("{} ({})", u.name, u.role))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                out.push_str(&format!("      {}\n", assignees));

                if let Some(escalation) = step.escalates_to {
                    out.push_str(&format!("      {}: {}\n", messages.escalation, escalation));
                }
                if is_actionable(step, role) {
                    out.push_str(&format!(
                        "      {}\n",
                        format!("dripfy approvals decide {} {} approve|reject", flow.id, step.id).cyan()
                    ));
                }
            }
            StepStatus::Approved | StepStatus::Rejected => {
                if let Some(line) = actor_line(step, language) {
                    out.push_str(&format!("      {}\n", line.dimmed()));
                }
                if let Some(ref comment) = step.comment {
                    out.push_str(&format!("      \"{}\"\n", comment));
                }
            }
            StepStatus::Waiting | StepStatus::Skipped => {}
        }
    }
    out
}
