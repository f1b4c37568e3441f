use chrono::SecondsFormat;

use crate::health::display_reason;
use crate::types::{ContainerLogs, Event, PodCondition, PodEvents, PodReport};

const EVENT_HEADER: [&str; 4] = ["LAST SEEN", "TYPE", "REASON", "MESSAGE"];
const CONDITION_HEADER: [&str; 3] = ["CONDITION", "REASON", "MESSAGE"];

// Column layout of a `text/tabwriter` with minwidth 8, tabwidth 8,
// padding 1 and '\t' as the pad character.
const MIN_CELL_WIDTH: usize = 8;
const TAB_WIDTH: usize = 8;
const CELL_PADDING: usize = 1;

/// Counts gathered while scanning for pods that are not ready
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub pods_scanned: usize,
    pub pods_not_ready: usize,
    pub containers_not_ready: usize,
    pub log_errors: usize,
}

impl ReportSummary {
    pub fn add(&mut self, report: &PodReport) {
        self.pods_not_ready += 1;
        self.containers_not_ready += report.verdict.not_ready_containers.len();
        self.log_errors += report
            .container_logs
            .iter()
            .filter(|(_, logs)| matches!(logs, ContainerLogs::Errored(_)))
            .count();
    }

    pub fn has_issues(&self) -> bool {
        self.pods_not_ready > 0
    }
}

/// Lay out rows as tab-aligned columns, each line prefixed with `indent`.
///
/// Every cell but the last is followed by enough tabs to reach the next
/// column, so the output lines up in a terminal and splits cleanly on tabs.
pub fn render_table(indent: &str, header: &[&str], rows: Vec<Vec<String>>) -> String {
    let lines: Vec<Vec<String>> = std::iter::once(header.iter().map(|h| h.to_string()).collect())
        .chain(rows)
        .collect();

    let columns = lines.iter().map(|l| l.len().saturating_sub(1)).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            let text = lines
                .iter()
                .filter(|l| i + 1 < l.len())
                .map(|l| l[i].chars().count())
                .max()
                .unwrap_or(0);
            column_width(text)
        })
        .collect();

    let mut out = String::new();
    for line in &lines {
        out.push_str(indent);
        for (i, cell) in line.iter().enumerate() {
            out.push_str(cell);
            if i + 1 < line.len() {
                let pad = widths[i] - cell.chars().count();
                out.push_str(&"\t".repeat(pad.div_ceil(TAB_WIDTH)));
            }
        }
        out.push('\n');
    }
    out
}

/// Width of a column whose widest cell is `text` characters, rounded up to
/// a whole number of tab stops.
fn column_width(text: usize) -> usize {
    (text + CELL_PADDING).max(MIN_CELL_WIDTH).div_ceil(TAB_WIDTH) * TAB_WIDTH
}

pub fn format_last_seen(event: &Event) -> String {
    event
        .last_seen
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "<unknown>".to_string())
}

pub fn render_event_table(indent: &str, events: &[Event]) -> String {
    let rows = events
        .iter()
        .map(|e| {
            vec![
                format_last_seen(e),
                e.kind.clone(),
                e.reason.clone(),
                e.message.clone(),
            ]
        })
        .collect();
    render_table(indent, &EVENT_HEADER, rows)
}

pub fn render_condition_table(indent: &str, conditions: &[PodCondition]) -> String {
    let rows = conditions
        .iter()
        .map(|c| vec![c.kind.clone(), c.reason.clone(), c.message.clone()])
        .collect();
    render_table(indent, &CONDITION_HEADER, rows)
}

/// Output block of the pod-events tool for the `index`th listed pod. Every
/// block after the first starts with a blank line.
pub fn render_pod_events(index: usize, pod: &PodEvents) -> String {
    let mut out = String::new();
    if index > 0 {
        out.push('\n');
    }
    out.push_str(&format!("Events for {}:\n", pod.pod));
    out.push_str(&render_event_table("", &pod.events));
    out
}

/// Output block of the sick-pods tool for one pod.
pub fn render_pod_report(report: &PodReport) -> String {
    let mut out = format!(
        "'{}' is not ready! Reason Provided: {}\n",
        report.display_name,
        display_reason(report.phase_reason.as_deref())
    );

    if !report.verdict.failed_conditions.is_empty() {
        out.push_str("\tFailed Pod Conditions:\n");
        out.push_str(&render_condition_table("\t\t", &report.verdict.failed_conditions));
    }

    out.push_str("\n\tPod Events:\n");
    out.push_str(&render_event_table("\t\t", &report.events));
    out.push('\n');

    for (container, logs) in &report.container_logs {
        out.push_str(&format!("\tContainer '{}' is not ready!\n", container));
        out.push_str("\t\tContainer Logs:\n");
        match logs {
            ContainerLogs::Lines(lines) => {
                for line in lines {
                    out.push_str(&format!("\t\t\t{}\n", line));
                }
            }
            ContainerLogs::Errored(message) => {
                out.push_str(&format!("\t\t\tErrored Getting Logs: {}\n", message));
            }
        }
    }

    out
}
