// crates/blobcheck-cli/src/report.rs
// ============================================================================
// Module: Report Rendering
// Description: Tabular rendering of suggested parameters and node statistics.
// Purpose: Produce the human-readable stdout report.
// Dependencies: blobcheck-core, comfy-table
// ============================================================================

//! ## Overview
//! The report has up to two titled tables. Suggested parameters are always
//! shown. Statistics are shown only when they were collected; each node's
//! status is `OK` or the error it reported. A warning line follows the tables
//! when the restored data did not match the source.

// ============================================================================
// SECTION: Imports
// ============================================================================

use blobcheck_core::Integrity;
use blobcheck_core::NodeStats;
use blobcheck_core::ParameterSet;
use blobcheck_core::Report;
use comfy_table::ContentArrangement;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Title above the parameters table.
pub const PARAMETERS_TITLE: &str = "Suggested Parameters";

/// Title above the statistics table.
pub const STATISTICS_TITLE: &str = "Statistics";

/// Status shown for nodes without an error.
pub const STATUS_OK: &str = "OK";

/// Warning printed when the restore did not verify.
pub const INTEGRITY_WARNING: &str =
    "warning: restored data did not match the source; backup integrity is not confirmed";

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the full report.
#[must_use]
pub fn render(report: &Report) -> String {
    let parameters = parameters_table(&report.suggested_params);
    let mut sections = vec![format!("{PARAMETERS_TITLE}\n{parameters}")];
    if let Some(stats) = &report.stats {
        sections.push(format!("{STATISTICS_TITLE}\n{}", statistics_table(stats)));
    }
    if report.integrity == Integrity::Mismatch {
        sections.push(INTEGRITY_WARNING.to_string());
    }
    let mut output = sections.join("\n\n");
    output.push('\n');
    output
}

/// Builds the parameter/value table.
#[must_use]
pub fn parameters_table(params: &ParameterSet) -> Table {
    let mut table = base_table();
    table.set_header(["Parameter", "Value"]);
    for (key, value) in params.iter() {
        table.add_row([key.as_str(), value]);
    }
    table
}

/// Builds the per-node statistics table.
#[must_use]
pub fn statistics_table(stats: &[NodeStats]) -> Table {
    let mut table = base_table();
    table.set_header(["Node", "Read Speed", "Write Speed", "Status"]);
    for node in stats {
        table.add_row([
            node.node.to_string(),
            node.read_speed.clone(),
            node.write_speed.clone(),
            status(node).to_string(),
        ]);
    }
    table
}

/// Returns `OK` or the node's error text.
#[must_use]
pub fn status(node: &NodeStats) -> &str {
    if node.error.is_empty() { STATUS_OK } else { &node.error }
}

/// Table with the shared preset.
fn base_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic);
    table
}
