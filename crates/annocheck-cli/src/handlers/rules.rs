//! Rules command handler

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::OutputWriter;
use annocheck_core::{RuleId, Severity};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct RuleInfo {
    rule_id: RuleId,
    severity: Severity,
    description: &'static str,
}

/// Handle the rules command
pub fn handle_rules(output: &mut OutputWriter) -> Result<()> {
    let rules: Vec<RuleInfo> = RuleId::ALL
        .iter()
        .map(|rule| RuleInfo {
            rule_id: *rule,
            severity: rule.severity(),
            description: rule.description(),
        })
        .collect();

    if output.format() != OutputFormat::Human {
        return output.data(&rules);
    }

    let rows = rules
        .iter()
        .map(|info| {
            vec![
                info.rule_id.to_string(),
                info.severity.to_string(),
                info.description.to_string(),
            ]
        })
        .collect();
    output.table(&["RULE", "SEVERITY", "DESCRIPTION"], rows)
}
