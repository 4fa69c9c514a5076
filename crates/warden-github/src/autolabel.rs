//! Title-snippet to label mappings for the autolabel run.

use serde::{Deserialize, Serialize};

/// One `tag=label` mapping: issues whose title contains `tag` receive
/// `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMapping {
    pub tag: String,
    pub label: String,
}

/// Parses the CLI form `<tag>=<label>`.
pub fn parse_label_mapping(raw: &str) -> Result<LabelMapping, String> {
    match raw.split_once('=') {
        Some((tag, label)) if !tag.is_empty() && !label.is_empty() => Ok(LabelMapping {
            tag: tag.to_string(),
            label: label.to_string(),
        }),
        _ => Err(format!(
            "'{raw}' doesn't follow the expected format '<tag>=<label>'"
        )),
    }
}

/// Labels to apply to one issue: every mapping whose tag occurs in the
/// title and whose label the issue does not already carry, in mapping
/// order without duplicates.
pub fn labels_to_apply(
    title: &str,
    current_labels: &[String],
    mappings: &[LabelMapping],
    ignore_case: bool,
) -> Vec<String> {
    let folded_title = if ignore_case {
        title.to_lowercase()
    } else {
        title.to_string()
    };

    let mut to_apply: Vec<String> = Vec::new();
    for mapping in mappings {
        let tag = if ignore_case {
            mapping.tag.to_lowercase()
        } else {
            mapping.tag.clone()
        };
        if tag.is_empty() || !folded_title.contains(&tag) {
            continue;
        }
        if current_labels.contains(&mapping.label) || to_apply.contains(&mapping.label) {
            continue;
        }
        to_apply.push(mapping.label.clone());
    }
    to_apply
}
