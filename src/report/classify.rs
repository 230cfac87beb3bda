//! Maps crawled link results onto report outcomes

use crate::crawler::LinkResult;
use crate::url::page_label;
use serde_json::Value;

/// What a link result counts as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Broken(BrokenLinkRow),
    Excluded(String),
    Ok { cached: bool },
}

/// One row of the Errors table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLinkRow {
    pub source_formula: String,
    pub reason: String,
    pub resolved_url: Option<String>,
    pub original_url: Option<String>,
}

impl BrokenLinkRow {
    /// The four cells of the row; absent URLs become empty cells
    pub fn into_cells(self) -> Vec<Value> {
        vec![
            Value::String(self.source_formula),
            Value::String(self.reason),
            Value::String(self.resolved_url.unwrap_or_default()),
            Value::String(self.original_url.unwrap_or_default()),
        ]
    }
}

/// Builds page labels and hyperlink formulas for one site
#[derive(Debug, Clone)]
pub struct SourceLabeler {
    site_root: String,
    label_prefix: String,
}

impl SourceLabeler {
    pub fn new(site_root: impl Into<String>, label_prefix: impl Into<String>) -> Self {
        Self {
            site_root: site_root.into(),
            label_prefix: label_prefix.into(),
        }
    }

    /// `=hyperlink("<page>", "<prefix><page minus site root>")`
    pub fn formula(&self, page_url: &str) -> String {
        hyperlink_formula(
            page_url,
            &page_label(page_url, &self.site_root, &self.label_prefix),
        )
    }
}

/// A spreadsheet HYPERLINK formula; quotes are doubled
pub fn hyperlink_formula(target: &str, label: &str) -> String {
    format!(
        "=hyperlink(\"{}\", \"{}\")",
        target.replace('"', "\"\""),
        label.replace('"', "\"\"")
    )
}

/// Classifies a link result: broken first, then excluded, else ok
///
/// # Arguments
///
/// * `result` - The link result from the crawl driver
/// * `page_url` - The page currently being reported
/// * `labeler` - Builds the first cell of a broken row
pub fn classify(result: &LinkResult, page_url: &str, labeler: &SourceLabeler) -> Disposition {
    if result.broken {
        let reason = result
            .broken_reason
            .clone()
            .unwrap_or_else(|| "BLC_UNKNOWN".to_string());
        return Disposition::Broken(BrokenLinkRow {
            source_formula: labeler.formula(page_url),
            reason,
            resolved_url: result.resolved_url.clone(),
            original_url: Some(result.original_url.clone()).filter(|u| !u.is_empty()),
        });
    }

    if result.excluded {
        return Disposition::Excluded(
            result
                .excluded_reason
                .clone()
                .unwrap_or_else(|| "BLC_UNKNOWN".to_string()),
        );
    }

    Disposition::Ok {
        cached: result.cached,
    }
}
