//! Keyword and scheme exclusions kept in the workbook

use crate::crawler::CrawlOptions;
use crate::sheets::traits::{SheetStore, SheetsResult};

/// Exclusions read from the workbook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    pub keywords: Vec<String>,
    pub schemes: Vec<String>,
}

/// Splits rows of `[keyword, scheme]` into trimmed lists
///
/// Cells that are empty once trimmed are skipped, and short rows are fine.
pub fn parse_exclusion_rows(rows: &[Vec<String>]) -> Exclusions {
    let mut exclusions = Exclusions::default();
    for row in rows {
        if let Some(keyword) = row.first().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            exclusions.keywords.push(keyword.to_string());
        }
        if let Some(scheme) = row.get(1).map(|c| c.trim()).filter(|c| !c.is_empty()) {
            exclusions.schemes.push(scheme.to_string());
        }
    }
    exclusions
}

/// Reads the exclusion range and merges it into the crawl options
pub async fn load_exclusions(
    store: &dyn SheetStore,
    range: &str,
    options: &mut CrawlOptions,
) -> SheetsResult<Exclusions> {
    tracing::info!("Retrieving excludes...");
    let rows = store.read_range(range).await?;
    let exclusions = parse_exclusion_rows(&rows);

    options.add_exclusions(exclusions.keywords.clone(), exclusions.schemes.clone());

    tracing::info!("-> Keywords Excluded: {}", options.excluded_keywords.join(", "));
    tracing::info!("-> Schemes  Excluded: {}", options.excluded_schemes.join(", "));
    Ok(exclusions)
}
