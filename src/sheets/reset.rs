//! Workbook reset issued before every crawl

use crate::config::SheetConfig;
use crate::sheets::traits::{SheetStore, SheetsResult};
use serde_json::{json, Value};

const ERRORS_HEADERS: [&str; 4] = ["Source URL", "Issue", "Resolved URL", "Original URL"];
const PAGES_HEADERS: [&str; 5] = ["Source URL", "Links", "OK", "Broken", "Skipped"];

/// Builds the batch that prepares the workbook for a new run
///
/// - inserts a row at Summary row 4 holding `Running` and `started_at`
/// - clears every value of Errors and Pages
/// - writes bold headers on Errors and Pages
/// - freezes the header row of Errors and Pages
///
/// The batch only depends on its inputs, so two resets with the same
/// timestamp send identical requests.
pub fn build_reset_requests(config: &SheetConfig, started_at: &str) -> Vec<Value> {
    let mut requests = vec![
        json!({
            "insertDimension": {
                "range": {
                    "sheetId": config.summary_sheet_id,
                    "dimension": "ROWS",
                    "startIndex": 3,
                    "endIndex": 4,
                },
            },
        }),
        json!({
            "updateCells": {
                "start": { "sheetId": config.summary_sheet_id, "rowIndex": 3, "columnIndex": 0 },
                "rows": [{
                    "values": [
                        { "userEnteredValue": { "stringValue": "Running" } },
                        { "userEnteredValue": { "stringValue": started_at } },
                    ],
                }],
                "fields": "userEnteredValue",
            },
        }),
    ];

    for (sheet_id, headers) in [
        (config.errors_sheet_id, &ERRORS_HEADERS[..]),
        (config.pages_sheet_id, &PAGES_HEADERS[..]),
    ] {
        requests.push(clear_values(sheet_id));
        requests.push(bold_headers(sheet_id, headers));
        requests.push(freeze_header_row(sheet_id));
    }

    requests
}

fn clear_values(sheet_id: i64) -> Value {
    json!({
        "updateCells": {
            "range": { "sheetId": sheet_id },
            "fields": "userEnteredValue",
        },
    })
}

fn bold_headers(sheet_id: i64, headers: &[&str]) -> Value {
    let cells: Vec<Value> = headers
        .iter()
        .map(|header| {
            json!({
                "userEnteredValue": { "stringValue": header },
                "userEnteredFormat": { "textFormat": { "bold": true } },
            })
        })
        .collect();

    json!({
        "updateCells": {
            "start": { "sheetId": sheet_id, "rowIndex": 0, "columnIndex": 0 },
            "rows": [{ "values": cells }],
            "fields": "userEnteredValue,userEnteredFormat.textFormat",
        },
    })
}

fn freeze_header_row(sheet_id: i64) -> Value {
    json!({
        "updateSheetProperties": {
            "properties": {
                "sheetId": sheet_id,
                "gridProperties": { "frozenRowCount": 1 },
            },
            "fields": "gridProperties.frozenRowCount",
        },
    })
}

/// Sends the reset batch; the crawl must not start before this returns
pub async fn reset_workbook(
    store: &dyn SheetStore,
    config: &SheetConfig,
    started_at: &str,
) -> SheetsResult<()> {
    tracing::info!("Resetting workbook...");
    store
        .batch_update(build_reset_requests(config, started_at))
        .await?;
    tracing::info!("-> Workbook reset");
    Ok(())
}
