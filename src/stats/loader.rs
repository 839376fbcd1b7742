//! CSV loader for the statistics table
//!
//! Columns, in order: test name, selected (`no` or anything else), average
//! duration in milliseconds, total runs. The first record is a header and
//! is always dropped.

use super::{HistoricalRecord, StatisticsTable};
use crate::error::{AppError, AppResult};

/// Number of columns every record must carry
pub const COLUMN_COUNT: usize = 4;

/// Parse raw CSV bytes into a `StatisticsTable`
///
/// Loading is all-or-nothing: a record with the wrong number of fields
/// fails the whole payload with `AppError::StatisticsParse`. Numeric cells
/// that are not integers load as `0`. Fields are read as bytes, so invalid
/// UTF-8 never fails a load: names are decoded lossily.
pub fn parse_statistics(data: &[u8]) -> AppResult<StatisticsTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for (index, result) in reader.byte_records().enumerate() {
        let record = result.map_err(|e| AppError::StatisticsParse {
            line: e
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 1),
            reason: e.to_string(),
        })?;

        if record.len() != COLUMN_COUNT {
            return Err(AppError::StatisticsParse {
                line: record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(index as u64 + 1),
                reason: format!(
                    "expected {} fields, found {}",
                    COLUMN_COUNT,
                    record.len()
                ),
            });
        }

        // Header row
        if index == 0 {
            continue;
        }

        rows.push((
            String::from_utf8_lossy(&record[0]).into_owned(),
            HistoricalRecord {
                selected: &record[1] != b"no",
                average_duration_millis: parse_lenient(&record[2]),
                total_runs: parse_lenient(&record[3]),
            },
        ));
    }

    let table: StatisticsTable = rows.into_iter().collect();
    tracing::debug!(
        tests = table.len(),
        bytes = data.len(),
        "Parsed statistics table"
    );
    Ok(table)
}

fn parse_lenient(cell: &[u8]) -> i64 {
    std::str::from_utf8(cell)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}
