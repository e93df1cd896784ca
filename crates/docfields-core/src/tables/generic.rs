//! Generic whitespace-aligned table detection.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::models::document::{Table, TableCell};

lazy_static! {
    static ref COLUMN_DELIMITER: Regex = Regex::new(r"\t+|[ ]{2,}").unwrap();
}

/// Confidence assigned to every generic table cell.
pub const GENERIC_CELL_CONFIDENCE: f32 = 0.70;

/// Split a line into columns on tabs or runs of two or more spaces.
pub fn split_columns(line: &str) -> Vec<&str> {
    COLUMN_DELIMITER
        .split(line.trim())
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Emit a table for every run of two or more consecutive multi-column lines.
pub fn detect_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut run: Vec<Vec<&str>> = Vec::new();

    for line in text.lines() {
        let columns = split_columns(line);
        if columns.len() >= 2 {
            run.push(columns);
        } else {
            flush(&mut run, &mut tables);
        }
    }
    flush(&mut run, &mut tables);

    tables
}

fn flush(run: &mut Vec<Vec<&str>>, tables: &mut Vec<Table>) {
    if run.len() < 2 {
        run.clear();
        return;
    }

    let column_count = run.iter().map(Vec::len).max().unwrap_or(0);
    let cells = run
        .iter()
        .enumerate()
        .flat_map(|(row_index, row)| {
            row.iter().enumerate().map(move |(column_index, content)| TableCell {
                content: content.to_string(),
                row_index,
                column_index,
                confidence: GENERIC_CELL_CONFIDENCE,
            })
        })
        .collect();

    trace!("Generic table with {} rows, {} columns", run.len(), column_count);
    tables.push(Table::Generic {
        row_count: run.len(),
        column_count,
        cells,
    });
    run.clear();
}
