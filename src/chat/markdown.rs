//! Best-effort markdown table repair
//!
//! The provider's raw output is not always spec-compliant markdown: tables
//! arrive without the header separator row, or with rows missing their
//! leading/trailing pipe. This pass fixes exactly those two defects before
//! the text is handed to a renderer, and never fails: text that does not
//! look like a table passes through untouched.

use regex::Regex;
use std::sync::OnceLock;

fn separator_cell() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*:?-+:?\s*$").expect("static regex"))
}

/// Whether a line reads as a table row.
///
/// A lone mid-sentence pipe should not count, so a row needs either an
/// outer pipe or at least two delimiters.
fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    if !trimmed.contains('|') {
        return false;
    }
    trimmed.starts_with('|') || trimmed.ends_with('|') || trimmed.matches('|').count() >= 2
}

/// Normalize a row to carry both a leading and a trailing pipe
fn normalize_row(line: &str) -> String {
    let trimmed = line.trim();
    let mut row = String::with_capacity(trimmed.len() + 2);
    if !trimmed.starts_with('|') {
        row.push('|');
    }
    row.push_str(trimmed);
    if !trimmed.ends_with('|') {
        row.push('|');
    }
    row
}

/// Cells of a normalized row
fn cells(row: &str) -> Vec<&str> {
    row.trim_matches('|').split('|').collect()
}

/// Whether a normalized row is a header separator (`|---|:--:|`)
fn is_separator_row(row: &str) -> bool {
    let cells = cells(row);
    !cells.is_empty() && cells.iter().all(|cell| separator_cell().is_match(cell))
}

fn synthesized_separator(columns: usize) -> String {
    let mut row = String::from("|");
    for _ in 0..columns {
        row.push_str("---|");
    }
    row
}

/// Repair pipe-delimited table blocks in markdown text.
///
/// A block is two or more consecutive table rows. Rows are normalized to
/// carry outer pipes; a block whose second row is not a separator gets one
/// synthesized to the header's column count.
pub fn repair_tables(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let block_end = if is_table_row(lines[i]) {
            let mut end = i;
            while end < lines.len() && is_table_row(lines[end]) {
                end += 1;
            }
            end
        } else {
            i
        };

        // A single pipe-bearing line is prose, not a table
        if block_end > i + 1 {
            let mut block: Vec<String> = lines[i..block_end].iter().map(|l| normalize_row(l)).collect();
            if !is_separator_row(&block[1]) {
                let columns = cells(&block[0]).len();
                block.insert(1, synthesized_separator(columns));
            }
            out.extend(block);
            i = block_end;
        } else {
            out.push(lines[i].to_string());
            i += 1;
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_separator_is_synthesized() {
        assert_eq!(repair_tables("|A|B|\n|1|2|"), "|A|B|\n|---|---|\n|1|2|");
    }

    #[test]
    fn test_valid_table_is_untouched() {
        let table = "|A|B|\n|---|---|\n|1|2|";
        assert_eq!(repair_tables(table), table);
    }

    #[test]
    fn test_missing_outer_pipes_normalized() {
        assert_eq!(
            repair_tables("A|B|C\n1|2|3"),
            "|A|B|C|\n|---|---|---|\n|1|2|3|"
        );
    }

    #[test]
    fn test_aligned_separator_recognized() {
        let table = "|A|B|\n|:---|---:|\n|1|2|";
        assert_eq!(repair_tables(table), table);
    }

    #[test]
    fn test_plain_text_untouched() {
        let text = "Your available margin is ₹50,000.\n\nNo tables here.";
        assert_eq!(repair_tables(text), text);
    }

    #[test]
    fn test_single_pipe_line_is_prose() {
        let text = "either buy | sell works here";
        assert_eq!(repair_tables(text), text);
    }

    #[test]
    fn test_table_embedded_in_prose() {
        let text = "Funds summary:\n|Category|Amount|\n|Cash|808.18|\nDone.";
        let repaired = repair_tables(text);
        assert_eq!(
            repaired,
            "Funds summary:\n|Category|Amount|\n|---|---|\n|Cash|808.18|\nDone."
        );
    }

    #[test]
    fn test_table_at_end_of_text() {
        let repaired = repair_tables("intro\n|H1|H2|\n|a|b|");
        assert!(repaired.ends_with("|H1|H2|\n|---|---|\n|a|b|"));
    }
}
