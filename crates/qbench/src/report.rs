//! Markdown tables for result summaries.

use std::fmt::Write as _;

/// Column alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// A markdown table builder.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    alignments: Vec<Alignment>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
            alignments: vec![Alignment::Left; headers.len()],
        }
    }

    pub fn with_alignments(mut self, alignments: &[Alignment]) -> Self {
        self.alignments = alignments.to_vec();
        self
    }

    /// Add a row. Cells beyond the header count are not rendered.
    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(String::len).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }
        widths
    }

    /// Render as a markdown table. Headers are always centered.
    pub fn render(&self) -> String {
        if self.headers.is_empty() {
            return String::new();
        }
        let widths = self.widths();
        let align = |i: usize| self.alignments.get(i).copied().unwrap_or_default();

        let mut out = String::from("|");
        for (header, &w) in self.headers.iter().zip(&widths) {
            let _ = write!(out, " {header:^w$} |");
        }
        out.push_str("\n|");
        for (i, &w) in widths.iter().enumerate() {
            let _ = match align(i) {
                Alignment::Left => write!(out, ":{:-<w$}|", "", w = w + 1),
                Alignment::Right => write!(out, "{:-<w$}:|", "", w = w + 1),
            };
        }
        out.push('\n');

        for row in &self.rows {
            out.push('|');
            for (i, (cell, &w)) in row.iter().zip(&widths).enumerate() {
                let _ = match align(i) {
                    Alignment::Left => write!(out, " {cell:<w$} |"),
                    Alignment::Right => write!(out, " {cell:>w$} |"),
                };
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_alignment() {
        let mut table = Table::new(&["bench", "value"])
            .with_alignments(&[Alignment::Left, Alignment::Right]);
        table.add_row(vec!["parsec.vips".to_string(), "1.25".to_string()]);
        table.add_row(vec!["db".to_string(), "10.5".to_string()]);
        assert_eq!(
            table.render(),
            "|    bench    | value |\n\
             |:------------|------:|\n\
             | parsec.vips |  1.25 |\n\
             | db          |  10.5 |\n"
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(Table::default().render(), "");
        let table = Table::new(&["a"]);
        assert_eq!(table.render(), "| a |\n|:--|\n");
    }
}
