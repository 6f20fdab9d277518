//! Terminal output helpers.
//!
//! - [`Table`] renders the end-of-run summary and the `stylist tools` listing
//!   with box-drawing characters, shrinking the widest column to fit the
//!   terminal.
//! - [`command_line`] formats an executed command the way a user would type it.
//!
//! ```rust
//! use stylist::ui::Table;
//!
//! let mut table = Table::new(&["Tool", "Status"]);
//! table.add_row(vec!["clang-format".to_string(), "ok".to_string()]);
//! print!("{}", table.render(None));
//! ```

use colored::*;
use std::ffi::OsStr;
use std::path::Path;

// Columns are never shrunk below this
const MIN_COLUMN_WIDTH: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are dropped
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) {
        let width = console::Term::stdout()
            .size_checked()
            .map(|(_rows, cols)| cols as usize);
        print!("{}", self.render(width));
    }

    /// Render the table, fitting it into `max_width` columns when given
    pub fn render(&self, max_width: Option<usize>) -> String {
        if self.headers.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| console::measure_text_width(h))
            .collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(console::measure_text_width(&one_line(cell)));
            }
        }

        if let Some(max_width) = max_width {
            // two spaces of indent, then "│ cell " per column and a closing "│"
            let overhead = 3 + 3 * widths.len();
            let budget = max_width.saturating_sub(overhead);
            while widths.iter().sum::<usize>() > budget {
                let Some((widest, &w)) = widths.iter().enumerate().max_by_key(|(_, w)| **w)
                else {
                    break;
                };
                if w <= MIN_COLUMN_WIDTH {
                    break;
                }
                widths[widest] -= 1;
            }
        }

        let border = |left: &str, mid: &str, right: &str| {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {left}{}{right}\n", cells.join(mid))
        };
        let line = |cells: &[String], bold: bool| {
            let mut out = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let text = console::truncate_str(&one_line(cell), *width, "...").into_owned();
                let pad = width.saturating_sub(console::measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text };
                out.push_str(&format!(" {text}{} │", " ".repeat(pad)));
            }
            out.push('\n');
            out
        };

        let mut out = border("┌", "┬", "┐");
        out.push_str(&line(&self.headers, true));
        out.push_str(&border("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&line(row, false));
        }
        out.push_str(&border("└", "┴", "┘"));
        out
    }
}

fn one_line(s: &str) -> String {
    s.chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect()
}

/// Printable form of `program args...`, quoted for a POSIX shell
pub fn command_line<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    let words: Vec<String> = std::iter::once(program.as_os_str())
        .chain(args.iter().map(|a| a.as_ref()))
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    shell_words::join(words)
}
