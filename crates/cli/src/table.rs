// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain-text table rendering for `fsd list`.
//!
//! A full column-aware table renderer (alignment, truncation, color per
//! cell) is a platform/ecosystem collaborator this crate doesn't own;
//! this is the minimal interface this crate needs, not a general-purpose
//! library.

use std::io::Write;

pub struct Column {
    pub title: &'static str,
}

impl Column {
    pub fn new(title: &'static str) -> Self {
        Self { title }
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Render as whitespace-padded columns, widest cell per column.
    pub fn render(&self, out: &mut dyn Write) {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.title.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.len());
                }
            }
        }

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c.title, width = w))
            .collect();
        let _ = writeln!(out, "{}", header.join("  "));

        for row in &self.rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", cell, width = w))
                .collect();
            let _ = writeln!(out, "{}", line.join("  "));
        }
    }
}
