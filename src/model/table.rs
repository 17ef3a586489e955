//! Table types.

use serde::{Deserialize, Serialize};

/// Upper bound on `num_rows * num_cols` accepted from a structure dump.
pub const MAX_TABLE_SLOTS: usize = 1 << 20;

/// A table with cells positioned on a row/column grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableElement {
    /// Number of grid rows
    pub num_rows: usize,

    /// Number of grid columns
    pub num_cols: usize,

    /// Cells in row-major order
    pub cells: Vec<TableCell>,

    /// Table caption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// Source page (1-indexed, 0 = unknown)
    #[serde(default)]
    pub page: u32,
}

impl TableElement {
    /// Create an empty table.
    pub fn new(page: u32) -> Self {
        Self {
            num_rows: 0,
            num_cols: 0,
            cells: Vec::new(),
            caption: None,
            page,
        }
    }

    /// Build a table from plain rows of text. The first row is marked as header.
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<S>], page: u32) -> Self {
        let span_rows = rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .map(|text| SpanCell::new(text.as_ref()).header(r == 0))
                    .collect()
            })
            .collect();
        Self::from_span_rows(span_rows, page)
    }

    /// Build a table from rows of possibly spanning cells.
    ///
    /// Cells are placed the way HTML tables are laid out: each cell takes the
    /// next column of its row not already covered by a row span from above.
    pub fn from_span_rows(rows: Vec<Vec<SpanCell>>, page: u32) -> Self {
        let num_rows = rows.len();
        let mut occupied: Vec<Vec<bool>> = vec![Vec::new(); num_rows];
        let mut cells = Vec::new();
        let mut num_cols = 0;

        for (r, row) in rows.into_iter().enumerate() {
            let mut col = 0;
            for span_cell in row {
                while occupied[r].get(col).copied().unwrap_or(false) {
                    col += 1;
                }
                let row_span = span_cell.row_span.max(1).min(num_rows - r);
                let col_span = span_cell.col_span.max(1);

                for covered in occupied.iter_mut().skip(r).take(row_span) {
                    if covered.len() < col + col_span {
                        covered.resize(col + col_span, false);
                    }
                    for slot in &mut covered[col..col + col_span] {
                        *slot = true;
                    }
                }

                cells.push(TableCell {
                    row: r,
                    col,
                    row_span,
                    col_span,
                    text: span_cell.text,
                    header: span_cell.header,
                });
                col += col_span;
                num_cols = num_cols.max(col);
            }
        }

        Self {
            num_rows,
            num_cols,
            cells,
            caption: None,
            page,
        }
    }

    /// Set caption and return self.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Check if the table has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() || self.num_rows == 0 || self.num_cols == 0
    }

    /// Check if any cell spans more than one row or column.
    pub fn has_merged_cells(&self) -> bool {
        self.cells.iter().any(TableCell::is_merged)
    }

    /// Number of leading rows made only of header cells.
    pub fn header_rows(&self) -> usize {
        (0..self.num_rows)
            .take_while(|&r| {
                let mut row_cells = self.cells.iter().filter(|c| c.row == r).peekable();
                row_cells.peek().is_some() && row_cells.all(|c| c.header)
            })
            .count()
    }

    /// Check the grid size and that every cell lies inside the grid.
    pub fn check_bounds(&self) -> std::result::Result<(), String> {
        let slots = self
            .num_rows
            .checked_mul(self.num_cols)
            .filter(|&n| n <= MAX_TABLE_SLOTS)
            .ok_or_else(|| format!("table grid {}x{} is too large", self.num_rows, self.num_cols))?;

        for cell in &self.cells {
            let row_end = cell.row.checked_add(cell.row_span);
            let col_end = cell.col.checked_add(cell.col_span);
            let inside = cell.row_span > 0
                && cell.col_span > 0
                && row_end.is_some_and(|end| end <= self.num_rows)
                && col_end.is_some_and(|end| end <= self.num_cols);
            if !inside {
                return Err(format!(
                    "cell at ({}, {}) spanning {}x{} is outside the {} slot grid",
                    cell.row, cell.col, cell.row_span, cell.col_span, slots
                ));
            }
        }
        Ok(())
    }

    /// Flatten the table into a simple `num_rows x num_cols` grid of text.
    ///
    /// A merged cell's text is repeated in every slot its span covers; slots
    /// no cell covers are empty. When spans overlap, the first cell in cell
    /// order keeps the slot.
    pub fn grid(&self) -> Vec<Vec<String>> {
        let mut grid: Vec<Vec<Option<&str>>> = vec![vec![None; self.num_cols]; self.num_rows];

        for cell in &self.cells {
            let row_end = cell.row.saturating_add(cell.row_span).min(self.num_rows);
            let col_end = cell.col.saturating_add(cell.col_span).min(self.num_cols);
            for row in grid.iter_mut().take(row_end).skip(cell.row) {
                for slot in row.iter_mut().take(col_end).skip(cell.col) {
                    if slot.is_none() {
                        *slot = Some(cell.text.as_str());
                    }
                }
            }
        }

        grid.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|slot| slot.unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }

    /// Plain text rendering: one line per grid row, cells tab-separated.
    pub fn plain_text(&self) -> String {
        self.grid()
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A positioned table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    /// Top row index (0-based)
    pub row: usize,

    /// Left column index (0-based)
    pub col: usize,

    /// Number of rows covered
    pub row_span: usize,

    /// Number of columns covered
    pub col_span: usize,

    /// Cell text
    pub text: String,

    /// Whether this is a header cell
    #[serde(default)]
    pub header: bool,
}

impl TableCell {
    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }
}

/// An unpositioned cell, as found in a row-major source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanCell {
    pub text: String,
    pub row_span: usize,
    pub col_span: usize,
    pub header: bool,
}

impl SpanCell {
    /// Create a 1x1 cell.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            row_span: 1,
            col_span: 1,
            header: false,
        }
    }

    /// Set rowspan and return self.
    pub fn rowspan(mut self, span: usize) -> Self {
        self.row_span = span;
        self
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: usize) -> Self {
        self.col_span = span;
        self
    }

    /// Mark as header cell and return self.
    pub fn header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }
}
