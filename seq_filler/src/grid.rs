// src/grid.rs
// -----------------------------------------------------------------------------
// In-memory cell grid. Reading goes through calamine (values only, formulas come
// back as their cached results); writing goes through rust_xlsxwriter.
// Rows and columns are 1-indexed at this API, like spreadsheet addresses.
// -----------------------------------------------------------------------------

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, CellErrorType, DataType, Range, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use tracing::{debug, warn};

use crate::error::GridError;

/// Longest string a single xlsx cell can hold.
pub const XLSX_MAX_STRING_LEN: usize = 32_767;

const OUTPUT_SUFFIX: &str = "_序列获取后";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
}

impl CellValue {
    /// Falsy cells count as absent input: empty, `""`, zero and `false`.
    pub fn is_absent(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(n) => *n == 0.0,
            CellValue::Int(i) => *i == 0,
            CellValue::Bool(b) => !*b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

fn cell_from_calamine(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Empty => CellValue::Empty,
        DataType::Bool(b) => CellValue::Bool(*b),
        DataType::Error(e) => CellValue::Text(error_literal(e).to_string()),
        DataType::Float(n) | DataType::Duration(n) | DataType::DateTime(n) => {
            CellValue::Number(*n)
        }
        DataType::Int(i) => CellValue::Int(*i),
        DataType::DateTimeIso(s) | DataType::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// The literal Excel shows for an error cell.
fn error_literal(e: &CellErrorType) -> &'static str {
    match e {
        CellErrorType::Div0 => "#DIV/0!",
        CellErrorType::NA => "#N/A",
        CellErrorType::Name => "#NAME?",
        CellErrorType::Null => "#NULL!",
        CellErrorType::Num => "#NUM!",
        CellErrorType::Ref => "#REF!",
        CellErrorType::Value => "#VALUE!",
        CellErrorType::GettingData => "#GETTING_DATA",
    }
}

static EMPTY: CellValue = CellValue::Empty;

/// One worksheet's worth of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    pub sheet_name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            rows: Vec::new(),
        }
    }

    /// Number of rows, counted from row 1 to the last row holding anything.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        if row == 0 || col == 0 {
            return &EMPTY;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .unwrap_or(&EMPTY)
    }

    /// Writes a cell, growing the grid as needed. Row/col 0 is ignored.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<CellValue>) {
        if row == 0 || col == 0 {
            return;
        }
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let r = &mut self.rows[row - 1];
        if r.len() < col {
            r.resize(col, CellValue::Empty);
        }
        r[col - 1] = value.into();
    }

    fn from_range(sheet_name: String, range: &Range<DataType>) -> Self {
        let mut grid = Grid::new(sheet_name);
        let Some((start_row, start_col)) = range.start() else {
            return grid;
        };
        for (i, row) in range.rows().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                let value = cell_from_calamine(cell);
                if value != CellValue::Empty {
                    grid.set_cell(start_row as usize + i + 1, start_col as usize + j + 1, value);
                }
            }
        }
        // keep trailing rows that exist in the sheet but hold nothing
        if let Some((end_row, _)) = range.end() {
            let height = end_row as usize + 1;
            if grid.rows.len() < height {
                grid.rows.resize_with(height, Vec::new);
            }
        }
        grid
    }

    /// Serialises the grid into xlsx bytes.
    pub fn serialize(&self) -> Result<Vec<u8>, GridError> {
        let mut workbook = self.to_workbook()?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Writes the grid as an xlsx file at `path`.
    pub fn persist_to(&self, path: &Path) -> Result<(), GridError> {
        let mut workbook = self.to_workbook()?;
        workbook.save(path)?;
        Ok(())
    }

    fn to_workbook(&self) -> Result<Workbook, GridError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        if !self.sheet_name.is_empty() {
            sheet.set_name(&self.sheet_name)?;
        }

        for (r, row) in self.rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (row_num, col_num) = xlsx_address(r, c)?;
                match value {
                    CellValue::Empty => {}
                    CellValue::Text(s) => {
                        sheet.write_string(row_num, col_num, clip_for_xlsx(s, r + 1, c + 1))?;
                    }
                    CellValue::Number(n) => {
                        sheet.write_number(row_num, col_num, *n)?;
                    }
                    CellValue::Int(i) => {
                        sheet.write_number(row_num, col_num, *i as f64)?;
                    }
                    CellValue::Bool(b) => {
                        sheet.write_boolean(row_num, col_num, *b)?;
                    }
                }
            }
        }
        Ok(workbook)
    }
}

fn xlsx_address(r: usize, c: usize) -> Result<(u32, u16), GridError> {
    match (u32::try_from(r), u16::try_from(c)) {
        (Ok(row), Ok(col)) => Ok((row, col)),
        _ => Err(GridError::OutOfRange { row: r + 1, col: c + 1 }),
    }
}

fn clip_for_xlsx(s: &str, row: usize, col: usize) -> &str {
    if s.chars().count() <= XLSX_MAX_STRING_LEN {
        return s;
    }
    warn!(
        "Cell ({}, {}) holds {} characters; truncating to {}",
        row,
        col,
        s.chars().count(),
        XLSX_MAX_STRING_LEN
    );
    match s.char_indices().nth(XLSX_MAX_STRING_LEN) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Reads the first worksheet of a workbook on disk (xlsx, xls, xlsb, ods).
pub fn read_grid_from_path(path: &Path) -> Result<Grid, GridError> {
    let source = path.display().to_string();
    let mut wb = open_workbook_auto(path).map_err(|e| GridError::Read {
        path: source.clone(),
        message: e.to_string(),
    })?;
    let sheet_name = wb.sheet_names().first().cloned().unwrap_or_default();
    let range = wb
        .worksheet_range_at(0)
        .ok_or_else(|| GridError::NoWorksheet(source.clone()))?
        .map_err(|e| GridError::Read {
            path: source.clone(),
            message: e.to_string(),
        })?;
    let grid = Grid::from_range(sheet_name, &range);
    debug!("Read {} rows from {}", grid.height(), source);
    Ok(grid)
}

/// Reads the first worksheet of an in-memory xlsx file.
pub fn read_grid_from_bytes(bytes: &[u8]) -> Result<Grid, GridError> {
    let source = "<memory>".to_string();
    let mut wb: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec())).map_err(|e| GridError::Read {
        path: source.clone(),
        message: e.to_string(),
    })?;
    let sheet_name = wb.sheet_names().first().cloned().unwrap_or_default();
    let range = wb
        .worksheet_range_at(0)
        .ok_or_else(|| GridError::NoWorksheet(source.clone()))?
        .map_err(|e| GridError::Read {
            path: source.clone(),
            message: e.to_string(),
        })?;
    Ok(Grid::from_range(sheet_name, &range))
}

/// `<dir>/<stem>_序列获取后.xlsx` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}.xlsx"))
}
