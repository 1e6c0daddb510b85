// src/checkpoint.rs

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::GridError;
use crate::grid::Grid;

/// Durable destination for partial and final output.
pub trait GridSink {
    fn persist(&mut self, grid: &Grid) -> Result<(), GridError>;
}

/// Writes xlsx to a fixed path. Each save goes to a temp file in the same directory
/// and is renamed over the target, so a crash mid-write leaves the previous save.
pub struct XlsxFileSink {
    path: PathBuf,
}

impl XlsxFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GridSink for XlsxFileSink {
    fn persist(&mut self, grid: &Grid) -> Result<(), GridError> {
        let bytes = grid.serialize()?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let io_err = |source| GridError::Io {
            path: self.path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

/// Keeps every saved grid in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub snapshots: Vec<Grid>,
}

impl MemorySink {
    pub fn last(&self) -> Option<&Grid> {
        self.snapshots.last()
    }
}

impl GridSink for MemorySink {
    fn persist(&mut self, grid: &Grid) -> Result<(), GridError> {
        self.snapshots.push(grid.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::read_grid_from_path;

    #[test]
    fn file_sink_replaces_previous_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let mut sink = XlsxFileSink::new(&path);

        let mut grid = Grid::new("Sheet1");
        grid.set_cell(1, 12, "ACGT");
        sink.persist(&grid).unwrap();
        grid.set_cell(2, 12, "获取失败");
        sink.persist(&grid).unwrap();

        let back = read_grid_from_path(sink.path()).unwrap();
        assert_eq!(back.cell(1, 12).as_text(), Some("ACGT"));
        assert_eq!(back.cell(2, 12).as_text(), Some("获取失败"));

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn memory_sink_keeps_snapshots() {
        let mut sink = MemorySink::default();
        let mut grid = Grid::new("s");
        sink.persist(&grid).unwrap();
        grid.set_cell(1, 1, "x");
        sink.persist(&grid).unwrap();
        assert_eq!(sink.snapshots.len(), 2);
        assert_eq!(sink.snapshots[0].height(), 0);
        assert_eq!(sink.last().unwrap().cell(1, 1).as_text(), Some("x"));
    }
}
