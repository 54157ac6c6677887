use crate::error::{DashboardError, Result};
use crate::normalize::BankDirectory;
use crate::types::{RawAtmRow, RowOrigin, ATM_COLUMNS};
use crate::util::{cell_text, parse_f64_safe, parse_i64_safe};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File extensions accepted as ATM sources.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "ods", "csv"];

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub files: usize,
    pub total_rows: usize,
}

/// Fail with `MissingFile` unless `path` exists.
pub fn check_file_exists(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        return Err(DashboardError::missing_file(name, path));
    }
    Ok(())
}

/// List source files in `dir`, sorted by file name.
pub fn discover_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DashboardError::missing_file("ATM data directory", dir));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SOURCE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load and concatenate every ATM source file in `dir`, keeping exactly the
/// `ATM_COLUMNS` fields. Order is file order, then row order. No dedup.
pub fn load_atm_rows(dir: &Path) -> Result<(Vec<RawAtmRow>, LoadReport)> {
    let files = discover_sources(dir)?;
    let mut rows = Vec::new();

    for path in &files {
        // The file may have vanished since discovery.
        check_file_exists(path, "ATM file")?;
        let grid = read_grid(path, None)?;
        let Some((header, body)) = grid.split_first() else {
            debug!(file = %path.display(), "empty source file");
            continue;
        };
        let indices = column_indices(header, &ATM_COLUMNS, path)?;
        let before = rows.len();
        for (i, line) in body.iter().enumerate() {
            if line.iter().all(|c| c.is_empty()) {
                continue;
            }
            let cells = indices
                .iter()
                .map(|&idx| line.get(idx).cloned().unwrap_or_default())
                .collect();
            let origin = RowOrigin {
                file: path.clone(),
                row: i + 1,
            };
            rows.push(RawAtmRow::from_cells(cells, origin));
        }
        debug!(file = %path.display(), rows = rows.len() - before, "loaded ATM source");
    }

    let report = LoadReport {
        files: files.len(),
        total_rows: rows.len(),
    };
    info!(files = report.files, rows = report.total_rows, "ATM sources loaded");
    Ok((rows, report))
}

/// Read the bank reference sheet (`Bank_Code`, `Bank_Name`).
pub fn load_bank_directory(path: &Path, sheet: &str) -> Result<BankDirectory> {
    check_file_exists(path, "Bank names file")?;
    let grid = read_grid(path, Some(sheet))?;
    let Some((header, body)) = grid.split_first() else {
        return Ok(BankDirectory::default());
    };
    let idx = column_indices(header, &["Bank_Code", "Bank_Name"], path)?;

    let mut entries = Vec::new();
    for line in body {
        let code_text = line.get(idx[0]).map(String::as_str).unwrap_or("");
        if code_text.trim().is_empty() {
            continue;
        }
        let code = parse_i64_safe(Some(code_text)).ok_or_else(|| {
            DashboardError::MalformedData(format!(
                "{}: bank code '{}' is not an integer",
                path.display(),
                code_text
            ))
        })?;
        let name = line.get(idx[1]).cloned().unwrap_or_default();
        entries.push((code, name));
    }
    Ok(BankDirectory::from_entries(entries))
}

/// Sum the population column. Blank cells count as zero.
pub fn load_population_total(path: &Path, sheet: &str, column: &str) -> Result<f64> {
    check_file_exists(path, "Population file")?;
    let grid = read_grid(path, Some(sheet))?;
    let Some((header, body)) = grid.split_first() else {
        return Ok(0.0);
    };
    let idx = column_indices(header, &[column], path)?[0];

    let mut total = 0.0;
    for (i, line) in body.iter().enumerate() {
        let text = line.get(idx).map(String::as_str).unwrap_or("");
        if text.trim().is_empty() {
            continue;
        }
        total += parse_f64_safe(Some(text)).ok_or_else(|| {
            DashboardError::MalformedData(format!(
                "{}, row {}: population '{}' is not a number",
                path.display(),
                i + 1,
                text
            ))
        })?;
    }
    Ok(total)
}

/// Read a tabular file into rows of cell text. The first row is the header.
/// Spreadsheets use `sheet` or their first worksheet; CSV ignores `sheet`.
fn read_grid(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<String>>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        let mut grid = Vec::new();
        for result in rdr.records() {
            let record = result?;
            grid.push(record.iter().map(str::to_string).collect());
        }
        return Ok(grid);
    }

    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(s) if names.iter().any(|n| n == s) => s.to_string(),
        Some(s) => {
            return Err(DashboardError::MissingSheet {
                file: path.to_path_buf(),
                sheet: s.to_string(),
            })
        }
        None => match names.first() {
            Some(first) => first.clone(),
            None => return Ok(Vec::new()),
        },
    };
    let range = workbook.worksheet_range(&name)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn column_indices(header: &[String], wanted: &[&str], file: &Path) -> Result<Vec<usize>> {
    wanted
        .iter()
        .map(|col| {
            header
                .iter()
                .position(|h| h.trim() == *col)
                .ok_or_else(|| DashboardError::MissingColumn {
                    file: file.to_path_buf(),
                    column: col.to_string(),
                })
        })
        .collect()
}
