//! Parse uploaded bytes into a [`Table`].
//!
//! The parser is picked from the file name alone: a `.csv` suffix goes to the Polars CSV
//! reader, everything else to the Excel reader. Content is never sniffed, so a CSV saved
//! as `.xlsx` fails with the spreadsheet parser's error.

use calamine::{Data, DataType as CellType, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::datatypes::TimeUnit;
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use storeviz_cli::FileFormat;

use crate::config::LoadingConfig;
use crate::table::Table;
use crate::upload::UploadedFile;

/// CSV reading knobs; Excel cells carry their own types.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadOptions {
    pub try_parse_dates: bool,
    /// None scans every row before settling on column types
    pub infer_schema_length: Option<usize>,
}

impl From<&LoadingConfig> for LoadOptions {
    fn from(config: &LoadingConfig) -> Self {
        Self {
            try_parse_dates: config.try_parse_dates,
            infer_schema_length: config.infer_schema_length,
        }
    }
}

/// Load with default options.
pub fn load_table(file: &UploadedFile) -> Result<Table> {
    load_table_with(file, &LoadOptions::default())
}

pub fn load_table_with(file: &UploadedFile, options: &LoadOptions) -> Result<Table> {
    let df = match file.format() {
        FileFormat::Csv => read_csv_bytes(file.bytes(), options)?,
        FileFormat::Excel => read_xlsx_bytes(file.bytes())?,
    };
    tracing::info!(
        file = file.name(),
        rows = df.height(),
        columns = df.width(),
        "table loaded"
    );
    Ok(Table::new(df))
}

pub fn read_csv_bytes(bytes: &[u8], options: &LoadOptions) -> Result<DataFrame> {
    let mut read_options = CsvReadOptions::default();
    read_options.has_header = true;
    read_options.infer_schema_length = options.infer_schema_length;
    let try_parse_dates = options.try_parse_dates;
    read_options = read_options.map_parse_options(|opts| opts.with_try_parse_dates(try_parse_dates));

    let df = CsvReader::new(Cursor::new(bytes.to_vec()))
        .with_options(read_options)
        .finish()?;

    // the reader suffixes repeated headers its own way; name them like the Excel path
    let mut names = header_names(csv_header_cells(bytes)?);
    if names.len() != df.width() {
        names = df.get_column_names().iter().map(|n| n.to_string()).collect();
    }
    let height = df.height();
    let columns = df
        .get_columns()
        .iter()
        .zip(names)
        .map(|(column, name)| {
            let mut column = column.clone();
            column.rename(name.into());
            // a column with no values at all reads as missing numbers
            if height > 0 && column.null_count() == height && column.dtype() == &DataType::String {
                column = column.cast(&DataType::Float64)?;
            }
            Ok(column)
        })
        .collect::<Result<Vec<Column>>>()?;
    Ok(DataFrame::new(columns)?)
}

/// The first CSV row as written, every cell read as text.
fn csv_header_cells(bytes: &[u8]) -> Result<Vec<Option<String>>> {
    let mut options = CsvReadOptions::default();
    options.has_header = false;
    options.n_rows = Some(1);
    options.infer_schema_length = Some(0);
    let header = CsvReader::new(Cursor::new(bytes.to_vec()))
        .with_options(options)
        .finish()?;
    header
        .get_columns()
        .iter()
        .map(|column| Ok(column.str()?.get(0).map(str::to_string)))
        .collect()
}

/// Column names from header cells: blanks become `Unnamed: <index>` and repeats get
/// `.1`, `.2`, ... so every name is unique.
fn header_names(cells: impl IntoIterator<Item = Option<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    cells
        .into_iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = match cell {
                Some(name) if !name.is_empty() => name,
                _ => format!("Unnamed: {}", idx),
            };
            unique_name(name, &mut seen)
        })
        .collect()
}

/// Inferred type for an Excel column (keeps numbers, bools and dates typed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExcelColType {
    Int64,
    Float64,
    Boolean,
    Utf8,
    Date,
    Datetime,
}

/// First worksheet only; the first row holds the headers.
pub fn read_xlsx_bytes(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes.to_vec())).map_err(|e| eyre!("Excel: {}", e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| eyre!("Excel file has no worksheets"))?
        .map_err(|e| eyre!("Excel: {}", e))?;

    let rows: Vec<&[Data]> = range.rows().collect();
    let Some((header_row, body)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };

    let names = header_names(header_row.iter().map(CellType::as_string));
    let mut columns = Vec::with_capacity(names.len());
    for (col_idx, name) in names.iter().enumerate() {
        let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(col_idx)).collect();
        let series = excel_column_to_series(name, &cells, infer_column_type(&cells))?;
        columns.push(series.into());
    }

    Ok(DataFrame::new(columns)?)
}

fn unique_name(name: String, seen: &mut HashSet<String>) -> String {
    if seen.insert(name.clone()) {
        return name;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{name}.{n}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Any text makes the column text. Whole-number floats become Int64; date cells become
/// Date when every value sits on midnight, Datetime otherwise. An empty column is Float64.
fn infer_column_type(cells: &[Option<&Data>]) -> ExcelColType {
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    let mut has_datetime = false;
    for cell in cells.iter().flatten() {
        if cell.is_string() {
            return ExcelColType::Utf8;
        }
        if cell.is_datetime() || cell.is_datetime_iso() {
            has_datetime = true;
        } else if cell.is_float() {
            has_float = true;
        } else if cell.is_int() {
            has_int = true;
        } else if cell.is_bool() {
            has_bool = true;
        }
    }

    if has_datetime && !has_float && !has_int && !has_bool {
        if all_midnight(cells) {
            ExcelColType::Date
        } else {
            ExcelColType::Datetime
        }
    } else if has_datetime {
        ExcelColType::Utf8
    } else if has_float {
        let all_whole = cells.iter().flatten().all(|cell| {
            cell.as_f64()
                .is_none_or(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10)
        });
        if all_whole {
            ExcelColType::Int64
        } else {
            ExcelColType::Float64
        }
    } else if has_int {
        ExcelColType::Int64
    } else if has_bool {
        ExcelColType::Boolean
    } else {
        // only empty cells: a float column of missing values
        ExcelColType::Float64
    }
}

fn all_midnight(cells: &[Option<&Data>]) -> bool {
    cells
        .iter()
        .flatten()
        .filter_map(|c| cell_to_naive_datetime(c))
        .all(|dt| dt.time() == NaiveTime::MIN)
}

fn cell_to_naive_datetime(cell: &Data) -> Option<NaiveDateTime> {
    if let Some(dt) = cell.as_datetime() {
        return Some(dt);
    }
    let s = cell.get_datetime_iso()?;
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn excel_column_to_series(
    name: &str,
    cells: &[Option<&Data>],
    col_type: ExcelColType,
) -> Result<Series> {
    let series = match col_type {
        ExcelColType::Int64 => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_f64()).map(|f| f as i64))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Float64 => {
            let v: Vec<Option<f64>> = cells.iter().map(|c| c.and_then(|cell| cell.as_f64())).collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Boolean => {
            let v: Vec<Option<bool>> = cells.iter().map(|c| c.and_then(|cell| cell.get_bool())).collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Utf8 => {
            let v: Vec<Option<String>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_string()))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Date => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
                .ok_or_else(|| eyre!("invalid epoch date"))?;
            let v: Vec<Option<i32>> = cells
                .iter()
                .map(|c| {
                    c.and_then(cell_to_naive_datetime)
                        .map(|dt| (dt.date() - epoch).num_days() as i32)
                })
                .collect();
            Series::new(name.into(), v).cast(&DataType::Date)?
        }
        ExcelColType::Datetime => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| {
                    c.and_then(cell_to_naive_datetime)
                        .map(|dt| dt.and_utc().timestamp_micros())
                })
                .collect();
            Series::new(name.into(), v).cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
        }
    };
    Ok(series)
}
