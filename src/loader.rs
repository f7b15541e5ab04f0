use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::domain::HrError;
use crate::table::{Column, Value};

pub type Record = Vec<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileType {
    Csv,
    Parquet,
    Arrow,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// Rows of a tabular file, every cell already converted to a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    /// One column per header reading the cell at the header's position.
    pub fn columns(&self) -> Vec<Column<Record>> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                Column::new(header.clone(), move |record: &Record| {
                    record.get(idx).cloned().unwrap_or(Value::Null)
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[instrument]
pub fn load(path: PathBuf) -> Result<Dataset, HrError> {
    let file_info = get_file_info(path)?;
    debug!("Loading {:?} ({} bytes)", file_info.file_type, file_info.file_size);
    let frame = match file_info.file_type {
        FileType::Csv => load_csv(&file_info.path)?,
        FileType::Parquet => load_parquet(&file_info.path)?,
        FileType::Arrow => load_arrow(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;

    // Each column is converted on its own worker
    let columns: Vec<(String, Vec<Value>)> = df
        .get_column_names()
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect::<Result<_, PolarsError>>()?;

    let (headers, cells): (Vec<String>, Vec<Vec<Value>>) = columns.into_iter().unzip();
    let records = transpose(cells, df.height());

    info!(
        "Loaded {} rows x {} columns in {}ms",
        records.len(),
        headers.len(),
        start_time.elapsed().as_millis()
    );

    let name = file_info
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("???")
        .to_string();
    if headers.is_empty() {
        return Err(HrError::loading_failed(format!("{name} has no columns")));
    }

    Ok(Dataset {
        name,
        headers,
        records,
    })
}

fn transpose(columns: Vec<Vec<Value>>, height: usize) -> Vec<Record> {
    let mut records: Vec<Record> = (0..height).map(|_| Vec::with_capacity(columns.len())).collect();
    for column in columns {
        for (record, value) in records.iter_mut().zip(column) {
            record.push(value);
        }
    }
    records
}

fn detect_file_type(path: &Path) -> Result<FileType, HrError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::Csv),
        Some("PARQUET") | Some("PQ") => Ok(FileType::Parquet),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::Arrow),
        _ => Err(HrError::UnknownFileType(path.to_path_buf())),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, HrError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => HrError::FileNotFound(path.clone()),
        ErrorKind::PermissionDenied => HrError::PermissionDenied(path.clone()),
        _ => HrError::Io(e),
    })?;
    if !metadata.is_file() {
        return Err(HrError::loading_failed(format!("{} is not a file", path.display())));
    }

    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        file_size: metadata.len(),
        path,
        file_type,
    })
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<(String, Vec<Value>), PolarsError> {
    let original_dtype = df.column(col_name)?.dtype().clone();
    let numeric = is_numeric_type(&original_dtype);
    let boolean = original_dtype == DataType::Boolean;

    let col = df.column(col_name)?.cast(&DataType::String)?;
    let series = col.str()?;
    let values = series
        .into_iter()
        .map(|cell| match cell {
            None => Value::Null,
            Some(s) if boolean => Value::Bool(s == "true"),
            Some(s) => Value::parse_cell(s, numeric),
        })
        .collect();

    Ok((col_name.to_string(), values))
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}
