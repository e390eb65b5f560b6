use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::binning::{REVENUE_RANGES, VARIANCE_BUCKETS};
use super::dates::month_of;
use super::model::{CellValue, PnlDataset, Record};

/// Columns that must be present after name normalization.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "STORE",
    "MONTH",
    "NET_REVENUE",
    "KITCHEN_EBITDA",
    "VARIANCE",
    "REVENUE_COHORT",
];

/// The source file was read but does not have the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("required columns missing after normalization: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the P&L extract from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header in row 0
/// * `.csv`     – header row followed by records
/// * `.parquet` – flat columns (strings, numbers, dates)
/// * `.json`    – `[{ "STORE": ..., "MONTH": ..., ... }, ...]`
pub fn load_file(path: &Path) -> Result<PnlDataset> {
    std::fs::metadata(path)
        .with_context(|| format!("data file {} is not readable", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path)?,
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let dataset = build_dataset(path, raw)
        .with_context(|| format!("building P&L table from {}", path.display()))?;

    log::info!(
        "Loaded {} rows from {} with columns {:?}",
        dataset.len(),
        path.display(),
        dataset.column_names
    );
    Ok(dataset)
}

/// `" net revenue "` → `"NET_REVENUE"`.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_uppercase().replace(' ', "_")
}

// ---------------------------------------------------------------------------
// Raw table → typed records
// ---------------------------------------------------------------------------

/// Header plus rows of untyped cells, as read from any source format.
#[derive(Debug)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

fn build_dataset(path: &Path, raw: RawTable) -> Result<PnlDataset> {
    let column_names: Vec<String> = raw
        .headers
        .iter()
        .map(|h| normalize_column_name(h))
        .collect();

    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, name) in column_names.iter().enumerate() {
        if index.contains_key(name.as_str()) {
            log::warn!("Duplicate column {name} after normalization; keeping the first");
            continue;
        }
        index.insert(name.clone(), i);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !index.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing).into());
    }

    let col = |name: &str| index[name];
    let (store, month, revenue, ebitda, variance, cohort) = (
        col("STORE"),
        col("MONTH"),
        col("NET_REVENUE"),
        col("KITCHEN_EBITDA"),
        col("VARIANCE"),
        col("REVENUE_COHORT"),
    );

    let empty = CellValue::Empty;
    let mut unparsed_months = 0usize;
    let records: Vec<Record> = raw
        .rows
        .iter()
        .map(|row| {
            let cell = |i: usize| row.get(i).unwrap_or(&empty);
            let parsed_month = month_of(cell(month));
            if parsed_month.is_none() && *cell(month) != CellValue::Empty {
                unparsed_months += 1;
            }
            Record::new(
                cell(store).as_label(),
                parsed_month,
                cell(revenue).as_f64(),
                cell(ebitda).as_f64(),
                cell(variance).as_f64(),
                cell(cohort).as_label(),
            )
        })
        .collect();

    if unparsed_months > 0 {
        log::warn!("{unparsed_months} MONTH values could not be parsed as dates");
    }
    for (binning, derived) in [
        (&VARIANCE_BUCKETS, records.iter().map(|r| r.variance_bucket).collect::<Vec<_>>()),
        (&REVENUE_RANGES, records.iter().map(|r| r.revenue_range).collect()),
    ] {
        let counts: Vec<String> = binning
            .buckets()
            .map(|b| format!("{b}: {}", derived.iter().filter(|d| **d == Some(b)).count()))
            .collect();
        let unbinned = derived.iter().filter(|d| d.is_none()).count();
        log::debug!("{} {counts:?}, no bucket: {unbinned}", binning.column);
    }

    Ok(PnlDataset::from_records(
        path.to_path_buf(),
        records,
        column_names,
    ))
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet; its first row is the header.
fn load_spreadsheet(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header.iter().map(spreadsheet_header).collect(),
        None => Vec::new(),
    };
    let rows = rows
        .map(|r| r.iter().map(spreadsheet_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn spreadsheet_header(cell: &Data) -> String {
    spreadsheet_cell(cell).as_label().unwrap_or_default()
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(v) => CellValue::Text(v.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(CellValue::Empty, |dt| CellValue::Date(dt.date())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names, one record per store-month.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { headers, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(v) => CellValue::Number(v),
        Err(_) => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Store": "S1", "Month": "2024-01-01", "Net Revenue": 2500000, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map_or(CellValue::Empty, json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => n
            .as_f64()
            .map_or_else(|| CellValue::Text(n.to_string()), CellValue::Number),
        JsonValue::Bool(b) => CellValue::Text(b.to_string()),
        JsonValue::Null => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Numeric columns of any width are widened to `f64`; Date32, Date64 and
/// Timestamp columns become dates; everything else is read as text.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch
            .columns()
            .iter()
            .zip(&headers)
            .map(|(col, name)| {
                arrow_column_cells(col).with_context(|| format!("converting column '{name}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|c| c[row].clone()).collect());
        }
    }

    Ok(RawTable { headers, rows })
}

// -- Arrow helpers --

/// Convert a whole Arrow column into cells.
fn arrow_column_cells(col: &ArrayRef) -> Result<Vec<CellValue>> {
    match col.data_type() {
        DataType::Utf8 => Ok(string_cells(col.as_string::<i32>().iter())),
        DataType::LargeUtf8 => Ok(string_cells(col.as_string::<i64>().iter())),
        dt if dt.is_numeric() => {
            let floats = cast(col, &DataType::Float64).context("casting to Float64")?;
            Ok(floats
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.map_or(CellValue::Empty, CellValue::Number))
                .collect())
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let dates = cast(col, &DataType::Date32).context("casting to Date32")?;
            let dates = dates.as_primitive::<Date32Type>();
            Ok((0..dates.len())
                .map(|i| {
                    if dates.is_null(i) {
                        CellValue::Empty
                    } else {
                        dates.value_as_date(i).map_or(CellValue::Empty, CellValue::Date)
                    }
                })
                .collect())
        }
        _ => {
            let text = cast(col, &DataType::Utf8).context("casting to Utf8")?;
            Ok(string_cells(text.as_string::<i32>().iter()))
        }
    }
}

fn string_cells<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<CellValue> {
    values
        .map(|v| v.map_or(CellValue::Empty, |s| CellValue::Text(s.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const CSV: &str = "\
 Store ,month,Net Revenue,kitchen ebitda,Variance,Revenue Cohort,Region
S1,2024-01-15,2500000,-1200.5,5000,A,North
S2,Feb-2024,4200000,300,15000,B,South
S3,not a date,,10,-20,A,
";

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn normalizes_column_names() {
        assert_eq!(normalize_column_name(" net revenue "), "NET_REVENUE");
        assert_eq!(normalize_column_name("Kitchen EBITDA"), "KITCHEN_EBITDA");
        assert_eq!(normalize_column_name("REVENUE_COHORT"), "REVENUE_COHORT");
    }

    #[test]
    fn loads_csv_and_types_every_column() {
        let dir = TempDir::new().unwrap();
        let ds = load_file(&write(&dir, "pnl.csv", CSV)).unwrap();

        assert_eq!(
            ds.column_names,
            [
                "STORE",
                "MONTH",
                "NET_REVENUE",
                "KITCHEN_EBITDA",
                "VARIANCE",
                "REVENUE_COHORT",
                "REGION"
            ]
        );
        assert_eq!(ds.len(), 3);

        let s1 = &ds.records[0];
        assert_eq!(s1.store.as_deref(), Some("S1"));
        assert_eq!(s1.month.map(|m| m.to_string()).as_deref(), Some("Jan-2024"));
        assert_eq!(s1.kitchen_ebitda, Some(-1200.5));
        assert_eq!(s1.variance_bucket.map(|b| b.label()), Some("0–10K"));
        assert_eq!(s1.revenue_range.map(|b| b.label()), Some("2–3M"));

        let s2 = &ds.records[1];
        assert_eq!(s2.month.map(|m| m.to_string()).as_deref(), Some("Feb-2024"));
        assert_eq!(s2.variance_bucket.map(|b| b.label()), Some("10–20K"));

        let s3 = &ds.records[2];
        assert_eq!(s3.month, None);
        assert_eq!(s3.net_revenue, None);
        assert_eq!(s3.revenue_range, None);
        assert_eq!(s3.variance_bucket, None);
        assert_eq!(s3.revenue_cohort.as_deref(), Some("A"));

        assert_eq!(ds.ebitda_bounds.min, -1200.5);
        assert_eq!(ds.ebitda_bounds.max, 300.0);
        assert_eq!(ds.revenue_bounds.min, 2_500_000.0);
        assert_eq!(ds.revenue_bounds.max, 4_200_000.0);
    }

    #[test]
    fn missing_required_columns_are_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.csv", "STORE,MONTH,NET REVENUE\nS1,2024-01-01,1\n");
        let err = load_file(&path).unwrap_err();
        let schema = err
            .downcast_ref::<SchemaError>()
            .expect("schema error in chain");
        let SchemaError::MissingColumns(cols) = schema;
        assert_eq!(cols, &["KITCHEN_EBITDA", "VARIANCE", "REVENUE_COHORT"]);
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("Kitchen_PNL_Data1.xlsx")).unwrap_err();
        assert!(format!("{err:#}").contains("not readable"));
    }

    #[test]
    fn unsupported_extension_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&write(&dir, "pnl.txt", CSV)).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn duplicate_normalized_columns_keep_the_first() {
        let dir = TempDir::new().unwrap();
        let csv = "STORE,MONTH,NET_REVENUE,KITCHEN_EBITDA,VARIANCE,REVENUE_COHORT,variance\n\
                   S1,2024-01-01,1,1,100,A,99999\n";
        let ds = load_file(&write(&dir, "dup.csv", csv)).unwrap();
        assert_eq!(ds.records[0].variance, Some(100.0));
    }

    #[test]
    fn numeric_store_ids_lose_their_fraction() {
        let dir = TempDir::new().unwrap();
        let json = r#"[
            {"Store": 101, "Month": "2024-03-01", "Net Revenue": 2500000,
             "Kitchen EBITDA": 10, "Variance": 5000, "Revenue Cohort": "A"},
            {"Store": 102.0, "Month": null, "Net Revenue": 1000,
             "Kitchen EBITDA": 20, "Variance": 50000, "Revenue Cohort": null}
        ]"#;
        let ds = load_file(&write(&dir, "pnl.json", json)).unwrap();
        assert_eq!(ds.records[0].store.as_deref(), Some("101"));
        assert_eq!(ds.records[1].store.as_deref(), Some("102"));
        assert_eq!(ds.records[1].month, None);
        assert_eq!(ds.records[1].revenue_cohort, None);
    }

    fn write_parquet(path: &Path) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Store", DataType::Utf8, true),
            Field::new("Month", DataType::Date32, true),
            Field::new("Net Revenue", DataType::Float64, true),
            Field::new("Kitchen EBITDA", DataType::Int64, true),
            Field::new("Variance", DataType::Float64, true),
            Field::new("Revenue Cohort", DataType::Utf8, true),
        ]));
        // 19737 = 2024-01-15
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("S1"), Some("S2")])),
                Arc::new(Date32Array::from(vec![Some(19737), None])),
                Arc::new(Float64Array::from(vec![Some(2_500_000.0), Some(4_200_000.0)])),
                Arc::new(Int64Array::from(vec![Some(-1200), Some(300)])),
                Arc::new(Float64Array::from(vec![Some(5_000.0), None])),
                Arc::new(StringArray::from(vec![Some("A"), Some("B")])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn loads_parquet_with_native_dates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pnl.parquet");
        write_parquet(&path);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.records[0].month.map(|m| m.to_string()).as_deref(),
            Some("Jan-2024")
        );
        assert_eq!(ds.records[0].kitchen_ebitda, Some(-1200.0));
        assert_eq!(ds.records[1].month, None);
        assert_eq!(ds.records[1].variance, None);
        assert_eq!(ds.records[1].variance_bucket, None);
    }

    #[test]
    fn csv_json_and_parquet_agree() {
        let dir = TempDir::new().unwrap();
        let csv = "Store,Month,Net Revenue,Kitchen EBITDA,Variance,Revenue Cohort\n\
                   S1,2024-01-15,2500000,-1200,5000,A\n\
                   S2,,4200000,300,,B\n";
        let json = r#"[
            {"Store": "S1", "Month": "2024-01-15", "Net Revenue": 2500000,
             "Kitchen EBITDA": -1200, "Variance": 5000, "Revenue Cohort": "A"},
            {"Store": "S2", "Month": null, "Net Revenue": 4200000,
             "Kitchen EBITDA": 300, "Variance": null, "Revenue Cohort": "B"}
        ]"#;
        let parquet = dir.path().join("pnl.parquet");
        write_parquet(&parquet);

        let from_csv = load_file(&write(&dir, "pnl.csv", csv)).unwrap();
        let from_json = load_file(&write(&dir, "pnl.json", json)).unwrap();
        let from_parquet = load_file(&parquet).unwrap();
        assert_eq!(from_csv.records, from_json.records);
        assert_eq!(from_csv.records, from_parquet.records);
    }

    fn write_xlsx(path: &Path) {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let headers = [" Store ", "Month", "Net Revenue", "Kitchen EBITDA", "Variance", "Revenue Cohort"];
        for (col, name) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }

        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let jan_15 = ExcelDateTime::from_ymd(2024, 1, 15).unwrap();
        sheet.write_number(1, 0, 101.0).unwrap();
        sheet.write_datetime_with_format(1, 1, &jan_15, &date_format).unwrap();
        sheet.write_number(1, 2, 2_500_000.0).unwrap();
        sheet.write_number(1, 3, -1_200.0).unwrap();
        sheet.write_number(1, 4, 5_000.0).unwrap();
        sheet.write_string(1, 5, "A").unwrap();

        // Second row leaves MONTH and VARIANCE blank.
        sheet.write_string(2, 0, "S2").unwrap();
        sheet.write_number(2, 2, 4_200_000.0).unwrap();
        sheet.write_number(2, 3, 300.0).unwrap();
        sheet.write_string(2, 5, "B").unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn loads_xlsx_with_native_dates_and_numeric_stores() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Kitchen_PNL_Data1.xlsx");
        write_xlsx(&path);

        let from_xlsx = load_file(&path).unwrap();
        assert_eq!(
            from_xlsx.column_names,
            ["STORE", "MONTH", "NET_REVENUE", "KITCHEN_EBITDA", "VARIANCE", "REVENUE_COHORT"]
        );
        let first = &from_xlsx.records[0];
        assert_eq!(first.store.as_deref(), Some("101"));
        assert_eq!(first.month.map(|m| m.to_string()).as_deref(), Some("Jan-2024"));
        assert_eq!(first.variance_bucket.map(|b| b.label()), Some("0–10K"));
        assert_eq!(from_xlsx.records[1].month, None);
        assert_eq!(from_xlsx.records[1].variance, None);

        let csv = "Store,Month,Net Revenue,Kitchen EBITDA,Variance,Revenue Cohort\n\
                   101,2024-01-15,2500000,-1200,5000,A\n\
                   S2,,4200000,300,,B\n";
        let from_csv = load_file(&write(&dir, "pnl.csv", csv)).unwrap();
        assert_eq!(from_xlsx.records, from_csv.records);
        assert_eq!(from_xlsx.ebitda_bounds, from_csv.ebitda_bounds);
        assert_eq!(from_xlsx.revenue_bounds, from_csv.revenue_bounds);
    }
}
