//! Table export: CSV and Parquet.
//!
//! Columns are `date` followed by every series column in order. Undefined
//! cells are written as empty CSV fields or Parquet nulls.

use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::path::Path;

use super::provider::DataError;
use crate::domain::PriceSeries;

/// Convert a table to a polars DataFrame with a Date-typed `date` column.
pub fn to_dataframe(series: &PriceSeries) -> Result<DataFrame, DataError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or_else(|| DataError::Export("epoch".into()))?;
    let days: Vec<i32> = series
        .dates()
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let mut columns = Vec::with_capacity(series.columns().len() + 1);
    columns.push(
        Column::new("date".into(), days)
            .cast(&DataType::Date)
            .map_err(|e| DataError::Export(format!("date cast: {e}")))?,
    );
    for column in series.columns() {
        let values: Vec<Option<f64>> = column
            .values
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        columns.push(Column::new(column.name.as_str().into(), values));
    }

    DataFrame::new(columns).map_err(|e| DataError::Export(format!("dataframe creation: {e}")))
}

/// Write a table to a Parquet file.
pub fn write_parquet(series: &PriceSeries, path: &Path) -> Result<(), DataError> {
    let mut df = to_dataframe(series)?;
    let file = fs::File::create(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| DataError::Export(format!("write parquet {}: {e}", path.display())))?;
    Ok(())
}

/// Render a table as CSV text.
pub fn to_csv_string(series: &PriceSeries) -> Result<String, DataError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    write_records(&mut writer, series)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| DataError::Export(format!("flush csv: {e}")))?;
    String::from_utf8(bytes).map_err(|e| DataError::Export(format!("csv is not utf-8: {e}")))
}

/// Write a table to a CSV file.
pub fn write_csv(series: &PriceSeries, path: &Path) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    write_records(&mut writer, series)?;
    writer.flush().map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_records<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    series: &PriceSeries,
) -> Result<(), DataError> {
    let csv_err = |e: csv::Error| DataError::Export(format!("write csv: {e}"));

    let mut header = vec!["date".to_string()];
    header.extend(series.column_names().into_iter().map(String::from));
    writer.write_record(&header).map_err(csv_err)?;

    for (row, date) in series.dates().iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(date.format("%Y-%m-%d").to_string());
        for column in series.columns() {
            let v = column.values[row];
            record.push(if v.is_nan() { String::new() } else { v.to_string() });
        }
        writer.write_record(&record).map_err(csv_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::csv_source::read_csv;
    use crate::domain::CLOSE;

    fn sample() -> PriceSeries {
        let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        PriceSeries::new("MSFT", vec![d(1), d(2)])
            .with_column(CLOSE, vec![410.5, 412.0])
            .unwrap()
            .with_column("SMA_20", vec![f64::NAN, 411.25])
            .unwrap()
    }

    #[test]
    fn csv_text_has_empty_cells_for_undefined() {
        let text = to_csv_string(&sample()).unwrap();
        assert_eq!(
            text,
            "date,close,SMA_20\n2024-05-01,410.5,\n2024-05-02,412,411.25\n"
        );
    }

    #[test]
    fn csv_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MSFT.csv");
        write_csv(&sample(), &path).unwrap();

        let loaded = read_csv("MSFT", &path).unwrap();
        assert_eq!(loaded.dates(), sample().dates());
        assert_eq!(loaded.column(CLOSE).unwrap(), &[410.5, 412.0]);
        let sma = loaded.column("SMA_20").unwrap();
        assert!(sma[0].is_nan());
        assert_eq!(sma[1], 411.25);
    }

    #[test]
    fn dataframe_has_nulls_and_date_dtype() {
        let df = to_dataframe(&sample()).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("SMA_20").unwrap().null_count(), 1);
    }
}
