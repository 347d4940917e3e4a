//! Formatted CSV Writer
//! Writes a DataFrame with a C-style row format and a matching, aligned header.

use super::columns::is_integer;
use super::DataError;
use crate::numerics::{Arg, CFormat};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a DataFrame as a formatted csv file.
///
/// `fmt` is a C-style format for one row, without the newline, with one conversion per column
/// (e.g. `"%4i,%10.3f,%12.5e"`). The header uses the same layout with every conversion turned
/// into `%s`.
pub fn csv_formatted_from_df(df: &DataFrame, path: &Path, fmt: &str) -> Result<(), DataError> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write_formatted(df, &mut out, fmt)?;
    out.flush()?;
    Ok(())
}

/// Same as [`csv_formatted_from_df`], writing to any writer.
pub fn write_formatted<W: Write>(df: &DataFrame, out: &mut W, fmt: &str) -> Result<(), DataError> {
    let row_fmt = CFormat::parse(fmt)?;
    if row_fmt.arg_count() != df.width() {
        return Err(DataError::ColumnCount {
            format: row_fmt.arg_count(),
            columns: df.width(),
        });
    }

    let names: Vec<Arg> = df
        .get_column_names()
        .iter()
        .map(|s| Arg::Str(s.to_string()))
        .collect();
    writeln!(out, "{}", row_fmt.header_format().format(&names)?)?;

    let columns = df
        .get_columns()
        .iter()
        .map(column_args)
        .collect::<Result<Vec<_>, _>>()?;

    let mut row = Vec::with_capacity(columns.len());
    for i in 0..df.height() {
        row.clear();
        row.extend(columns.iter().map(|c| c[i].clone()));
        writeln!(out, "{}", row_fmt.format(&row)?)?;
    }
    Ok(())
}

fn column_args(col: &Column) -> PolarsResult<Vec<Arg>> {
    let dtype = col.dtype();
    if is_integer(dtype) {
        let ints = col.cast(&DataType::Int64)?;
        Ok(ints
            .i64()?
            .into_iter()
            .map(|v| v.map(Arg::Int).unwrap_or(Arg::Float(f64::NAN)))
            .collect())
    } else if matches!(dtype, DataType::Float32 | DataType::Float64) {
        let floats = col.cast(&DataType::Float64)?;
        Ok(floats
            .f64()?
            .into_iter()
            .map(|v| Arg::Float(v.unwrap_or(f64::NAN)))
            .collect())
    } else {
        let strings = col.cast(&DataType::String)?;
        Ok(strings
            .str()?
            .into_iter()
            .map(|v| Arg::Str(v.unwrap_or_default().to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_formatted() {
        let df = DataFrame::new(vec![
            Column::new("i".into(), [1i32, 2]),
            Column::new("x".into(), [0.5f64, -1.25]),
            Column::new("name".into(), ["ab", "c"]),
        ])
        .unwrap();

        let mut buf = Vec::new();
        write_formatted(&df, &mut buf, "%3i %8.3f  %-4s").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "  i        x  name\n  1    0.500  ab  \n  2   -1.250  c   \n"
        );
    }

    #[test]
    fn test_column_count_mismatch() {
        let df = DataFrame::new(vec![Column::new("x".into(), [1.0f64])]).unwrap();
        let mut buf = Vec::new();
        assert!(matches!(
            write_formatted(&df, &mut buf, "%f %f"),
            Err(DataError::ColumnCount {
                format: 2,
                columns: 1
            })
        ));
    }

    #[test]
    fn test_csv_formatted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let df = DataFrame::new(vec![Column::new("y".into(), [1.0f64, 2.0])]).unwrap();
        csv_formatted_from_df(&df, &path, "%6.2e").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next(), Some("     y"));
        assert_eq!(text.lines().nth(1), Some("1.00e+00"));
    }
}
