//! Column Access
//! Typed extraction of polars columns into plain Rust vectors.

use polars::prelude::*;

/// Whether a dtype is a primitive integer or float.
pub fn is_numeric(dtype: &DataType) -> bool {
    is_integer(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

pub fn is_integer(dtype: &DataType) -> bool {
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
    )
}

/// Get a column as `f64` values; nulls become NaN.
pub fn column_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    let col = df.column(name)?.cast(&DataType::Float64)?;
    Ok(col
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Get a column as strings; nulls become empty strings.
pub fn column_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let col = df.column(name)?.cast(&DataType::String)?;
    Ok(col
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

/// Get list of numeric column names.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("a".into(), [1i64, 2, 3]),
            Column::new("b".into(), [Some(0.5), None, Some(2.5)]),
            Column::new("c".into(), ["x", "y", "z"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_column_f64() {
        let df = frame();
        assert_eq!(column_f64(&df, "a").unwrap(), vec![1.0, 2.0, 3.0]);
        let b = column_f64(&df, "b").unwrap();
        assert_eq!(b[0], 0.5);
        assert!(b[1].is_nan());
        assert!(column_f64(&df, "missing").is_err());
    }

    #[test]
    fn test_column_strings_and_numeric_columns() {
        let df = frame();
        assert_eq!(column_strings(&df, "c").unwrap(), vec!["x", "y", "z"]);
        assert_eq!(numeric_columns(&df), vec!["a", "b"]);
    }
}
