use crate::config::SourceConfig;
use crate::error::ReconError;
use crate::model::{coerce_key, FieldValue, Record, RecordSet, Side};

/// Parse delimited text into a keyed collection.
///
/// The first row is the header. Every column except `key_field` becomes a
/// typed field. A header lacking the key or any of `required` fails before
/// rows are read, as do duplicate or non-integer keys.
pub fn load_records(
    side: Side,
    data: &str,
    source: &SourceConfig,
    key_field: &str,
    required: &[&str],
) -> Result<RecordSet, ReconError> {
    let delimiter = u8::try_from(source.delimiter).map_err(|_| {
        ReconError::ConfigValidation(format!(
            "sources.{side}: delimiter {:?} is not ASCII",
            source.delimiter
        ))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Csv { side, message: e.to_string() })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let key_idx = headers.iter().position(|h| h == key_field).ok_or_else(|| {
        ReconError::MissingColumn {
            side,
            column: key_field.into(),
        }
    })?;

    // An absent column would read as null on both sides and never differ
    if let Some(column) = required.iter().find(|c| !headers.iter().any(|h| h == *c)) {
        return Err(ReconError::MissingColumn {
            side,
            column: column.to_string(),
        });
    }

    let mut set = RecordSet::new(side);

    for row in reader.records() {
        let row = row.map_err(|e| ReconError::Csv { side, message: e.to_string() })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let raw_key = row.get(key_idx).unwrap_or("");
        let id = coerce_key(raw_key).ok_or_else(|| ReconError::InvalidKey {
            side,
            line,
            value: raw_key.into(),
        })?;

        let mut record = Record::new(id);
        for (i, h) in headers.iter().enumerate() {
            if i == key_idx {
                continue;
            }
            let cell = row.get(i).unwrap_or("");
            record.fields.insert(h.clone(), FieldValue::parse(cell));
        }
        set.insert(record)?;
    }

    tracing::debug!(%side, records = set.len(), "loaded collection");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(delimiter: char) -> SourceConfig {
        SourceConfig {
            file: "unused.csv".into(),
            delimiter,
            label: None,
        }
    }

    #[test]
    fn load_semicolon_file() {
        let csv = "\
ID;CODE_GENDER;AMT_INCOME_TOTAL;OCCUPATION_TYPE
5008804;M;427500;
5008805;F;112500;Laborers
";
        let set = load_records(Side::Left, csv, &source(';'), "ID", &[]).unwrap();
        assert_eq!(set.len(), 2);
        let r = set.get(5008804).unwrap();
        assert_eq!(r.get("CODE_GENDER"), &FieldValue::Text("M".into()));
        assert_eq!(r.get("AMT_INCOME_TOTAL"), &FieldValue::Int(427500));
        assert!(r.get("OCCUPATION_TYPE").is_null());
        assert!(r.fields.get("ID").is_none());
        assert_eq!(
            set.get(5008805).unwrap().get("OCCUPATION_TYPE"),
            &FieldValue::Text("Laborers".into())
        );
    }

    #[test]
    fn load_comma_file_with_float_keys() {
        let csv = "ID,CODE_GENDER\n7.0,F\n8,M\n";
        let set = load_records(Side::Right, csv, &source(','), "ID", &[]).unwrap();
        assert!(set.contains(7));
        assert!(set.contains(8));
    }

    #[test]
    fn wrong_delimiter_misses_key_column() {
        let csv = "ID;CODE_GENDER\n1;M\n";
        let err = load_records(Side::Right, csv, &source(','), "ID", &[]).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { side: Side::Right, .. }));
    }

    #[test]
    fn misspelled_compare_column_rejected() {
        let csv = "ID,AMT_INCOME_TOTAL\n1,500\n";
        let err = load_records(Side::Left, csv, &source(','), "ID", &["AMT_INCOME"]).unwrap_err();
        match err {
            ReconError::MissingColumn { side, column } => {
                assert_eq!(side, Side::Left);
                assert_eq!(column, "AMT_INCOME");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn required_columns_present() {
        let csv = "ID,AMT_INCOME_TOTAL,OCCUPATION_TYPE\n1,500,\n";
        let set = load_records(
            Side::Right,
            csv,
            &source(','),
            "ID",
            &["AMT_INCOME_TOTAL", "OCCUPATION_TYPE"],
        )
        .unwrap();
        // Present column, empty cell: still null
        assert!(set.get(1).unwrap().get("OCCUPATION_TYPE").is_null());
    }

    #[test]
    fn large_float_keys_stay_distinct() {
        let csv = "ID,X\n9007199254740993.0,a\n9007199254740992,b\n";
        let set = load_records(Side::Left, csv, &source(','), "ID", &[]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(9007199254740993));
        assert!(set.contains(9007199254740992));
    }

    #[test]
    fn non_integer_key_reports_line() {
        let csv = "ID,X\n1,a\nabc,b\n";
        let err = load_records(Side::Left, csv, &source(','), "ID", &[]).unwrap_err();
        match err {
            ReconError::InvalidKey { side, line, value } => {
                assert_eq!(side, Side::Left);
                assert_eq!(line, 3);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_key_rejected() {
        let csv = "ID,X\n1,a\n1,b\n";
        let err = load_records(Side::Left, csv, &source(','), "ID", &[]).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "left collection: duplicate key 1");
    }

    #[test]
    fn ragged_row_is_csv_error() {
        let csv = "ID,X\n1,a,extra\n";
        let err = load_records(Side::Left, csv, &source(','), "ID", &[]).unwrap_err();
        assert!(matches!(err, ReconError::Csv { .. }));
    }
}
