use crate::model::Record;

pub const SNAPSHOT_SEPARATOR: char = '|';

/// Pipe-join `fields` of `record`, rendering nulls as `null_token`.
pub fn render_snapshot(record: &Record, fields: &[String], null_token: &str) -> String {
    let mut out = String::new();
    for (i, name) in fields.iter().enumerate() {
        if i > 0 {
            out.push(SNAPSHOT_SEPARATOR);
        }
        match record.get(name).as_text() {
            Some(text) => out.push_str(&text),
            None => out.push_str(null_token),
        }
    }
    out
}
