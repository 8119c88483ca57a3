use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::range::KeyRange;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which of the two collections a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// A single cell value. Empty cells load as `Null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Int(i64),
    Text(String),
}

static NULL: FieldValue = FieldValue::Null;

impl FieldValue {
    /// Type a raw cell: empty → `Null`, integral → `Int`, otherwise `Text`.
    pub fn parse(cell: &str) -> Self {
        if cell.is_empty() {
            return Self::Null;
        }
        // Only canonical integers; "007" and "+5" keep their spelling
        match cell.parse::<i64>() {
            Ok(n) if n.to_string() == cell => Self::Int(n),
            _ => Self::Text(cell.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String form used for equality and snapshots. `None` for null.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Int(n) => Some(Cow::Owned(n.to_string())),
            Self::Text(s) => Some(Cow::Borrowed(s)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// One keyed record. Absent fields read as null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&NULL)
    }
}

/// Coerce a raw key cell to an integer.
///
/// Accepts surrounding whitespace and integral floats (`"42.0"`), which
/// tabular exporters commonly write for integer columns. The fraction is
/// checked as text so keys beyond 2^53 keep every digit.
pub fn coerce_key(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    let (int_part, frac) = trimmed.split_once('.')?;
    if frac.is_empty() || !frac.bytes().all(|b| b == b'0') {
        return None;
    }
    int_part.parse().ok()
}

/// Records of one side keyed by id. Ids are unique by construction.
#[derive(Debug, Clone)]
pub struct RecordSet {
    side: Side,
    records: BTreeMap<i64, Record>,
}

impl RecordSet {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            records: BTreeMap::new(),
        }
    }

    pub fn from_records(
        side: Side,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Self, ReconError> {
        let mut set = Self::new(side);
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }

    /// Insert a record, rejecting a key that is already present.
    pub fn insert(&mut self, record: Record) -> Result<(), ReconError> {
        if self.records.contains_key(&record.id) {
            return Err(ReconError::DuplicateKey {
                side: self.side,
                id: record.id,
            });
        }
        self.records.insert(record.id, record);
        Ok(())
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Record> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.records.contains_key(&id)
    }

    /// Records with ids inside `range`, ascending.
    pub fn in_range(&self, range: KeyRange) -> impl Iterator<Item = &Record> {
        self.records.range(range.lower()..=range.upper()).map(|(_, r)| r)
    }
}

/// Both collections for one run.
pub struct ReconInput {
    pub left: RecordSet,
    pub right: RecordSet,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscrepancyKind {
    LeftOnly,
    RightOnly,
    Mismatch,
}

impl DiscrepancyKind {
    /// Emission order.
    pub const ALL: [DiscrepancyKind; 3] = [Self::LeftOnly, Self::RightOnly, Self::Mismatch];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftOnly => "LEFT_ONLY",
            Self::RightOnly => "RIGHT_ONLY",
            Self::Mismatch => "MISMATCH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported difference between the collections.
///
/// `left_snapshot` is present unless `kind` is `RightOnly`; `right_snapshot`
/// is present unless `kind` is `LeftOnly`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    pub id: i64,
    pub description: String,
    pub left_snapshot: Option<String>,
    pub right_snapshot: Option<String>,
    /// Compared fields that differ. Empty for presence discrepancies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCount {
    pub kind: DiscrepancyKind,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub left_records: usize,
    pub right_records: usize,
    pub left_in_range: usize,
    pub right_in_range: usize,
    pub total: usize,
    pub left_only: usize,
    pub right_only: usize,
    pub mismatches: usize,
    /// Non-zero kinds, most frequent first.
    pub by_kind: Vec<KindCount>,
}

impl ReconSummary {
    pub fn is_clean(&self) -> bool {
        self.total == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub range: KeyRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub discrepancies: Vec<Discrepancy>,
}
