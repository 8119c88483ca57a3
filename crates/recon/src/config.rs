use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ReconError;
use crate::model::Side;
use crate::range::KeyRange;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    /// Column holding the integer record id in both sources.
    #[serde(default = "default_key_field")]
    pub key_field: String,
    /// Fields tested for equality on shared ids, in report order.
    #[serde(default = "default_compare")]
    pub compare: Vec<String>,
    pub range: RangeConfig,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub snapshots: SnapshotConfig,
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub report: ReportConfig,
}

fn default_key_field() -> String {
    "ID".into()
}

fn default_compare() -> Vec<String> {
    strings(&[
        "CODE_GENDER",
        "AMT_INCOME_TOTAL",
        "DAYS_BIRTH",
        "OCCUPATION_TYPE",
        "FLAG_OWN_CAR",
        "FLAG_OWN_REALTY",
    ])
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeConfig {
    pub lower: i64,
    pub upper: i64,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub left: SourceConfig,
    pub right: SourceConfig,
}

impl SourcesConfig {
    pub fn get(&self, side: Side) -> &SourceConfig {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Path to the delimited file, relative to the config file.
    pub file: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Name used in descriptions. Defaults to the side name.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_delimiter() -> char {
    ','
}

// ---------------------------------------------------------------------------
// Snapshots, store, report
// ---------------------------------------------------------------------------

/// Field subsets rendered into discrepancy snapshots.
///
/// Presence discrepancies and mismatches use separate lists; the defaults
/// keep the historical asymmetry (income type vs. birth days and occupation).
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_presence_fields")]
    pub presence: Vec<String>,
    #[serde(default = "default_mismatch_fields")]
    pub mismatch: Vec<String>,
    #[serde(default = "default_null_token")]
    pub null_token: String,
}

fn default_presence_fields() -> Vec<String> {
    strings(&["CODE_GENDER", "AMT_INCOME_TOTAL", "NAME_INCOME_TYPE"])
}

fn default_mismatch_fields() -> Vec<String> {
    strings(&["CODE_GENDER", "AMT_INCOME_TOTAL", "DAYS_BIRTH", "OCCUPATION_TYPE"])
}

fn default_null_token() -> String {
    "NULL".into()
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            presence: default_presence_fields(),
            mismatch: default_mismatch_fields(),
            null_token: default_null_token(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path, relative to the config file.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_detail_limit")]
    pub detail_limit: usize,
}

fn default_detail_limit() -> usize {
    10
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            detail_limit: default_detail_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideLabels {
    pub left: String,
    pub right: String,
}

impl Default for SideLabels {
    fn default() -> Self {
        Self {
            left: Side::Left.to_string(),
            right: Side::Right.to_string(),
        }
    }
}

/// Everything the reconciler needs besides the two collections.
#[derive(Debug, Clone)]
pub struct ReconOptions {
    pub range: KeyRange,
    pub compare: Vec<String>,
    pub snapshots: SnapshotConfig,
    pub labels: SideLabels,
}

impl ReconOptions {
    /// Options with default compare fields, snapshots and labels.
    pub fn new(range: KeyRange) -> Self {
        Self {
            range,
            compare: default_compare(),
            snapshots: SnapshotConfig::default(),
            labels: SideLabels::default(),
        }
    }

    pub fn with_compare(mut self, fields: &[&str]) -> Self {
        self.compare = strings(fields);
        self
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.key_field.trim().is_empty() {
            return Err(ReconError::ConfigValidation("key_field must not be blank".into()));
        }

        check_field_list("compare", &self.compare)?;
        check_field_list("snapshots.presence", &self.snapshots.presence)?;
        check_field_list("snapshots.mismatch", &self.snapshots.mismatch)?;

        for side in Side::ALL {
            let source = self.sources.get(side);
            if source.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "sources.{side}: file must not be blank"
                )));
            }
            if !source.delimiter.is_ascii() || source.delimiter == '"' {
                return Err(ReconError::ConfigValidation(format!(
                    "sources.{side}: delimiter {:?} must be a single ASCII character other than '\"'",
                    source.delimiter
                )));
            }
        }

        if self.report.detail_limit == 0 {
            return Err(ReconError::ConfigValidation(
                "report.detail_limit must be at least 1".into(),
            ));
        }

        KeyRange::new(self.range.lower, self.range.upper)?;
        Ok(())
    }

    /// Replace the configured range bounds (CLI overrides).
    pub fn override_range(&mut self, lower: Option<i64>, upper: Option<i64>) {
        if let Some(lower) = lower {
            self.range.lower = lower;
        }
        if let Some(upper) = upper {
            self.range.upper = upper;
        }
    }

    pub fn labels(&self) -> SideLabels {
        let label = |side: Side| {
            self.sources
                .get(side)
                .label
                .clone()
                .unwrap_or_else(|| side.to_string())
        };
        SideLabels {
            left: label(Side::Left),
            right: label(Side::Right),
        }
    }

    /// Columns every source header must carry: compare fields, then snapshot
    /// fields not already listed.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        let lists = [&self.compare, &self.snapshots.presence, &self.snapshots.mismatch];
        for field in lists.into_iter().flatten() {
            if !columns.contains(&field.as_str()) {
                columns.push(field);
            }
        }
        columns
    }

    pub fn options(&self) -> Result<ReconOptions, ReconError> {
        Ok(ReconOptions {
            range: KeyRange::new(self.range.lower, self.range.upper)?,
            compare: self.compare.clone(),
            snapshots: self.snapshots.clone(),
            labels: self.labels(),
        })
    }
}

fn check_field_list(name: &str, fields: &[String]) -> Result<(), ReconError> {
    if fields.is_empty() {
        return Err(ReconError::ConfigValidation(format!("{name}: at least one field is required")));
    }
    let mut seen = HashSet::new();
    for field in fields {
        if field.trim().is_empty() {
            return Err(ReconError::ConfigValidation(format!("{name}: blank field name")));
        }
        if !seen.insert(field.as_str()) {
            return Err(ReconError::ConfigValidation(format!(
                "{name}: field '{field}' listed twice"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
