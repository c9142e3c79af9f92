use crate::config::{DEFAULT_ORIGIN_LABEL, DEFAULT_TIMEZONE};
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// 311 欄位名稱，API 的篩選與排序都以這個欄位為準
pub const CREATED_DATE: &str = "created_date";

/// 單筆服務請求，欄位由 API 決定，不強制 schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Normalized `created_date` after cleaning (RFC 3339 with offset).
    pub fn created_date(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp(CREATED_DATE)
    }

    pub fn timestamp(&self, field: &str) -> Option<DateTime<FixedOffset>> {
        self.data
            .get(field)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }
}

impl From<Map<String, Value>> for Record {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

/// Ordered records sharing one column list.
///
/// Columns are the union of every record's field names in first-seen order,
/// which is also the order the persister writes them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceRequestTable {
    columns: Vec<String>,
    column_set: HashSet<String>,
    records: Vec<Record>,
}

impl ServiceRequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.push(record);
        }
        table
    }

    pub fn push(&mut self, record: Record) {
        for key in record.data.keys() {
            self.insert_column(key);
        }
        self.records.push(record);
    }

    fn insert_column(&mut self, name: &str) {
        if !self.column_set.contains(name) {
            self.column_set.insert(name.to_string());
            self.columns.push(name.to_string());
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_set.contains(name)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Record) -> bool,
    {
        self.records.retain(keep);
    }

    /// Appends (or overwrites) a column whose value is derived from each record.
    pub fn add_column<F>(&mut self, name: &str, mut derive: F)
    where
        F: FnMut(&Record) -> Value,
    {
        self.insert_column(name);
        for record in &mut self.records {
            let value = derive(record);
            record.data.insert(name.to_string(), value);
        }
    }
}

/// 資料所屬城市的時區與欄位標籤
#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    pub timezone: Tz,
    pub label: String,
}

impl Origin {
    pub fn new(timezone: Tz, label: impl Into<String>) -> Self {
        Self {
            timezone,
            label: label.into(),
        }
    }

    /// Origin for a timezone with no explicit label.
    ///
    /// The default zone keeps `nyc`; any other zone is labelled by its city
    /// segment, so `America/Chicago` becomes `chicago`.
    pub fn for_timezone(timezone: Tz) -> Self {
        if timezone == DEFAULT_TIMEZONE {
            return Self::default();
        }
        let city = timezone.name().rsplit('/').next().unwrap_or(timezone.name());
        Self::new(timezone, city.to_lowercase())
    }

    /// Name of the derived origin-timezone column, e.g. `created_date_nyc`.
    pub fn local_column(&self) -> String {
        format!("{}_{}", CREATED_DATE, self.label)
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE, DEFAULT_ORIGIN_LABEL)
    }
}

/// Rolling window boundary, computed once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub hours: i64,
    pub local_start: DateTime<Tz>,
    pub utc_start: DateTime<Utc>,
    /// `utc_start` as `YYYY-MM-DDTHH:MM:SS.mmm`, ready for a SoQL `$where`.
    pub utc_start_iso: String,
}
