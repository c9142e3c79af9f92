use crate::domain::model::{Origin, ServiceRequestTable, CREATED_DATE};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

// Socrata 的 floating timestamp 沒有時區，一律視為 UTC
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Best-effort parse of a source timestamp into a UTC instant.
///
/// Accepts RFC 3339 (any offset), Socrata floating timestamps and bare dates.
/// Anything else, including non-string values, yields `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Normalizes `created_date`, drops rows outside the window and adds the
/// origin-timezone column.
///
/// Rows with a missing or unparseable `created_date` are dropped, never
/// coerced. An empty table is returned untouched since it may have no columns.
pub fn clean_and_filter(
    mut table: ServiceRequestTable,
    boundary: DateTime<Utc>,
    origin: &Origin,
) -> ServiceRequestTable {
    if table.is_empty() {
        return table;
    }

    let before = table.len();

    for record in table.records_mut() {
        let parsed = record.get(CREATED_DATE).and_then(parse_timestamp);
        let normalized = match parsed {
            Some(instant) => Value::String(instant.to_rfc3339_opts(SecondsFormat::Millis, false)),
            None => Value::Null,
        };
        record.data.insert(CREATED_DATE.to_string(), normalized);
    }
    // 所有資料列都沒有 created_date 時也要保留欄位
    if !table.has_column(CREATED_DATE) {
        table.add_column(CREATED_DATE, |_| Value::Null);
    }

    table.retain(|record| {
        record
            .created_date()
            .map(|instant| instant >= boundary)
            .unwrap_or(false)
    });

    let dropped = before - table.len();
    if dropped > 0 {
        tracing::debug!(
            "Dropped {} of {} records with missing, unparseable or out-of-window {}",
            dropped,
            before,
            CREATED_DATE
        );
    }

    let timezone = origin.timezone;
    table.add_column(&origin.local_column(), |record| {
        record
            .created_date()
            .map(|instant| {
                Value::String(
                    instant
                        .with_timezone(&timezone)
                        .to_rfc3339_opts(SecondsFormat::Millis, false),
                )
            })
            .unwrap_or(Value::Null)
    });

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Record;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn table(rows: Vec<Value>) -> ServiceRequestTable {
        ServiceRequestTable::from_records(
            rows.into_iter()
                .map(|row| match row {
                    Value::Object(map) => Record::from(map),
                    other => panic!("expected object, got {other}"),
                })
                .collect(),
        )
    }

    fn socrata(ts: DateTime<Utc>) -> String {
        ts.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 34, 56).unwrap();

        assert_eq!(parse_timestamp(&json!("2024-05-01T12:34:56.000")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-01T12:34:56")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-01 12:34:56")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-01T08:34:56-04:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-01T12:34:56Z")), Some(expected));
        assert_eq!(
            parse_timestamp(&json!("2024-05-01")),
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single()
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(&json!("not-a-date")), None);
        assert_eq!(parse_timestamp(&json!("")), None);
        assert_eq!(parse_timestamp(&json!("2024-13-45T99:00:00")), None);
        assert_eq!(parse_timestamp(&json!(1714566896)), None);
        assert_eq!(parse_timestamp(&Value::Null), None);
    }

    #[test]
    fn test_empty_table_is_returned_unchanged() {
        let cleaned = clean_and_filter(
            ServiceRequestTable::new(),
            Utc::now(),
            &Origin::default(),
        );

        assert!(cleaned.is_empty());
        assert!(cleaned.columns().is_empty());
    }

    #[test]
    fn test_filters_out_of_window_and_invalid_rows() {
        let now = Utc::now();
        let boundary = now - Duration::hours(24);
        let raw = table(vec![
            json!({"unique_key": "a", "created_date": socrata(now - Duration::hours(30))}),
            json!({"unique_key": "b", "created_date": socrata(now - Duration::hours(10))}),
            json!({"unique_key": "c", "created_date": "not-a-date"}),
            json!({"unique_key": "d"}),
            json!({"unique_key": "e", "created_date": null}),
            json!({"unique_key": "f", "created_date": socrata(now - Duration::hours(1))}),
        ]);

        let cleaned = clean_and_filter(raw, boundary, &Origin::default());

        let keys: Vec<&str> = cleaned
            .records()
            .iter()
            .filter_map(|r| r.get("unique_key").and_then(Value::as_str))
            .collect();
        assert_eq!(keys, vec!["b", "f"]);
        for record in cleaned.records() {
            assert!(record.created_date().unwrap() >= boundary);
        }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let boundary = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let raw = table(vec![
            json!({"created_date": "2024-05-01T12:00:00.000"}),
            json!({"created_date": "2024-05-01T11:59:59.999"}),
        ]);

        let cleaned = clean_and_filter(raw, boundary, &Origin::default());

        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn test_adds_origin_column_with_same_instant() {
        let boundary = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let raw = table(vec![
            json!({"unique_key": "1", "created_date": "2024-07-04T16:00:00.000"}),
            json!({"unique_key": "2", "created_date": "2024-12-25T17:30:00.000"}),
        ]);

        let cleaned = clean_and_filter(raw, boundary, &Origin::default());

        assert_eq!(
            cleaned.columns(),
            &["unique_key", "created_date", "created_date_nyc"]
        );
        let summer = &cleaned.records()[0];
        assert_eq!(
            summer.get("created_date"),
            Some(&json!("2024-07-04T16:00:00.000+00:00"))
        );
        assert_eq!(
            summer.get("created_date_nyc"),
            Some(&json!("2024-07-04T12:00:00.000-04:00"))
        );
        let winter = &cleaned.records()[1];
        assert_eq!(
            winter.get("created_date_nyc"),
            Some(&json!("2024-12-25T12:30:00.000-05:00"))
        );
        assert_eq!(
            winter.timestamp("created_date_nyc"),
            winter.created_date()
        );
    }

    #[test]
    fn test_all_rows_invalid_yields_empty_table_with_columns() {
        let raw = table(vec![json!({"unique_key": "1", "created_date": "garbage"})]);

        let cleaned = clean_and_filter(raw, Utc::now(), &Origin::default());

        assert!(cleaned.is_empty());
        assert!(cleaned.has_column("created_date_nyc"));
    }

    #[test]
    fn test_rows_without_created_date_keep_both_date_columns() {
        let raw = table(vec![json!({"unique_key": "1"})]);

        let cleaned = clean_and_filter(raw, Utc::now() - Duration::hours(24), &Origin::default());

        assert!(cleaned.is_empty());
        assert_eq!(
            cleaned.columns(),
            &["unique_key", "created_date", "created_date_nyc"]
        );
    }
}
