//! The persisted record must satisfy its own generated JSON schema, including
//! the all-null shape produced for an empty vendor result.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use vital_core::MeasurementRecord;

fn validator() -> jsonschema::Validator {
    let schema = serde_json::to_value(schemars::schema_for!(MeasurementRecord)).unwrap();
    jsonschema::validator_for(&schema).expect("schema should compile")
}

#[test]
fn empty_record_matches_schema() {
    let record = MeasurementRecord::empty(
        "user_1".into(),
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
    );
    let json = serde_json::to_value(&record).unwrap();

    assert!(validator().is_valid(&json));
    assert_eq!(json["heart_rate"], serde_json::Value::Null);
    assert_eq!(json["arrhythmias_detected"], serde_json::Value::Null);
    assert_eq!(record.populated_metrics(), 0);
}

#[test]
fn populated_record_matches_schema() {
    let mut record = MeasurementRecord::empty("user_2".into(), Utc::now());
    record.heart_rate = Some(71.5);
    record.arrhythmias_detected = Some(2);
    let json = serde_json::to_value(&record).unwrap();

    assert!(validator().is_valid(&json));
    assert_eq!(record.populated_metrics(), 2);
}

#[test]
fn fractional_arrhythmia_count_violates_schema() {
    let mut json = serde_json::to_value(MeasurementRecord::empty("u".into(), Utc::now())).unwrap();
    json["arrhythmias_detected"] = serde_json::json!(1.5);
    assert!(!validator().is_valid(&json));
}

#[test]
fn roundtrips_through_json() {
    let mut record = MeasurementRecord::empty("user_3".into(), Utc::now());
    record.bmi = Some(22.4);
    let json = serde_json::to_string(&record).unwrap();
    let back: MeasurementRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}
