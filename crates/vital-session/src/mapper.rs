//! Vendor point bag → canonical [`MeasurementRecord`].
//!
//! Driven by [`FIELD_MAP`], a static table of `(field, vendor key, transform)`
//! triples. Missing or unparseable points leave the field `None`; mapping
//! never fails.

use chrono::{DateTime, Utc};
use serde_json::Value;
use vital_core::MeasurementRecord;

use crate::event::Points;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Number,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    HeartRate,
    Sdnn,
    Rmssd,
    AiStress,
    AiFatigue,
    AiCognitiveLoad,
    AiRecovery,
    BioAgeBasic,
    VitalIndexScore,
    PhysiologicalScore,
    MentalScore,
    WellnessIndexScore,
    MentalStressIndex,
    CardiacLoad,
    VascularCapacity,
    CvRiskHeartAttack,
    CvRiskStroke,
    Bmi,
    AbdominalCircumferenceCm,
    WaistHeightRatio,
    BodyShapeIndex,
    ArrhythmiasDetected,
    SignalToNoiseRatio,
    ScanQualityIndex,
    GlobalHealthScore,
}

pub const FIELD_MAP: &[(CanonicalField, &str, Transform)] = &[
    (CanonicalField::HeartRate, "HR_BPM", Transform::Number),
    (CanonicalField::Sdnn, "HRV_SDNN", Transform::Number),
    (CanonicalField::Rmssd, "HRV_RMSSD", Transform::Number),
    (CanonicalField::AiStress, "AI_STRESS", Transform::Number),
    (CanonicalField::AiFatigue, "AI_FATIGUE", Transform::Number),
    (CanonicalField::AiCognitiveLoad, "AI_COGNITIVE_LOAD", Transform::Number),
    (CanonicalField::AiRecovery, "AI_RECOVERY", Transform::Number),
    (CanonicalField::BioAgeBasic, "BIO_AGE_BASIC", Transform::Number),
    (CanonicalField::VitalIndexScore, "VITAL_SCORE", Transform::Number),
    (CanonicalField::PhysiologicalScore, "PHYSIO_SCORE", Transform::Number),
    (CanonicalField::MentalScore, "MENTAL_SCORE", Transform::Number),
    (CanonicalField::WellnessIndexScore, "WELLNESS_SCORE", Transform::Number),
    (CanonicalField::MentalStressIndex, "MSI", Transform::Number),
    (CanonicalField::CardiacLoad, "CARDIAC_WORKLOAD", Transform::Number),
    (CanonicalField::VascularCapacity, "VASCULAR_CAPACITY", Transform::Number),
    (CanonicalField::CvRiskHeartAttack, "BP_HEART_ATTACK", Transform::Number),
    (CanonicalField::CvRiskStroke, "BP_STROKE", Transform::Number),
    (CanonicalField::Bmi, "BMI_CALC", Transform::Number),
    (CanonicalField::AbdominalCircumferenceCm, "WAIST_CIRCUM", Transform::Number),
    (CanonicalField::WaistHeightRatio, "WAIST_TO_HEIGHT", Transform::Number),
    (CanonicalField::BodyShapeIndex, "ABSI", Transform::Number),
    (CanonicalField::ArrhythmiasDetected, "IHB_COUNT", Transform::Integer),
    (CanonicalField::SignalToNoiseRatio, "SNR", Transform::Number),
    (CanonicalField::ScanQualityIndex, "SCAN_QUALITY", Transform::Number),
    (CanonicalField::GlobalHealthScore, "HEALTH_SCORE", Transform::Number),
];

enum Mapped {
    Number(f64),
    Integer(i64),
}

/// Build the canonical record for `user_id` from a vendor result bag.
#[must_use]
pub fn map_points(points: &Points, user_id: &str, measured_at: DateTime<Utc>) -> MeasurementRecord {
    let mut record = MeasurementRecord::empty(user_id.to_string(), measured_at);
    for &(field, key, transform) in FIELD_MAP {
        let Some(point) = points.get(key) else {
            continue;
        };
        match apply(transform, &point.value) {
            Some(value) => assign(&mut record, field, value),
            None => tracing::debug!(key, value = %point.value, "unparseable vendor point ignored"),
        }
    }
    record
}

fn apply(transform: Transform, value: &Value) -> Option<Mapped> {
    match transform {
        Transform::Number => as_number(value).map(Mapped::Number),
        Transform::Integer => as_integer(value).map(Mapped::Integer),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(|v| v.trunc() as i64)
            })
        }
        _ => None,
    }
}

fn assign(record: &mut MeasurementRecord, field: CanonicalField, value: Mapped) {
    match (field, value) {
        (CanonicalField::ArrhythmiasDetected, Mapped::Integer(count)) => {
            record.arrhythmias_detected = Some(count);
        }
        (field, Mapped::Number(value)) => {
            if let Some(slot) = number_slot(record, field) {
                *slot = Some(value);
            }
        }
        (_, Mapped::Integer(_)) => {}
    }
}

fn number_slot(
    record: &mut MeasurementRecord,
    field: CanonicalField,
) -> Option<&mut Option<f64>> {
    let slot = match field {
        CanonicalField::HeartRate => &mut record.heart_rate,
        CanonicalField::Sdnn => &mut record.sdnn,
        CanonicalField::Rmssd => &mut record.rmssd,
        CanonicalField::AiStress => &mut record.ai_stress,
        CanonicalField::AiFatigue => &mut record.ai_fatigue,
        CanonicalField::AiCognitiveLoad => &mut record.ai_cognitive_load,
        CanonicalField::AiRecovery => &mut record.ai_recovery,
        CanonicalField::BioAgeBasic => &mut record.bio_age_basic,
        CanonicalField::VitalIndexScore => &mut record.vital_index_score,
        CanonicalField::PhysiologicalScore => &mut record.physiological_score,
        CanonicalField::MentalScore => &mut record.mental_score,
        CanonicalField::WellnessIndexScore => &mut record.wellness_index_score,
        CanonicalField::MentalStressIndex => &mut record.mental_stress_index,
        CanonicalField::CardiacLoad => &mut record.cardiac_load,
        CanonicalField::VascularCapacity => &mut record.vascular_capacity,
        CanonicalField::CvRiskHeartAttack => &mut record.cv_risk_heart_attack,
        CanonicalField::CvRiskStroke => &mut record.cv_risk_stroke,
        CanonicalField::Bmi => &mut record.bmi,
        CanonicalField::AbdominalCircumferenceCm => &mut record.abdominal_circumference_cm,
        CanonicalField::WaistHeightRatio => &mut record.waist_height_ratio,
        CanonicalField::BodyShapeIndex => &mut record.body_shape_index,
        CanonicalField::SignalToNoiseRatio => &mut record.signal_to_noise_ratio,
        CanonicalField::ScanQualityIndex => &mut record.scan_quality_index,
        CanonicalField::GlobalHealthScore => &mut record.global_health_score,
        CanonicalField::ArrhythmiasDetected => return None,
    };
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Point;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn date() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn empty_bag_maps_to_all_null() {
        let record = map_points(&Points::new(), "u_1", date());
        assert_eq!(record, MeasurementRecord::empty("u_1".into(), date()));
        assert_eq!(record.populated_metrics(), 0);
    }

    #[test]
    fn every_vendor_key_populates_its_field() {
        let points: Points = FIELD_MAP
            .iter()
            .map(|&(_, key, transform)| {
                let value = match transform {
                    Transform::Number => json!(42.5),
                    Transform::Integer => json!("3"),
                };
                (key.to_string(), Point::new(value))
            })
            .collect();

        let record = map_points(&points, "u_1", date());
        assert_eq!(record.populated_metrics(), FIELD_MAP.len());
        assert_eq!(record.arrhythmias_detected, Some(3));
        assert_eq!(record.heart_rate, Some(42.5));

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["arrhythmias_detected"].is_i64());
    }

    #[test]
    fn table_covers_every_field_once() {
        let mut keys: Vec<&str> = FIELD_MAP.iter().map(|(_, key, _)| *key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), FIELD_MAP.len());
        assert_eq!(FIELD_MAP.len(), 25);
    }

    #[test]
    fn lenient_value_parsing() {
        let points: Points = [
            ("HR_BPM".to_string(), Point::new(" 71.0 ")),
            ("IHB_COUNT".to_string(), Point::new(2.9)),
            ("SNR".to_string(), Point::new("n/a")),
            ("MSI".to_string(), Point::new(json!(null))),
        ]
        .into_iter()
        .collect();

        let record = map_points(&points, "u_1", date());
        assert_eq!(record.heart_rate, Some(71.0));
        assert_eq!(record.arrhythmias_detected, Some(2));
        assert_eq!(record.signal_to_noise_ratio, None);
        assert_eq!(record.mental_stress_index, None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let points: Points = [("SOMETHING_NEW".to_string(), Point::new(1))].into_iter().collect();
        assert_eq!(map_points(&points, "u_1", date()).populated_metrics(), 0);
    }
}
