use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical record of one completed measurement.
///
/// Created at most once per session and never mutated afterwards. Every metric
/// is optional: a vendor point missing from the result leaves its field `None`
/// (serialized as `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MeasurementRecord {
    pub user_id: String,
    pub measurement_date: DateTime<Utc>,

    pub heart_rate: Option<f64>,
    pub sdnn: Option<f64>,
    pub rmssd: Option<f64>,

    pub ai_stress: Option<f64>,
    pub ai_fatigue: Option<f64>,
    pub ai_cognitive_load: Option<f64>,
    pub ai_recovery: Option<f64>,

    pub bio_age_basic: Option<f64>,
    pub vital_index_score: Option<f64>,
    pub physiological_score: Option<f64>,
    pub mental_score: Option<f64>,
    pub wellness_index_score: Option<f64>,
    pub mental_stress_index: Option<f64>,

    pub cardiac_load: Option<f64>,
    pub vascular_capacity: Option<f64>,
    pub cv_risk_heart_attack: Option<f64>,
    pub cv_risk_stroke: Option<f64>,

    pub bmi: Option<f64>,
    pub abdominal_circumference_cm: Option<f64>,
    pub waist_height_ratio: Option<f64>,
    pub body_shape_index: Option<f64>,

    pub arrhythmias_detected: Option<i64>,
    pub signal_to_noise_ratio: Option<f64>,
    pub scan_quality_index: Option<f64>,
    pub global_health_score: Option<f64>,
}

impl MeasurementRecord {
    /// A record with every metric unset.
    #[must_use]
    pub const fn empty(user_id: String, measurement_date: DateTime<Utc>) -> Self {
        Self {
            user_id,
            measurement_date,
            heart_rate: None,
            sdnn: None,
            rmssd: None,
            ai_stress: None,
            ai_fatigue: None,
            ai_cognitive_load: None,
            ai_recovery: None,
            bio_age_basic: None,
            vital_index_score: None,
            physiological_score: None,
            mental_score: None,
            wellness_index_score: None,
            mental_stress_index: None,
            cardiac_load: None,
            vascular_capacity: None,
            cv_risk_heart_attack: None,
            cv_risk_stroke: None,
            bmi: None,
            abdominal_circumference_cm: None,
            waist_height_ratio: None,
            body_shape_index: None,
            arrhythmias_detected: None,
            signal_to_noise_ratio: None,
            scan_quality_index: None,
            global_health_score: None,
        }
    }

    /// Number of metrics that carry a value.
    #[must_use]
    pub fn populated_metrics(&self) -> usize {
        let floats = [
            self.heart_rate,
            self.sdnn,
            self.rmssd,
            self.ai_stress,
            self.ai_fatigue,
            self.ai_cognitive_load,
            self.ai_recovery,
            self.bio_age_basic,
            self.vital_index_score,
            self.physiological_score,
            self.mental_score,
            self.wellness_index_score,
            self.mental_stress_index,
            self.cardiac_load,
            self.vascular_capacity,
            self.cv_risk_heart_attack,
            self.cv_risk_stroke,
            self.bmi,
            self.abdominal_circumference_cm,
            self.waist_height_ratio,
            self.body_shape_index,
            self.signal_to_noise_ratio,
            self.scan_quality_index,
            self.global_health_score,
        ];
        floats.iter().filter(|v| v.is_some()).count()
            + usize::from(self.arrhythmias_detected.is_some())
    }
}
