//! Questionnaire profile handed verbatim to the measurement engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::errors::CoreError;

const AGE_RANGE: RangeInclusive<u32> = 18..=120;
const HEIGHT_CM_RANGE: RangeInclusive<u32> = 120..=220;
const WEIGHT_KG_RANGE: RangeInclusive<u32> = 30..=300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiabetesStatus {
    None,
    Pre,
    Diabetic,
}

/// Health questionnaire answers. Read once at session start and immutable for
/// the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
    pub age: u32,
    pub sex: Sex,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub diabetes_status: DiabetesStatus,
    pub smoking: bool,
    pub bp_medication: bool,
}

impl Profile {
    /// Check the numeric answers against the questionnaire's accepted ranges.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_range("age", self.age, &AGE_RANGE)?;
        check_range("height_cm", self.height_cm, &HEIGHT_CM_RANGE)?;
        check_range("weight_kg", self.weight_kg, &WEIGHT_KG_RANGE)?;
        Ok(())
    }
}

fn check_range(field: &str, value: u32, range: &RangeInclusive<u32>) -> Result<(), CoreError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{field} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}
