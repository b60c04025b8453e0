//! # vital-core
//!
//! Core types and error types shared by the vitals crates.
//!
//! - The questionnaire [`Profile`] handed to the measurement engine
//! - The canonical [`MeasurementRecord`] persisted after a completed scan
//! - The controller's [`Phase`] enum with its allowed transitions
//! - Audit entries emitted along the session lifecycle
//! - Cross-cutting error types

pub mod audit;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod measurement;
pub mod profile;

pub use audit::{
    AuditAction, AuditEvent, BlockedDetail, RestartDetail, SaveFailedDetail, SavedDetail,
};
pub use enums::Phase;
pub use errors::CoreError;
pub use identity::UserIdentity;
pub use measurement::MeasurementRecord;
pub use profile::{DiabetesStatus, Profile, Sex};
