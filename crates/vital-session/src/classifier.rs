//! Maps a raw vendor error to the controller's reaction.
//!
//! Rules are evaluated in a fixed priority order and the first match wins:
//!
//! 1. empty payload → ignored
//! 2. message mentions a connection problem → [`Disposition::TechnicalReconnect`]
//! 3. `MEASUREMENT_LOW_SNR` → [`Disposition::TransientWarning`]
//! 4. message mentions movement → [`Disposition::DebouncedWarning`]
//! 5. code in [`BLOCKING_CODES`] → [`Disposition::BlockingError`] from the table
//! 6. `COLLECTOR` / `WORKER_ERROR` → [`Disposition::SilentRestart`]
//! 7. anything else → recoverable "unexpected error" [`Disposition::BlockingError`]
//!
//! A movement message carrying a blocking code is therefore a warning, and a
//! network message carrying any code is a reconnect.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::event::ErrorEvent;

pub const CODE_LOW_SNR: &str = "MEASUREMENT_LOW_SNR";
pub const CODE_CAMERA_PERMISSION_DENIED: &str = "CAMERA_PERMISSION_DENIED";
pub const CODE_MEASUREMENT_INCOMPLETE: &str = "MEASUREMENT_INCOMPLETE";
pub const CODE_NO_DEVICES_FOUND: &str = "NO_DEVICES_FOUND";
pub const CODE_PAGE_NOT_VISIBLE: &str = "PAGE_NOT_VISIBLE";

const RECONNECT_PATTERNS: &[&str] = &["websocket", "disconnected", "wasclean", "connection", "network"];
const MOVEMENT_PATTERNS: &[&str] = &["movement", "motion"];
const SILENT_RESTART_CODES: &[&str] = &["COLLECTOR", "WORKER_ERROR"];

pub const RECONNECT_WARNING: WarningSpec = WarningSpec {
    message: "Reconnecting…",
    ttl: Duration::from_secs(2),
};
pub const WEAK_SIGNAL_WARNING: WarningSpec = WarningSpec {
    message: "Weak signal. Improve the lighting and face the camera.",
    ttl: Duration::from_secs(3),
};
pub const STAY_STILL_WARNING: WarningSpec = WarningSpec {
    message: "Please stay still.",
    ttl: Duration::from_secs(2),
};

/// Text and lifetime of a transient on-screen warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningSpec {
    pub message: &'static str,
    pub ttl: Duration,
}

/// Content of a blocking, full-screen error dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDialog {
    pub code: Option<String>,
    pub title: String,
    pub message: String,
    /// Whether a retry action is offered.
    pub recoverable: bool,
}

impl ErrorDialog {
    /// Dialog for a failed bootstrap: generic title, no retry.
    #[must_use]
    pub fn fatal_bootstrap(message: impl Into<String>) -> Self {
        Self {
            code: None,
            title: "Unable to start measurement".into(),
            message: message.into(),
            recoverable: false,
        }
    }

    #[must_use]
    pub fn timed_out() -> Self {
        Self {
            code: None,
            title: "Measurement timed out".into(),
            message: "The measurement took too long to finish. Please try again.".into(),
            recoverable: true,
        }
    }
}

/// Static entry of the blocking-code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockingEntry {
    pub code: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub recoverable: bool,
}

impl BlockingEntry {
    #[must_use]
    pub fn dialog(&self) -> ErrorDialog {
        ErrorDialog {
            code: Some(self.code.to_string()),
            title: self.title.to_string(),
            message: self.message.to_string(),
            recoverable: self.recoverable,
        }
    }
}

pub const BLOCKING_CODES: &[BlockingEntry] = &[
    BlockingEntry {
        code: CODE_CAMERA_PERMISSION_DENIED,
        title: "Camera access denied",
        message: "Allow camera access for this site and try again.",
        recoverable: true,
    },
    BlockingEntry {
        code: CODE_MEASUREMENT_INCOMPLETE,
        title: "Measurement incomplete",
        message: "The signal was too weak to finish the measurement. Find even lighting, \
                  keep still and try again.",
        recoverable: true,
    },
    BlockingEntry {
        code: CODE_NO_DEVICES_FOUND,
        title: "No camera found",
        message: "Connect a camera to run a measurement.",
        recoverable: false,
    },
    BlockingEntry {
        code: CODE_PAGE_NOT_VISIBLE,
        title: "Measurement interrupted",
        message: "Keep this tab visible until the measurement finishes.",
        recoverable: true,
    },
];

/// Look up a code in the blocking table.
#[must_use]
pub fn blocking_entry(code: &str) -> Option<&'static BlockingEntry> {
    BLOCKING_CODES.iter().find(|entry| entry.code == code)
}

/// Dialog shown for a partial result or a failed liveness check.
#[must_use]
pub fn incomplete_measurement() -> ErrorDialog {
    blocking_entry(CODE_MEASUREMENT_INCOMPLETE).map_or_else(
        || ErrorDialog {
            code: Some(CODE_MEASUREMENT_INCOMPLETE.into()),
            title: "Measurement incomplete".into(),
            message: String::new(),
            recoverable: true,
        },
        BlockingEntry::dialog,
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Connection hiccup. Flashed only once the measurement has started.
    TechnicalReconnect(WarningSpec),
    /// Flashed, no state change.
    TransientWarning(WarningSpec),
    /// Flashed and counted towards the restart burst.
    DebouncedWarning(WarningSpec),
    /// Freeze the engine and show a dialog.
    BlockingError(ErrorDialog),
    /// Restart without showing anything.
    SilentRestart,
}

impl Disposition {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TechnicalReconnect(_) => "technical_reconnect",
            Self::TransientWarning(_) => "transient_warning",
            Self::DebouncedWarning(_) => "debounced_warning",
            Self::BlockingError(_) => "blocking_error",
            Self::SilentRestart => "silent_restart",
        }
    }
}

/// Classify a vendor error. `None` means the event is ignored.
#[must_use]
pub fn classify(event: &ErrorEvent) -> Option<Disposition> {
    if event.is_empty() {
        return None;
    }

    let message = event.message.to_lowercase();
    let code = event.code.trim();

    if matches_any(&message, RECONNECT_PATTERNS) {
        return Some(Disposition::TechnicalReconnect(RECONNECT_WARNING));
    }
    if code == CODE_LOW_SNR {
        return Some(Disposition::TransientWarning(WEAK_SIGNAL_WARNING));
    }
    if matches_any(&message, MOVEMENT_PATTERNS) {
        return Some(Disposition::DebouncedWarning(STAY_STILL_WARNING));
    }
    if let Some(entry) = blocking_entry(code) {
        return Some(Disposition::BlockingError(entry.dialog()));
    }
    if SILENT_RESTART_CODES.contains(&code) {
        return Some(Disposition::SilentRestart);
    }

    Some(Disposition::BlockingError(ErrorDialog {
        code: (!code.is_empty()).then(|| code.to_string()),
        title: "Unexpected error".into(),
        message: if event.message.trim().is_empty() {
            code.to_string()
        } else {
            event.message.clone()
        },
        recoverable: true,
    }))
}

fn matches_any(haystack: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| haystack.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn classify_pair(code: &str, message: &str) -> Option<Disposition> {
        classify(&ErrorEvent::new(code, message))
    }

    #[test]
    fn empty_payload_is_ignored() {
        assert_eq!(classify(&ErrorEvent::default()), None);
    }

    #[rstest]
    #[case("WebSocket closed")]
    #[case("peer DISCONNECTED")]
    #[case("close event wasClean=false")]
    #[case("Connection reset")]
    #[case("network unreachable")]
    fn reconnect_patterns_are_case_insensitive(#[case] message: &str) {
        assert_eq!(
            classify_pair("", message),
            Some(Disposition::TechnicalReconnect(RECONNECT_WARNING))
        );
    }

    #[rstest]
    #[case(CODE_LOW_SNR, "network glitch", "technical_reconnect")]
    #[case(CODE_LOW_SNR, "too much movement", "transient_warning")]
    #[case(CODE_CAMERA_PERMISSION_DENIED, "motion detected", "debounced_warning")]
    #[case(CODE_NO_DEVICES_FOUND, "websocket", "technical_reconnect")]
    #[case("COLLECTOR", "movement", "debounced_warning")]
    #[case("COLLECTOR", "collector crashed", "silent_restart")]
    #[case("WORKER_ERROR", "", "silent_restart")]
    #[case("SOMETHING_NEW", "strange", "blocking_error")]
    fn earlier_rules_shadow_later_ones(
        #[case] code: &str,
        #[case] message: &str,
        #[case] expected: &str,
    ) {
        let disposition = classify_pair(code, message).expect("should classify");
        assert_eq!(disposition.name(), expected);
    }

    #[test]
    fn low_snr_is_a_three_second_warning() {
        let Some(Disposition::TransientWarning(spec)) = classify_pair(CODE_LOW_SNR, "snr") else {
            panic!("expected transient warning");
        };
        assert_eq!(spec.ttl, Duration::from_secs(3));
    }

    #[test]
    fn movement_is_a_two_second_debounced_warning() {
        let Some(Disposition::DebouncedWarning(spec)) = classify_pair("", "Excessive Motion") else {
            panic!("expected debounced warning");
        };
        assert_eq!(spec.ttl, Duration::from_secs(2));
    }

    #[rstest]
    #[case("")]
    #[case("camera failure")]
    #[case("some unrelated vendor text")]
    fn blocking_codes_yield_table_triple(#[case] message: &str) {
        for entry in BLOCKING_CODES {
            let disposition = classify_pair(entry.code, message);
            assert_eq!(
                disposition,
                Some(Disposition::BlockingError(entry.dialog())),
                "code {}",
                entry.code
            );
        }
    }

    #[test]
    fn camera_permission_is_recoverable_and_no_camera_is_not() {
        assert!(blocking_entry(CODE_CAMERA_PERMISSION_DENIED).unwrap().recoverable);
        assert!(!blocking_entry(CODE_NO_DEVICES_FOUND).unwrap().recoverable);
        assert!(blocking_entry(CODE_PAGE_NOT_VISIBLE).unwrap().recoverable);
    }

    #[test]
    fn fallback_fails_open_with_raw_message() {
        assert_eq!(
            classify_pair("E_42", "GPU context lost"),
            Some(Disposition::BlockingError(ErrorDialog {
                code: Some("E_42".into()),
                title: "Unexpected error".into(),
                message: "GPU context lost".into(),
                recoverable: true,
            }))
        );
    }

    #[test]
    fn fallback_without_message_uses_code() {
        let Some(Disposition::BlockingError(dialog)) = classify_pair("E_7", "") else {
            panic!("expected blocking error");
        };
        assert_eq!(dialog.message, "E_7");
        assert!(dialog.recoverable);
    }

    #[test]
    fn incomplete_measurement_dialog_comes_from_table() {
        assert_eq!(
            incomplete_measurement(),
            blocking_entry(CODE_MEASUREMENT_INCOMPLETE).unwrap().dialog()
        );
    }
}
