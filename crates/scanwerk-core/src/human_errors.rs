// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable messages for scan failures.
//
// Every technical error and every failed detection is mapped to plain English
// with a clear suggestion. The severity levels drive UI presentation in the
// live preview (retry silently, prompt the user, or give up on the file).

use crate::error::ScanwerkError;
use crate::types::{DetectionResult, MSG_INVALID_CONFIG_PREFIX, MSG_INVALID_PREFIX};

/// Severity of a failure from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A single bad frame; the next one will probably work.
    Transient,
    /// The user must reframe, relight or adjust corners by hand.
    ActionRequired,
    /// Retrying the same input will not help (corrupt file, bad config).
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the preview loop should simply try the next frame.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Describe a failed detection. Returns `None` for a successful one.
///
/// "Nothing found" and "found but rejected" share a message on purpose: both
/// mean the user should recapture or adjust the corners manually.
pub fn humanize_detection(result: &DetectionResult) -> Option<HumanError> {
    if result.success {
        return None;
    }
    if result.message.starts_with(MSG_INVALID_PREFIX) {
        return Some(HumanError {
            message: "We didn't get a picture to look at.".into(),
            suggestion: "Try taking the photo again.".into(),
            retriable: true,
            severity: Severity::Transient,
        });
    }
    if result.message.starts_with(MSG_INVALID_CONFIG_PREFIX) {
        return Some(HumanError {
            message: "The scanner settings aren't valid.".into(),
            suggestion: "Fix or remove the settings file and try again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        });
    }
    Some(HumanError {
        message: "We couldn't find the page in this photo.".into(),
        suggestion: "Place the page on a darker surface, make sure all four corners are visible with a little space around them, and try again. You can also drag the corners into place yourself.".into(),
        retriable: true,
        severity: Severity::ActionRequired,
    })
}

/// Convert a `ScanwerkError` into a `HumanError`.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        ScanwerkError::InvalidInput(_) => HumanError {
            message: "We didn't get a picture to look at.".into(),
            suggestion: "Try taking the photo again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::DegenerateGeometry(_) => HumanError {
            message: "The page corners don't make a proper shape.".into(),
            suggestion: "Drag the four corners so they sit on the corners of the page, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::Config(detail) => HumanError {
            message: "The scanner settings aren't valid.".into(),
            suggestion: format!("Fix or remove the settings file and try again. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or try copying the file to a different location first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanwerkError::Serialization(_) => HumanError {
            message: "The scanner settings file couldn't be read.".into(),
            suggestion: "The file may be damaged. Delete it to go back to the default settings.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_human_error() {
        let ok = DetectionResult {
            success: true,
            ..DetectionResult::not_detected()
        };
        assert!(humanize_detection(&ok).is_none());
    }

    #[test]
    fn not_detected_asks_user_to_reframe() {
        let human = humanize_detection(&DetectionResult::not_detected()).unwrap();
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.retriable);
    }

    #[test]
    fn invalid_frame_is_transient() {
        let human = humanize_detection(&DetectionResult::invalid_input("empty")).unwrap();
        assert_eq!(human.severity, Severity::Transient);
    }

    #[test]
    fn rejected_settings_are_permanent() {
        let human = humanize_detection(&DetectionResult::invalid_config("blur_sigma 0 must be in (0, 50]")).unwrap();
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
    }

    #[test]
    fn degenerate_corners_need_user_action() {
        let human = humanize_error(&ScanwerkError::DegenerateGeometry("zero width".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = ScanwerkError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn bad_config_is_permanent() {
        let human = humanize_error(&ScanwerkError::Config("approx_tolerances is empty".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("approx_tolerances"));
    }
}
