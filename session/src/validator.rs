//! Synchronous admission control for candidate attachments.
//!
//! Everything here is a pure function of the candidate batch, the current
//! live-attachment count, and the configured limits, which is what keeps this
//! step unit-testable in isolation. Nothing validated here ever reaches the
//! upload backend on the rejection path.

use composebox_protocol::context::CandidateFile;
use itertools::Itertools;

use crate::config::SessionConfig;

/// Client-local rejection taxonomy. The numeric value is the telemetry bucket
/// recorded alongside the user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RejectionKind {
    MaxFilesReached,
    EmptyFile,
    TooLarge,
    UnsupportedType,
}

impl RejectionKind {
    pub fn telemetry_code(self) -> u8 {
        match self {
            RejectionKind::MaxFilesReached => 1,
            RejectionKind::EmptyFile => 2,
            RejectionKind::TooLarge => 3,
            RejectionKind::UnsupportedType => 4,
        }
    }
}

/// Result of validating one batch of candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// Admitted files, in selection order.
    pub accepted: Vec<CandidateFile>,
    /// One entry per rejection kind present in the batch (never one per
    /// file), with `MaxFilesReached` ordered first so it takes precedence in
    /// user-facing messaging.
    pub rejections: Vec<RejectionKind>,
}

impl ValidationOutcome {
    /// The kind shown to the user when several kinds occurred in one batch.
    pub fn primary_rejection(&self) -> Option<RejectionKind> {
        self.rejections.first().copied()
    }
}

/// Classify `candidates` against the configured type allow-lists, size
/// ceiling, and remaining attachment capacity.
///
/// Rules, applied per candidate in selection order: unsupported type, empty
/// file, too large, then admission control against
/// `config.file_max_count - live_count`. Once capacity is exhausted every
/// remaining type/size-valid candidate is rejected with `MaxFilesReached`.
pub fn validate(
    candidates: Vec<CandidateFile>,
    live_count: usize,
    config: &SessionConfig,
) -> ValidationOutcome {
    let mut remaining = config.file_max_count.saturating_sub(live_count);
    let mut accepted = Vec::new();
    let mut rejections = Vec::new();

    for candidate in candidates {
        if !config.is_allowed_type(&candidate.mime_type, &candidate.file_name) {
            tracing::debug!(
                "rejecting {}: unsupported type {}",
                candidate.file_name,
                candidate.mime_type
            );
            rejections.push(RejectionKind::UnsupportedType);
            continue;
        }
        if candidate.bytes.is_empty() {
            rejections.push(RejectionKind::EmptyFile);
            continue;
        }
        if candidate.bytes.len() as u64 > config.file_max_size {
            tracing::debug!(
                "rejecting {}: {} bytes exceeds ceiling",
                candidate.file_name,
                candidate.bytes.len()
            );
            rejections.push(RejectionKind::TooLarge);
            continue;
        }
        if remaining == 0 {
            rejections.push(RejectionKind::MaxFilesReached);
            continue;
        }
        remaining -= 1;
        accepted.push(candidate);
    }

    // Aggregate to one notice per kind, overflow first.
    let rejections = rejections
        .into_iter()
        .unique()
        .sorted_by_key(|kind| kind.telemetry_code())
        .collect();

    ValidationOutcome {
        accepted,
        rejections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn png(name: &str) -> CandidateFile {
        CandidateFile {
            file_name: name.to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0u8; 16],
        }
    }

    fn config_with_max(count: usize) -> SessionConfig {
        SessionConfig {
            file_max_count: count,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn admits_valid_files_in_selection_order() {
        let outcome = validate(vec![png("a.png"), png("b.png")], 0, &config_with_max(5));
        assert_eq!(
            outcome.accepted.iter().map(|f| &f.file_name).collect::<Vec<_>>(),
            ["a.png", "b.png"]
        );
        assert!(outcome.rejections.is_empty());
    }

    #[test]
    fn six_oversized_files_yield_a_single_too_large_notice() {
        let config = SessionConfig {
            file_max_size: 10,
            ..SessionConfig::default()
        };
        let big = CandidateFile {
            file_name: "big.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0u8; 11],
        };
        let outcome = validate(vec![big; 6], 0, &config);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejections, [RejectionKind::TooLarge]);
    }

    #[test]
    fn empty_file_is_rejected() {
        let empty = CandidateFile {
            file_name: "foo.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: Vec::new(),
        };
        let outcome = validate(vec![empty], 0, &SessionConfig::default());
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejections, [RejectionKind::EmptyFile]);
    }

    #[test]
    fn unsupported_type_is_rejected_but_valid_sibling_is_admitted() {
        let svg = CandidateFile {
            file_name: "icon.svg".to_string(),
            mime_type: "image/svg+xml".to_string(),
            bytes: vec![1, 2, 3],
        };
        let outcome = validate(vec![png("image.png"), svg], 0, &SessionConfig::default());
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].file_name, "image.png");
        assert_eq!(outcome.rejections, [RejectionKind::UnsupportedType]);
    }

    #[test]
    fn max_count_one_with_two_pastes_admits_one_and_notices_once() {
        let outcome = validate(
            vec![png("foo1.png"), png("foo2.png")],
            0,
            &config_with_max(1),
        );
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejections, [RejectionKind::MaxFilesReached]);
    }

    #[test]
    fn six_valid_files_with_limit_five_admits_five() {
        let files = (0..6).map(|i| png(&format!("good{i}.png"))).collect();
        let outcome = validate(files, 0, &config_with_max(5));
        assert_eq!(outcome.accepted.len(), 5);
        assert_eq!(outcome.rejections, [RejectionKind::MaxFilesReached]);
    }

    #[test]
    fn mixed_over_limit_batch_prioritizes_max_files_in_messaging() {
        let txt = CandidateFile {
            file_name: "bad.txt".to_string(),
            mime_type: "text/plain".to_string(),
            bytes: vec![1],
        };
        let outcome = validate(
            vec![png("g1.png"), png("g2.png"), png("g3.png"), png("g4.png"), txt],
            0,
            &config_with_max(3),
        );
        assert_eq!(outcome.accepted.len(), 3);
        assert_eq!(outcome.primary_rejection(), Some(RejectionKind::MaxFilesReached));
        assert_eq!(
            outcome.rejections,
            [RejectionKind::MaxFilesReached, RejectionKind::UnsupportedType]
        );
    }

    #[test]
    fn existing_live_attachments_count_against_capacity() {
        let outcome = validate(vec![png("a.png")], 3, &config_with_max(3));
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejections, [RejectionKind::MaxFilesReached]);
    }
}
