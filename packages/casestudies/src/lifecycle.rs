// ABOUTME: Lifecycle state machine for case studies
// ABOUTME: Legal transitions, immutability of published records, side effects

use crate::version::PUBLISHED_VERSION;
use casebook_core::types::{CaseStudy, CaseStudyStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Lifecycle errors
#[derive(Error, Debug, PartialEq)]
pub enum LifecycleError {
    #[error("cannot modify a published case study")]
    Immutable,
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: CaseStudyStatus,
        to: CaseStudyStatus,
    },
}

/// Whether a status transition is legal.
///
/// `draft → under_review → {approved, rejected}`, `approved → published`,
/// `under_review → draft` (incorporate feedback). Approved and rejected
/// records may re-enter review (a fresh cycle on the same folder); nothing
/// leaves `published`. Same-status transitions are idempotent no-ops.
pub fn can_transition(from: CaseStudyStatus, to: CaseStudyStatus) -> bool {
    use CaseStudyStatus::*;
    if from == to {
        return true;
    }
    matches!(
        (from, to),
        (Draft, UnderReview)
            | (UnderReview, Approved)
            | (UnderReview, Rejected)
            | (UnderReview, Draft)
            | (Approved, Published)
            | (Approved, UnderReview)
            | (Rejected, UnderReview)
    )
}

/// Apply a status transition with its side effects: timestamp stamping and
/// the publish version pin. Published records reject every non-identity
/// transition before anything else is checked.
pub fn apply_status(
    case: &mut CaseStudy,
    to: CaseStudyStatus,
    now: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    if case.status == CaseStudyStatus::Published && to != CaseStudyStatus::Published {
        return Err(LifecycleError::Immutable);
    }
    if !can_transition(case.status, to) {
        return Err(LifecycleError::IllegalTransition {
            from: case.status,
            to,
        });
    }

    case.status = to;
    case.updated_at = now;
    match to {
        CaseStudyStatus::Approved => case.approved_at = Some(now),
        CaseStudyStatus::Rejected => case.rejected_at = Some(now),
        // Published is always the canonical 1.0 baseline, whatever the
        // minor trajectory was before it
        CaseStudyStatus::Published => case.version = PUBLISHED_VERSION.to_string(),
        _ => {}
    }
    Ok(())
}
