//! Approval state machine.
//!
//! Every legal status change is a row of [`TRANSITIONS`]. Services never
//! branch on roles themselves; they resolve the row for the event's current
//! status and apply its effects through a single compare-and-set write.

use std::fmt;

use orar_core::AppError;
use orar_models::users::UserRole;
use orar_models::EventStatus;

use crate::store::ApprovalStamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Submit,
    Approve,
    Reject,
    Publish,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Submit,
        Action::Approve,
        Action::Reject,
        Action::Publish,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: EventStatus,
    pub action: Action,
    pub roles: &'static [UserRole],
    /// The actor must be the teacher the event belongs to.
    pub owner_only: bool,
    pub to: EventStatus,
    pub approval: ApprovalStamp,
    pub stamp_publication: bool,
}

const PROFESOR: &[UserRole] = &[UserRole::Profesor];
const REVIEWERS: &[UserRole] = &[UserRole::Secretar, UserRole::Admin];
const ADMIN: &[UserRole] = &[UserRole::Admin];

const fn row(
    from: EventStatus,
    action: Action,
    roles: &'static [UserRole],
    to: EventStatus,
    approval: ApprovalStamp,
) -> Transition {
    Transition {
        from,
        action,
        roles,
        owner_only: matches!(action, Action::Submit),
        to,
        approval,
        stamp_publication: matches!(to, EventStatus::Published),
    }
}

pub const TRANSITIONS: &[Transition] = &[
    row(
        EventStatus::Draft,
        Action::Submit,
        PROFESOR,
        EventStatus::PendingApproval,
        ApprovalStamp::Keep,
    ),
    row(
        EventStatus::Rejected,
        Action::Submit,
        PROFESOR,
        EventStatus::PendingApproval,
        ApprovalStamp::Keep,
    ),
    row(
        EventStatus::PendingApproval,
        Action::Approve,
        REVIEWERS,
        EventStatus::Approved,
        ApprovalStamp::Backfill,
    ),
    row(
        EventStatus::PendingApproval,
        Action::Reject,
        REVIEWERS,
        EventStatus::Rejected,
        ApprovalStamp::Keep,
    ),
    row(
        EventStatus::Approved,
        Action::Reject,
        REVIEWERS,
        EventStatus::Rejected,
        ApprovalStamp::Keep,
    ),
    row(
        EventStatus::PendingApproval,
        Action::Publish,
        REVIEWERS,
        EventStatus::Published,
        ApprovalStamp::Backfill,
    ),
    row(
        EventStatus::Approved,
        Action::Publish,
        REVIEWERS,
        EventStatus::Published,
        ApprovalStamp::Keep,
    ),
    row(
        EventStatus::Draft,
        Action::Publish,
        ADMIN,
        EventStatus::Published,
        ApprovalStamp::Backfill,
    ),
    row(
        EventStatus::Rejected,
        Action::Publish,
        ADMIN,
        EventStatus::Published,
        ApprovalStamp::Backfill,
    ),
];

/// Finds the transition `role` may take from `status`.
///
/// A role that appears in no row for the action is forbidden outright. A
/// permitted role acting from the wrong status gets an invalid-state error
/// carrying the current status.
pub fn resolve(
    status: EventStatus,
    action: Action,
    role: UserRole,
) -> Result<&'static Transition, AppError> {
    let permitted = TRANSITIONS
        .iter()
        .any(|t| t.action == action && t.roles.contains(&role));
    if !permitted {
        return Err(AppError::forbidden(format!(
            "Role {} may not {} events",
            role, action
        )));
    }

    if status == EventStatus::Published && action == Action::Publish {
        return Err(AppError::invalid_state(status, "Event is already published"));
    }

    TRANSITIONS
        .iter()
        .find(|t| t.from == status && t.action == action && t.roles.contains(&role))
        .ok_or_else(|| {
            AppError::invalid_state(status, format!("Cannot {} an event in status {}", action, status))
        })
}
