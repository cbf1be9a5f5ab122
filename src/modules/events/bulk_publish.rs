//! A teacher's "send my schedule for approval" action.
//!
//! Gathers the teacher's open events, moves the drafts among them to
//! `PENDING_APPROVAL` in one batch, then tells every secretary. The
//! notification tail runs after the batch write and is not transactional
//! with it: a recipient whose notification cannot be stored is counted in
//! `failed_notifications` and the events stay submitted.

use anyhow::anyhow;
use tracing::{error, info, instrument, warn};

use orar_core::AppError;
use orar_models::events::BulkPublishResult;
use orar_models::ids::{EventId, UserId};
use orar_models::users::UserRole;
use orar_models::EventStatus;

use crate::metrics::track_events_submitted;
use crate::modules::notifications::sink::NotificationSink;
use crate::store::ScheduleStore;

pub const NOTIFICATION_TITLE: &str = "Schedule submitted for approval";

pub struct BulkPublishService;

impl BulkPublishService {
    #[instrument(skip(store, sink))]
    pub async fn publish_for_teacher(
        store: &dyn ScheduleStore,
        sink: &dyn NotificationSink,
        actor_id: UserId,
    ) -> Result<BulkPublishResult, AppError> {
        let user = store
            .find_user(actor_id)
            .await?
            .ok_or_else(|| AppError::forbidden("Unknown user"))?;
        if user.role != UserRole::Profesor {
            return Err(AppError::forbidden(
                "Only teachers can submit their schedule for approval",
            ));
        }

        let teacher = store
            .find_teacher_for_user(user.id, &user.email)
            .await?
            .ok_or_else(|| AppError::forbidden("No teacher profile is linked to this account"))?;

        let open = store.find_open_events_for_teacher(teacher.id).await?;
        if open.is_empty() {
            return Err(AppError::not_found(anyhow!(
                "Nothing pending: {} has no draft or pending events",
                teacher.name
            )));
        }

        let drafts: Vec<EventId> = open
            .iter()
            .filter(|e| e.status == EventStatus::Draft)
            .map(|e| e.id)
            .collect();
        let published_count = if drafts.is_empty() {
            0
        } else {
            store.submit_drafts(&drafts, user.id).await?
        };
        let total_events = open.len() as u64;

        track_events_submitted(published_count);
        info!(
            teacher_id = %teacher.id,
            published_count,
            total_events,
            "Teacher schedule submitted for approval"
        );

        let secretaries: Vec<UserId> = store
            .list_users_by_role(UserRole::Secretar)
            .await
            .inspect_err(|err| {
                error!(error = %err, "Events submitted but secretaries could not be listed");
            })?
            .into_iter()
            .map(|u| u.id)
            .collect();

        if secretaries.is_empty() {
            warn!(teacher_id = %teacher.id, "No secretaries to notify");
        }

        let message = format!(
            "{} submitted {} events for approval",
            teacher.name, total_events
        );
        let report = sink
            .notify(&secretaries, NOTIFICATION_TITLE, &message)
            .await;

        if report.failed > 0 {
            error!(
                teacher_id = %teacher.id,
                failed = report.failed,
                notified = report.persisted,
                "Some secretaries were not notified"
            );
        }

        Ok(BulkPublishResult {
            published_count,
            total_events,
            notified_count: report.persisted,
            failed_notifications: report.failed,
        })
    }
}
