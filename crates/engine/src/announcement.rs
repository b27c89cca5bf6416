//! Announcement service — CRUD for announcements plus the SMS send pipeline.
//!
//! Sending an announcement:
//! 1. Skip entirely if the audience is website-only
//! 2. Fetch the full member list (a failure here aborts the send)
//! 3. Narrow it to recipients via `GroupResolver`
//! 4. Text each recipient via `NotificationDispatcher`

use sqlx::PgPool;
use uuid::Uuid;

use vestry_common::error::AppError;
use vestry_common::types::{Announcement, DispatchResult, Member};

use crate::dispatcher::NotificationDispatcher;
use crate::members::MemberStore;
use crate::resolver::{GroupResolver, TargetSpec, WEBSITE_TARGET};

/// Service layer for announcements.
pub struct AnnouncementService;

/// Parameters for creating a new announcement.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateAnnouncementParams {
    pub title: String,
    pub body: String,
    pub target_groups: Option<String>,
}

/// Parameters for updating an existing announcement.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UpdateAnnouncementParams {
    pub title: Option<String>,
    pub body: Option<String>,
    pub target_groups: Option<String>,
}

impl AnnouncementService {
    /// Create and persist a new announcement.
    pub async fn create(
        pool: &PgPool,
        params: &CreateAnnouncementParams,
    ) -> Result<Announcement, AppError> {
        Self::validate_text("title", &params.title)?;
        Self::validate_text("body", &params.body)?;

        let target_groups = Self::audience(params.target_groups.as_deref().unwrap_or_default());

        let announcement: Announcement = sqlx::query_as(
            r#"
            INSERT INTO announcements (id, title, body, target_groups)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.title.trim())
        .bind(params.body.trim())
        .bind(target_groups)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            announcement_id = %announcement.id,
            target_groups = %announcement.target_groups,
            "Announcement created"
        );

        Ok(announcement)
    }

    /// List all announcements, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Announcement>, AppError> {
        let announcements: Vec<Announcement> =
            sqlx::query_as("SELECT * FROM announcements ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?;

        Ok(announcements)
    }

    pub async fn get(pool: &PgPool, announcement_id: Uuid) -> Result<Announcement, AppError> {
        sqlx::query_as("SELECT * FROM announcements WHERE id = $1")
            .bind(announcement_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Announcement {} not found", announcement_id))
            })
    }

    /// Update any subset of title, body and audience.
    pub async fn update(
        pool: &PgPool,
        announcement_id: Uuid,
        params: &UpdateAnnouncementParams,
    ) -> Result<Announcement, AppError> {
        let existing = Self::get(pool, announcement_id).await?;

        if let Some(title) = &params.title {
            Self::validate_text("title", title)?;
        }
        if let Some(body) = &params.body {
            Self::validate_text("body", body)?;
        }

        let title = params
            .title
            .as_deref()
            .map(str::trim)
            .unwrap_or(&existing.title);
        let body = params.body.as_deref().map(str::trim).unwrap_or(&existing.body);
        // A cleared audience resets to website-only.
        let target_groups = params
            .target_groups
            .as_deref()
            .map(Self::audience)
            .unwrap_or(&existing.target_groups);

        let announcement: Announcement = sqlx::query_as(
            r#"
            UPDATE announcements
            SET title = $1, body = $2, target_groups = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(target_groups)
        .bind(announcement_id)
        .fetch_one(pool)
        .await?;

        tracing::info!(announcement_id = %announcement_id, "Announcement updated");

        Ok(announcement)
    }

    /// Delete an announcement. Returns true if it was deleted.
    pub async fn delete(pool: &PgPool, announcement_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(announcement_id)
            .execute(pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(announcement_id = %announcement_id, "Announcement deleted");
        }

        Ok(deleted)
    }

    /// Text an announcement to every member in its target groups.
    ///
    /// Only a failure to load the member list is returned as an error;
    /// per-recipient failures are reported inside the result.
    pub async fn send_sms(
        store: &dyn MemberStore,
        dispatcher: &NotificationDispatcher,
        announcement: &Announcement,
    ) -> Result<DispatchResult, AppError> {
        if TargetSpec::is_website_only(&announcement.target_groups) {
            return Ok(DispatchResult::empty());
        }

        let recipients = Self::preview_recipients(store, &announcement.target_groups).await?;

        tracing::info!(
            announcement_id = %announcement.id,
            recipients = recipients.len(),
            "Sending announcement by SMS"
        );

        Ok(dispatcher
            .dispatch(&announcement.title, &announcement.body, &recipients)
            .await)
    }

    /// Resolve who would receive a text for `target_groups`, without sending.
    pub async fn preview_recipients(
        store: &dyn MemberStore,
        target_groups: &str,
    ) -> Result<Vec<Member>, AppError> {
        if TargetSpec::is_website_only(target_groups) {
            return Ok(Vec::new());
        }

        let members = store.list_members().await?;
        Ok(GroupResolver::resolve(target_groups, members))
    }

    /// Trimmed audience text, `website` when blank.
    fn audience(value: &str) -> &str {
        let value = value.trim();
        if value.is_empty() { WEBSITE_TARGET } else { value }
    }

    fn validate_text(field: &str, value: &str) -> Result<(), AppError> {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} must not be empty", field)));
        }
        Ok(())
    }
}
