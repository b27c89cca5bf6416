//! Announcement routes.
//!
//! Creating an announcement whose audience names groups texts those groups
//! before responding. The response carries the send counts; individual
//! delivery failures are only visible in `sms.per_recipient`.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vestry_common::error::AppError;
use vestry_common::types::{Announcement, DispatchResult, Member, MemberGroups};
use vestry_engine::announcement::{
    AnnouncementService, CreateAnnouncementParams, UpdateAnnouncementParams,
};
use vestry_engine::resolver::TargetSpec;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/announcements",
            post(create_announcement).get(list_announcements),
        )
        .route("/api/announcements/preview", post(preview_recipients))
        .route(
            "/api/announcements/{id}",
            get(get_announcement)
                .patch(update_announcement)
                .delete(delete_announcement),
        )
        .route("/api/announcements/{id}/resend", post(resend_announcement))
}

#[derive(Debug, Serialize)]
pub struct CreateAnnouncementResponse {
    pub announcement: Announcement,
    /// `None` for website-only announcements.
    pub sms: Option<DispatchResult>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub target_groups: String,
}

/// The member fields an operator needs to check an audience.
#[derive(Debug, Serialize)]
pub struct RecipientPreview {
    pub name: String,
    pub phone_number: Option<String>,
    pub groups: MemberGroups,
}

impl From<Member> for RecipientPreview {
    fn from(member: Member) -> Self {
        Self {
            name: member.name,
            phone_number: member.phone_number,
            groups: member.groups,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub count: usize,
    pub recipients: Vec<RecipientPreview>,
}

/// POST /api/announcements — Create an announcement and text its groups.
async fn create_announcement(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(params): Json<CreateAnnouncementParams>,
) -> Result<Json<CreateAnnouncementResponse>, AppError> {
    let announcement = AnnouncementService::create(&state.pool, &params).await?;

    let sms = if TargetSpec::is_website_only(&announcement.target_groups) {
        None
    } else {
        tracing::info!(
            admin_id = %auth.user_id,
            announcement_id = %announcement.id,
            "Texting new announcement"
        );
        Some(
            AnnouncementService::send_sms(
                state.members.as_ref(),
                &state.dispatcher,
                &announcement,
            )
            .await?,
        )
    };

    Ok(Json(CreateAnnouncementResponse { announcement, sms }))
}

/// GET /api/announcements — List announcements, newest first.
async fn list_announcements(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Announcement>>, AppError> {
    let announcements = AnnouncementService::list(&state.pool).await?;
    Ok(Json(announcements))
}

/// GET /api/announcements/:id
async fn get_announcement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Announcement>, AppError> {
    let announcement = AnnouncementService::get(&state.pool, id).await?;
    Ok(Json(announcement))
}

/// PATCH /api/announcements/:id — Edit without re-sending.
async fn update_announcement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateAnnouncementParams>,
) -> Result<Json<Announcement>, AppError> {
    let announcement = AnnouncementService::update(&state.pool, id, &params).await?;
    Ok(Json(announcement))
}

/// DELETE /api/announcements/:id
async fn delete_announcement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = AnnouncementService::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(admin_id = %auth.user_id, announcement_id = %id, "Announcement removed");
        Ok(Json(serde_json::json!({"deleted": true})))
    } else {
        Err(AppError::NotFound(format!("Announcement {} not found", id)))
    }
}

/// POST /api/announcements/:id/resend — Text the announcement's groups again.
///
/// No de-duplication: members who already received it get it twice.
async fn resend_announcement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DispatchResult>, AppError> {
    let announcement = AnnouncementService::get(&state.pool, id).await?;

    tracing::info!(admin_id = %auth.user_id, announcement_id = %id, "Resending announcement");

    let result =
        AnnouncementService::send_sms(state.members.as_ref(), &state.dispatcher, &announcement)
            .await?;
    Ok(Json(result))
}

/// POST /api/announcements/preview — Show who a target would reach.
async fn preview_recipients(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let recipients =
        AnnouncementService::preview_recipients(state.members.as_ref(), &req.target_groups)
            .await?;

    Ok(Json(PreviewResponse {
        count: recipients.len(),
        recipients: recipients.into_iter().map(RecipientPreview::from).collect(),
    }))
}
