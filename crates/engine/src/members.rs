//! Member store — where the send pipeline gets its member list.

use async_trait::async_trait;
use sqlx::PgPool;

use vestry_common::error::AppError;
use vestry_common::types::Member;

/// Source of the full member list. Filtering happens in the resolver.
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn list_members(&self) -> Result<Vec<Member>, AppError>;
}

/// PostgreSQL-backed member store.
#[derive(Clone)]
pub struct PgMemberStore {
    pool: PgPool,
}

impl PgMemberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        let members: Vec<Member> = sqlx::query_as(
            r#"
            SELECT id, name, phone_number, COALESCE(groups, '[]'::jsonb) AS groups, is_approved
            FROM members
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
