//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    session::Session,
    user::{NewUser, User},
};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    csrf_token::CsrfToken, display_name::DisplayName, email::Email, session_id::SessionId,
    user_id::UserId, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// Unique constraint on `users.email`
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_uc_email";

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at_ms <= $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn insert_user(&self, user: &NewUser) -> AuthResult<UserId> {
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (
                name,
                email,
                hashed_password,
                created,
                active
            ) VALUES ($1, $2, $3, $4, TRUE)
            RETURNING id
            "#,
        )
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.password.as_str())
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(UserId::from_i64(id)),
            Err(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) =>
            {
                Err(AuthError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                name,
                email,
                hashed_password,
                created,
                active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_active_user_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                name,
                email,
                hashed_password,
                created,
                active
            FROM users
            WHERE email = $1 AND active = TRUE
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create_session(&self, session: &Session) -> AuthResult<()> {
        insert_session(&self.pool, session).await
    }

    async fn find_session(&self, session_id: SessionId) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                csrf_token,
                expires_at_ms,
                created_at,
                last_activity_at
            FROM sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    async fn set_session_subject(
        &self,
        session_id: SessionId,
        user_id: Option<UserId>,
    ) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE sessions SET
                user_id = $2,
                last_activity_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(user_id.map(|id| id.as_i64()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::SessionInvalid);
        }

        Ok(())
    }

    async fn replace_session(&self, old: SessionId, session: &Session) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(old.as_uuid())
            .execute(&mut *tx)
            .await?;

        insert_session(&mut *tx, session).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_session(&self, session_id: SessionId) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        self.cleanup_expired().await
    }
}

async fn insert_session<'e, E>(executor: E, session: &Session) -> AuthResult<()>
where
    E: sqlx::postgres::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO sessions (
            session_id,
            user_id,
            csrf_token,
            expires_at_ms,
            created_at,
            last_activity_at
        ) VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(session.session_id.as_uuid())
    .bind(session.user_id.map(|id| id.as_i64()))
    .bind(session.csrf_token.as_str())
    .bind(session.expires_at_ms)
    .bind(session.created_at)
    .bind(session.last_activity_at)
    .execute(executor)
    .await?;

    Ok(())
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    hashed_password: String,
    created: DateTime<Utc>,
    active: bool,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        Ok(User {
            user_id: UserId::from_i64(self.id),
            name: DisplayName::from_db(self.name),
            email: Email::from_db(self.email),
            password: UserPassword::from_db(self.hashed_password)
                .map_err(|_| AuthError::CorruptPasswordHash(self.id))?,
            created_at: self.created,
            active: self.active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    user_id: Option<i64>,
    csrf_token: String,
    expires_at_ms: i64,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            session_id: SessionId::from_uuid(self.session_id),
            user_id: self.user_id.map(UserId::from_i64),
            csrf_token: CsrfToken::from_db(self.csrf_token),
            expires_at_ms: self.expires_at_ms,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }
}
