use brokerdesk_core::AppError;
use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

const SESSION_COOKIE: &str = "brokerdesk_session";
const SESSION_TABLE: &str = "brokerdesk_sessions";
const IDLE_TIMEOUT_HOURS: i64 = 8;

/// Cookie sessions stored in PostgreSQL.
///
/// One cookie carries both the live and the demo identity under separate
/// keys, so signing in to one tree never authenticates the other.
pub async fn build_postgres_session_layer(
    pool: PgPool,
    cookie_secure: bool,
) -> Result<SessionManagerLayer<PostgresStore>, AppError> {
    let store = PostgresStore::new(pool)
        .with_table_name(SESSION_TABLE)
        .map_err(|error| AppError::Validation(format!("invalid session table name: {error}")))?;

    store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::hours(IDLE_TIMEOUT_HOURS))))
}
