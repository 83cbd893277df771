//! PostgreSQL implementation of the persistence store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::domain::entities::{
    Breakdown, ClickEvent, Dimension, NewClick, NewShortLink, Scope, ShortLink,
};
use crate::domain::repositories::PersistenceStore;
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, code, original_url, is_custom, owner, created_at, expires_at, \
                            clicks, is_active, deleted_at";

const CLICK_COLUMNS: &str = "id, link_id, clicked_at, source, country, device, user_agent";

/// Clicks of non-deleted links, owner-filtered by `$1` when it is not null.
const VISIBLE_CLICKS: &str = "FROM link_clicks c \
                              JOIN links l ON l.id = c.link_id \
                              WHERE l.deleted_at IS NULL \
                                AND ($1::text IS NULL OR l.owner = $1)";

/// Connection pool tuning.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// PostgreSQL store backed by a connection pool.
///
/// Click recording runs the guarded counter update and the event insert in
/// one transaction. Code reservation relies on the `short_codes` primary key.
pub struct PgStore {
    pool: PgPool,
    open: AtomicBool,
}

#[derive(FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    original_url: String,
    is_custom: bool,
    owner: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    clicks: i64,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for ShortLink {
    fn from(r: LinkRow) -> Self {
        ShortLink {
            id: r.id,
            original_url: r.original_url,
            code: r.code,
            is_custom: r.is_custom,
            owner: r.owner,
            created_at: r.created_at,
            expires_at: r.expires_at,
            clicks: r.clicks,
            is_active: r.is_active,
            deleted_at: r.deleted_at,
        }
    }
}

#[derive(FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    clicked_at: DateTime<Utc>,
    source: String,
    country: String,
    device: String,
    user_agent: String,
}

impl From<ClickRow> for ClickEvent {
    fn from(r: ClickRow) -> Self {
        ClickEvent {
            id: r.id,
            link_id: r.link_id,
            timestamp: r.clicked_at,
            source: r.source,
            country: r.country,
            device: r.device,
            user_agent: r.user_agent,
        }
    }
}

fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    db_err.is_unique_violation() && matches!(db_err.constraint(), Some("links_code_key"))
}

impl PgStore {
    /// Wraps an existing pool. Used by `#[sqlx::test]` fixtures.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            open: AtomicBool::new(true),
        }
    }

    /// Builds the pool. Call [`PersistenceStore::open`] before use to apply migrations.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.connect_timeout)
            .idle_timeout(settings.idle_timeout)
            .max_lifetime(settings.max_lifetime)
            .connect(database_url)
            .await
            .map_err(|e| AppError::persistence("connect", "database", e))?;

        Ok(Self::new(pool))
    }

    fn ensure_open(&self, operation: &'static str, key: impl ToString) -> Result<(), AppError> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(AppError::persistence(operation, key.to_string(), "store is closed"))
        }
    }
}

#[async_trait]
impl PersistenceStore for PgStore {
    async fn open(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::persistence("migrate", "database", e))?;

        self.open.store(true, Ordering::Release);
        Ok(())
    }

    async fn close(&self) -> Result<(), AppError> {
        self.open.store(false, Ordering::Release);
        self.pool.close().await;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.ensure_open("health_check", "database")?;

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::persistence("health_check", "database", e))?;

        Ok(())
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        self.ensure_open("code_exists", code)?;

        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM short_codes WHERE code = $1)")
            .bind(code)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::persistence("code_exists", code, e))
    }

    async fn reserve_code(&self, code: &str) -> Result<bool, AppError> {
        self.ensure_open("reserve_code", code)?;

        let result =
            sqlx::query("INSERT INTO short_codes (code) VALUES ($1) ON CONFLICT (code) DO NOTHING")
                .bind(code)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::persistence("reserve_code", code, e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_link(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        self.ensure_open("insert_link", &new_link.code)?;

        let sql = format!(
            "INSERT INTO links (code, original_url, is_custom, owner, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {LINK_COLUMNS}"
        );

        sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&new_link.code)
            .bind(&new_link.original_url)
            .bind(new_link.is_custom)
            .bind(&new_link.owner)
            .bind(new_link.created_at)
            .bind(new_link.expires_at)
            .fetch_one(&self.pool)
            .await
            .map(ShortLink::from)
            .map_err(|e| {
                if is_unique_violation_on_code(&e) {
                    AppError::code_taken(new_link.code.clone())
                } else {
                    AppError::persistence("insert_link", new_link.code.clone(), e)
                }
            })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        self.ensure_open("find_by_code", code)?;

        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE code = $1 AND deleted_at IS NULL"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::persistence("find_by_code", code, e))?;

        Ok(row.map(ShortLink::from))
    }

    async fn list_links(&self, scope: &Scope) -> Result<Vec<ShortLink>, AppError> {
        self.ensure_open("list_links", scope.owner().unwrap_or("*"))?;

        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE deleted_at IS NULL AND ($1::text IS NULL OR owner = $1) \
             ORDER BY created_at DESC, id DESC"
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(scope.owner())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::persistence("list_links", scope.owner().unwrap_or("*"), e))?;

        Ok(rows.into_iter().map(ShortLink::from).collect())
    }

    async fn deactivate(&self, id: i64) -> Result<bool, AppError> {
        self.ensure_open("deactivate", id)?;

        let result = sqlx::query("UPDATE links SET is_active = FALSE WHERE id = $1 AND is_active")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::persistence("deactivate", id.to_string(), e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        self.ensure_open("soft_delete", id)?;
        let fail = |e: sqlx::Error| AppError::persistence("soft_delete", id.to_string(), e);

        let mut tx = self.pool.begin().await.map_err(fail)?;

        let result = sqlx::query(
            "UPDATE links SET is_active = FALSE, deleted_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(fail)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(fail)?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM link_clicks WHERE link_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        tx.commit().await.map_err(fail)?;
        Ok(true)
    }

    async fn record_click(&self, new_click: NewClick) -> Result<Option<ShortLink>, AppError> {
        let link_id = new_click.link_id;
        self.ensure_open("record_click", link_id)?;
        let fail = |e: sqlx::Error| AppError::persistence("record_click", link_id.to_string(), e);

        let mut tx = self.pool.begin().await.map_err(fail)?;

        let sql = format!(
            "UPDATE links SET clicks = clicks + 1 \
             WHERE id = $1 AND is_active AND deleted_at IS NULL \
               AND (expires_at IS NULL OR expires_at > $2) \
             RETURNING {LINK_COLUMNS}"
        );

        let Some(row) = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(link_id)
            .bind(new_click.timestamp)
            .fetch_optional(&mut *tx)
            .await
            .map_err(fail)?
        else {
            tx.rollback().await.map_err(fail)?;
            return Ok(None);
        };

        let ctx = new_click.context;
        sqlx::query(
            "INSERT INTO link_clicks (link_id, clicked_at, source, country, device, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(link_id)
        .bind(new_click.timestamp)
        .bind(ctx.source)
        .bind(ctx.country)
        .bind(ctx.device)
        .bind(ctx.user_agent)
        .execute(&mut *tx)
        .await
        .map_err(fail)?;

        tx.commit().await.map_err(fail)?;
        Ok(Some(row.into()))
    }

    async fn recent_clicks(&self, link_id: i64, limit: usize) -> Result<Vec<ClickEvent>, AppError> {
        self.ensure_open("recent_clicks", link_id)?;

        let sql = format!(
            "SELECT {CLICK_COLUMNS} FROM link_clicks \
             WHERE link_id = $1 \
             ORDER BY clicked_at DESC, id DESC \
             LIMIT $2"
        );

        let rows = sqlx::query_as::<_, ClickRow>(&sql)
            .bind(link_id)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::persistence("recent_clicks", link_id.to_string(), e))?;

        Ok(rows.into_iter().map(ClickEvent::from).collect())
    }

    async fn list_clicks(
        &self,
        scope: &Scope,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ClickEvent>, AppError> {
        self.ensure_open("list_clicks", scope.owner().unwrap_or("*"))?;

        let sql = "SELECT c.id, c.link_id, c.clicked_at, c.source, c.country, c.device, c.user_agent \
                   FROM link_clicks c \
                   JOIN links l ON l.id = c.link_id \
                   WHERE l.deleted_at IS NULL \
                     AND ($1::text IS NULL OR l.owner = $1) \
                     AND ($2::timestamptz IS NULL OR c.clicked_at >= $2) \
                   ORDER BY c.clicked_at ASC, c.id ASC";

        let rows = sqlx::query_as::<_, ClickRow>(sql)
            .bind(scope.owner())
            .bind(since)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::persistence("list_clicks", scope.owner().unwrap_or("*"), e))?;

        Ok(rows.into_iter().map(ClickEvent::from).collect())
    }

    async fn count_clicks_by(
        &self,
        scope: &Scope,
        dimension: Dimension,
    ) -> Result<Breakdown, AppError> {
        let key = scope.owner().unwrap_or("*");
        self.ensure_open("count_clicks_by", key)?;

        let fail = |e: sqlx::Error| AppError::persistence("count_clicks_by", key, e);

        let column = match dimension {
            Dimension::Source => "source",
            Dimension::Country => "country",
            Dimension::Device => "device",
            Dimension::HourOfDay => {
                let sql = format!(
                    "SELECT EXTRACT(HOUR FROM c.clicked_at AT TIME ZONE 'UTC')::int AS hour, \
                            COUNT(*) AS clicks \
                     {VISIBLE_CLICKS} \
                     GROUP BY hour"
                );
                let rows = sqlx::query_as::<_, (i32, i64)>(&sql)
                    .bind(scope.owner())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(fail)?;

                return Breakdown::from_hour_rows(rows);
            }
        };

        let sql = format!(
            "SELECT c.{column} AS category, COUNT(*) AS clicks \
             {VISIBLE_CLICKS} AND c.{column} <> '' \
             GROUP BY c.{column}"
        );
        let rows = sqlx::query_as::<_, (String, i64)>(&sql)
            .bind(scope.owner())
            .fetch_all(&self.pool)
            .await
            .map_err(fail)?;

        Breakdown::from_text_rows(rows)
    }
}
