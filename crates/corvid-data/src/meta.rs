//! Access to the `meta` singleton configuration row.

use corvid_api_models::Id;
use sqlx::PgPool;

use crate::error::{DataError, Result};
use crate::rows::MetaRow;

/// Fixed id of the singleton configuration row.
pub const META_ROW_ID: &str = "meta";

const ENSURE_META: &str = r"
    INSERT INTO meta (id) VALUES ($1)
    ON CONFLICT (id) DO NOTHING
";

const SELECT_META: &str = r"
    SELECT id, name, description, maintainer_email,
           iffy_api_url, iffy_confidence_threshold, automod_account_id
    FROM meta
    WHERE id = $1
";

const UPDATE_SCAN_CONFIG: &str = r"
    UPDATE meta
    SET iffy_api_url = $2,
        iffy_confidence_threshold = $3
    WHERE id = $1
";

const UPDATE_AUTOMOD_ACCOUNT: &str = r"
    UPDATE meta
    SET automod_account_id = $2
    WHERE id = $1
";

/// Database-backed accessor for the singleton configuration row.
#[derive(Clone)]
pub struct MetaStore {
    pool: PgPool,
}

impl MetaStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the singleton row, creating it with defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert or select fails.
    pub async fn fetch(&self) -> Result<MetaRow> {
        sqlx::query(ENSURE_META)
            .bind(META_ROW_ID)
            .execute(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "meta.ensure",
                source,
            })?;
        sqlx::query_as::<_, MetaRow>(SELECT_META)
            .bind(META_ROW_ID)
            .fetch_one(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "meta.fetch",
                source,
            })
    }

    /// Update the moderation scan endpoint and confidence threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn set_scan_config(&self, api_url: Option<&str>, threshold: &str) -> Result<()> {
        self.fetch().await?;
        sqlx::query(UPDATE_SCAN_CONFIG)
            .bind(META_ROW_ID)
            .bind(api_url)
            .bind(threshold)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|source| DataError::QueryFailed {
                operation: "meta.set_scan_config",
                source,
            })
    }

    /// Update the acting account for automated moderation.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails (for example, when the account
    /// does not exist).
    pub async fn set_automod_account(&self, account: Option<&Id>) -> Result<()> {
        self.fetch().await?;
        sqlx::query(UPDATE_AUTOMOD_ACCOUNT)
            .bind(META_ROW_ID)
            .bind(account.map(Id::as_str))
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|source| DataError::QueryFailed {
                operation: "meta.set_automod_account",
                source,
            })
    }
}
