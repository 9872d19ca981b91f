//! Database-backed configuration facade built on `PostgreSQL`.

use std::time::Duration;

use corvid_api_models::Id;
use corvid_data::{MetaRow, MetaStore, Migrator};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument};

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfidenceThreshold, InstanceSettings, ModerationSettings};

const MAX_CONNECTIONS: u32 = 8;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Concrete settings facade backed by `PostgreSQL` + `SQLx`.
#[derive(Clone)]
pub struct ConfigService {
    pool: PgPool,
    meta: MetaStore,
}

impl ConfigService {
    /// Establish a connection pool, apply pending migrations, and ensure the
    /// singleton settings row exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the `PostgreSQL` connection cannot be established
    /// or migrations fail to run.
    #[instrument(name = "config_service.new", skip(database_url))]
    pub async fn new(database_url: impl Into<String>) -> ConfigResult<Self> {
        let database_url = database_url.into();
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&database_url)
            .await
            .map_err(|source| ConfigError::Database {
                operation: "config.connect",
                source,
            })?;

        let applied = Migrator::new().run(&pool).await.map_err(|source| {
            ConfigError::DataAccess {
                operation: "config.migrate",
                source,
            }
        })?;
        if applied > 0 {
            info!(applied, "applied pending schema migrations");
        }

        let meta = MetaStore::new(pool.clone());
        meta.fetch().await.map_err(|source| ConfigError::DataAccess {
            operation: "config.ensure_meta",
            source,
        })?;

        Ok(Self { pool, meta })
    }

    /// Access the underlying `SQLx` connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Produce a strongly typed snapshot of the current instance settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings row cannot be read or holds values
    /// outside the typed model.
    pub async fn snapshot(&self) -> ConfigResult<InstanceSettings> {
        let row = self
            .meta
            .fetch()
            .await
            .map_err(|source| ConfigError::DataAccess {
                operation: "config.snapshot",
                source,
            })?;
        map_meta_row(row)
    }
}

fn map_meta_row(row: MetaRow) -> ConfigResult<InstanceSettings> {
    let confidence_threshold: ConfidenceThreshold = row.iffy_confidence_threshold.parse()?;
    let automod_account_id = row
        .automod_account_id
        .map(|raw| {
            Id::new(raw.clone()).map_err(|_| ConfigError::InvalidAutomodAccount { value: raw })
        })
        .transpose()?;

    Ok(InstanceSettings {
        name: row.name,
        description: row.description,
        maintainer_email: row.maintainer_email,
        moderation: ModerationSettings {
            api_url: row.iffy_api_url,
            confidence_threshold,
            automod_account_id,
        },
    })
}
