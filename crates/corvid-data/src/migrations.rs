//! Versioned, reversible schema migrations.
//!
//! Every migration exposes `up`/`down` against a transaction and is recorded
//! in the `schema_migrations` tracking table. Both directions guard each
//! structural change with an explicit existence probe, so re-running either
//! direction is always a no-op rather than a duplicate-column error.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};
use tracing::info;

use crate::error::{DataError, Result};

const TRACKING_TABLE_DDL: &str = r"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        name varchar(128) PRIMARY KEY,
        applied_at timestamptz NOT NULL DEFAULT now()
    )
";

const SELECT_APPLIED: &str = r"SELECT name FROM schema_migrations";

const INSERT_APPLIED: &str = r"INSERT INTO schema_migrations (name) VALUES ($1)";

const DELETE_APPLIED: &str = r"DELETE FROM schema_migrations WHERE name = $1";

const COLUMN_EXISTS: &str = r"
    SELECT EXISTS (
        SELECT 1 FROM information_schema.columns
        WHERE table_schema = current_schema()
          AND table_name = $1
          AND column_name = $2
    )
";

const INDEX_EXISTS: &str = r"
    SELECT EXISTS (
        SELECT 1 FROM pg_indexes
        WHERE schemaname = current_schema()
          AND indexname = $1
    )
";

const CONSTRAINT_EXISTS: &str = r"
    SELECT EXISTS (
        SELECT 1 FROM information_schema.table_constraints
        WHERE table_schema = current_schema()
          AND table_name = $1
          AND constraint_name = $2
    )
";

/// A single named schema change with a paired reversal.
#[async_trait]
pub trait SchemaMigration: Send + Sync {
    /// Stable migration name recorded in the tracking table.
    fn name(&self) -> &'static str;

    /// Apply the schema change.
    async fn up(&self, conn: &mut PgConnection) -> Result<()>;

    /// Revert the schema change.
    async fn down(&self, conn: &mut PgConnection) -> Result<()>;
}

/// Probe whether a column exists on a table in the current schema.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub async fn column_exists(conn: &mut PgConnection, table: &str, column: &str) -> Result<bool> {
    let row = sqlx::query(COLUMN_EXISTS)
        .bind(table)
        .bind(column)
        .fetch_one(&mut *conn)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "schema.column_exists",
            source,
        })?;
    row.try_get(0).map_err(|source| DataError::QueryFailed {
        operation: "schema.column_exists",
        source,
    })
}

/// Probe whether an index exists in the current schema.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub async fn index_exists(conn: &mut PgConnection, index: &str) -> Result<bool> {
    let row = sqlx::query(INDEX_EXISTS)
        .bind(index)
        .fetch_one(&mut *conn)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "schema.index_exists",
            source,
        })?;
    row.try_get(0).map_err(|source| DataError::QueryFailed {
        operation: "schema.index_exists",
        source,
    })
}

/// Probe whether a named constraint exists on a table in the current schema.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub async fn constraint_exists(
    conn: &mut PgConnection,
    table: &str,
    constraint: &str,
) -> Result<bool> {
    let row = sqlx::query(CONSTRAINT_EXISTS)
        .bind(table)
        .bind(constraint)
        .fetch_one(&mut *conn)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "schema.constraint_exists",
            source,
        })?;
    row.try_get(0).map_err(|source| DataError::QueryFailed {
        operation: "schema.constraint_exists",
        source,
    })
}

async fn execute(conn: &mut PgConnection, name: &'static str, sql: &str) -> Result<()> {
    sqlx::query(sql)
        .execute(&mut *conn)
        .await
        .map(|_| ())
        .map_err(|source| DataError::MigrationFailed { name, source })
}

async fn add_column(
    conn: &mut PgConnection,
    name: &'static str,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<()> {
    if column_exists(conn, table, column).await? {
        return Ok(());
    }
    let sql = format!("ALTER TABLE {table} ADD COLUMN {column} {definition}");
    execute(conn, name, &sql).await
}

async fn drop_column(
    conn: &mut PgConnection,
    name: &'static str,
    table: &str,
    column: &str,
) -> Result<()> {
    if !column_exists(conn, table, column).await? {
        return Ok(());
    }
    let sql = format!("ALTER TABLE {table} DROP COLUMN {column}");
    execute(conn, name, &sql).await
}

struct Baseline;

#[async_trait]
impl SchemaMigration for Baseline {
    fn name(&self) -> &'static str {
        "0001_baseline"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<()> {
        const USERS_DDL: &str = r"
            CREATE TABLE IF NOT EXISTS users (
                id varchar(32) PRIMARY KEY,
                username varchar(128) NOT NULL UNIQUE,
                display_name varchar(128),
                created_at timestamptz NOT NULL DEFAULT now(),
                is_admin boolean NOT NULL DEFAULT FALSE,
                is_suspended boolean NOT NULL DEFAULT FALSE
            )
        ";
        const NOTES_DDL: &str = r"
            CREATE TABLE IF NOT EXISTS notes (
                id varchar(32) PRIMARY KEY,
                user_id varchar(32) NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                text text,
                visibility varchar(16) NOT NULL DEFAULT 'public',
                created_at timestamptz NOT NULL DEFAULT now()
            )
        ";
        const META_DDL: &str = r"
            CREATE TABLE IF NOT EXISTS meta (
                id varchar(32) PRIMARY KEY,
                name varchar(128),
                description varchar(1024),
                maintainer_email varchar(256)
            )
        ";
        const SCHOOLS_DDL: &str = r"
            CREATE TABLE IF NOT EXISTS schools (
                id varchar(32) PRIMARY KEY,
                name varchar(256) NOT NULL,
                created_at timestamptz NOT NULL DEFAULT now()
            )
        ";
        for ddl in [USERS_DDL, NOTES_DDL, META_DDL, SCHOOLS_DDL] {
            execute(conn, self.name(), ddl).await?;
        }
        Ok(())
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<()> {
        // Dependents first: notes reference users.
        for sql in [
            "DROP TABLE IF EXISTS notes",
            "DROP TABLE IF EXISTS schools",
            "DROP TABLE IF EXISTS meta",
            "DROP TABLE IF EXISTS users",
        ] {
            execute(conn, self.name(), sql).await?;
        }
        Ok(())
    }
}

struct UserBillingExempt;

#[async_trait]
impl SchemaMigration for UserBillingExempt {
    fn name(&self) -> &'static str {
        "0002_user_billing_exempt"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<()> {
        add_column(
            conn,
            self.name(),
            "users",
            "billing_exempt",
            "boolean NOT NULL DEFAULT FALSE",
        )
        .await
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<()> {
        drop_column(conn, self.name(), "users", "billing_exempt").await
    }
}

struct NoteCampraFor;

#[async_trait]
impl SchemaMigration for NoteCampraFor {
    fn name(&self) -> &'static str {
        "0003_note_campra_for"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<()> {
        add_column(conn, self.name(), "notes", "campra_for", "varchar(128)").await
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<()> {
        drop_column(conn, self.name(), "notes", "campra_for").await
    }
}

struct NoteIffyScan;

#[async_trait]
impl SchemaMigration for NoteIffyScan {
    fn name(&self) -> &'static str {
        "0004_note_iffy_scan"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<()> {
        add_column(conn, self.name(), "notes", "iffy_scan_result", "jsonb").await?;
        add_column(conn, self.name(), "notes", "iffy_scan_url", "varchar(512)").await
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<()> {
        drop_column(conn, self.name(), "notes", "iffy_scan_url").await?;
        drop_column(conn, self.name(), "notes", "iffy_scan_result").await
    }
}

struct MetaIffyConfig;

#[async_trait]
impl SchemaMigration for MetaIffyConfig {
    fn name(&self) -> &'static str {
        "0005_meta_iffy_config"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<()> {
        add_column(conn, self.name(), "meta", "iffy_api_url", "varchar(512)").await?;
        add_column(
            conn,
            self.name(),
            "meta",
            "iffy_confidence_threshold",
            "varchar(16) NOT NULL DEFAULT 'medium'",
        )
        .await
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<()> {
        drop_column(conn, self.name(), "meta", "iffy_confidence_threshold").await?;
        drop_column(conn, self.name(), "meta", "iffy_api_url").await
    }
}

struct MetaAutomodAccount;

impl MetaAutomodAccount {
    const CONSTRAINT: &'static str = "fk_meta_automod_account";
}

#[async_trait]
impl SchemaMigration for MetaAutomodAccount {
    fn name(&self) -> &'static str {
        "0006_meta_automod_account"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<()> {
        add_column(conn, self.name(), "meta", "automod_account_id", "varchar(32)").await?;
        if constraint_exists(conn, "meta", Self::CONSTRAINT).await? {
            return Ok(());
        }
        let sql = format!(
            "ALTER TABLE meta ADD CONSTRAINT {} FOREIGN KEY (automod_account_id) \
             REFERENCES users(id) ON DELETE SET NULL",
            Self::CONSTRAINT
        );
        execute(conn, self.name(), &sql).await
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<()> {
        if constraint_exists(conn, "meta", Self::CONSTRAINT).await? {
            let sql = format!("ALTER TABLE meta DROP CONSTRAINT {}", Self::CONSTRAINT);
            execute(conn, self.name(), &sql).await?;
        }
        drop_column(conn, self.name(), "meta", "automod_account_id").await
    }
}

struct UserIsTeacher;

impl UserIsTeacher {
    const INDEX: &'static str = "idx_users_is_teacher";
}

#[async_trait]
impl SchemaMigration for UserIsTeacher {
    fn name(&self) -> &'static str {
        "0007_user_is_teacher"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<()> {
        add_column(
            conn,
            self.name(),
            "users",
            "is_teacher",
            "boolean NOT NULL DEFAULT FALSE",
        )
        .await?;
        if index_exists(conn, Self::INDEX).await? {
            return Ok(());
        }
        let sql = format!("CREATE INDEX {} ON users (is_teacher)", Self::INDEX);
        execute(conn, self.name(), &sql).await
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<()> {
        if index_exists(conn, Self::INDEX).await? {
            let sql = format!("DROP INDEX {}", Self::INDEX);
            execute(conn, self.name(), &sql).await?;
        }
        drop_column(conn, self.name(), "users", "is_teacher").await
    }
}

struct SchoolLogo;

#[async_trait]
impl SchemaMigration for SchoolLogo {
    fn name(&self) -> &'static str {
        "0008_school_logo"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<()> {
        add_column(conn, self.name(), "schools", "logo_id", "varchar(32)").await
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<()> {
        drop_column(conn, self.name(), "schools", "logo_id").await
    }
}

fn catalog() -> Vec<Box<dyn SchemaMigration>> {
    vec![
        Box::new(Baseline),
        Box::new(UserBillingExempt),
        Box::new(NoteCampraFor),
        Box::new(NoteIffyScan),
        Box::new(MetaIffyConfig),
        Box::new(MetaAutomodAccount),
        Box::new(UserIsTeacher),
        Box::new(SchoolLogo),
    ]
}

/// Ordered registry of schema migrations with apply/revert drivers.
pub struct Migrator {
    steps: Vec<Box<dyn SchemaMigration>>,
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Migrator {
    /// Build the migrator over the full migration catalog.
    #[must_use]
    pub fn new() -> Self {
        Self { steps: catalog() }
    }

    /// Names of every known migration in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Apply every pending migration in declaration order.
    ///
    /// Each migration runs in its own transaction and is recorded in the
    /// tracking table on success. Returns the number of migrations applied.
    ///
    /// # Errors
    ///
    /// Returns an error when a migration statement or tracking update fails;
    /// the failing migration's transaction is rolled back.
    pub async fn run(&self, pool: &PgPool) -> Result<u32> {
        let applied = self.ensure_tracking(pool).await?;
        let mut count = 0;
        for step in &self.steps {
            if applied.contains(step.name()) {
                continue;
            }
            let mut tx = pool.begin().await.map_err(|source| DataError::QueryFailed {
                operation: "migrations.begin",
                source,
            })?;
            step.up(tx.as_mut()).await?;
            sqlx::query(INSERT_APPLIED)
                .bind(step.name())
                .execute(tx.as_mut())
                .await
                .map_err(|source| DataError::QueryFailed {
                    operation: "migrations.record",
                    source,
                })?;
            tx.commit().await.map_err(|source| DataError::QueryFailed {
                operation: "migrations.commit",
                source,
            })?;
            info!(migration = step.name(), "applied schema migration");
            count += 1;
        }
        Ok(count)
    }

    /// Revert up to `steps` of the most recently applied migrations.
    ///
    /// Returns the number of migrations reverted.
    ///
    /// # Errors
    ///
    /// Returns an error when a reversal statement or tracking update fails;
    /// the failing migration's transaction is rolled back.
    pub async fn revert(&self, pool: &PgPool, steps: u32) -> Result<u32> {
        let applied = self.ensure_tracking(pool).await?;
        let mut count = 0;
        for step in self.steps.iter().rev() {
            if count == steps {
                break;
            }
            if !applied.contains(step.name()) {
                continue;
            }
            let mut tx = pool.begin().await.map_err(|source| DataError::QueryFailed {
                operation: "migrations.begin",
                source,
            })?;
            step.down(tx.as_mut()).await?;
            sqlx::query(DELETE_APPLIED)
                .bind(step.name())
                .execute(tx.as_mut())
                .await
                .map_err(|source| DataError::QueryFailed {
                    operation: "migrations.unrecord",
                    source,
                })?;
            tx.commit().await.map_err(|source| DataError::QueryFailed {
                operation: "migrations.commit",
                source,
            })?;
            info!(migration = step.name(), "reverted schema migration");
            count += 1;
        }
        Ok(count)
    }

    /// Names currently recorded as applied, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error when the tracking table cannot be read.
    pub async fn applied(&self, pool: &PgPool) -> Result<Vec<String>> {
        let applied = self.ensure_tracking(pool).await?;
        Ok(self
            .steps
            .iter()
            .map(|step| step.name())
            .filter(|name| applied.contains(*name))
            .map(str::to_string)
            .collect())
    }

    async fn ensure_tracking(&self, pool: &PgPool) -> Result<HashSet<String>> {
        let mut conn = pool.acquire().await.map_err(|source| DataError::QueryFailed {
            operation: "migrations.acquire",
            source,
        })?;
        sqlx::query(TRACKING_TABLE_DDL)
            .execute(&mut *conn)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "migrations.tracking_table",
                source,
            })?;
        let rows = sqlx::query(SELECT_APPLIED)
            .fetch_all(&mut *conn)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "migrations.select_applied",
                source,
            })?;
        let mut applied = HashSet::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name").map_err(|source| DataError::QueryFailed {
                operation: "migrations.select_applied",
                source,
            })?;
            applied.insert(name);
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique_and_ordered() {
        let migrator = Migrator::new();
        let names = migrator.names();
        assert!(!names.is_empty());
        assert_eq!(names[0], "0001_baseline");

        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len(), "migration names must be unique");
        assert_eq!(sorted, names, "migration names must sort in apply order");
    }

    #[test]
    fn catalog_covers_every_schema_delta() {
        let names = Migrator::new().names();
        for expected in [
            "0002_user_billing_exempt",
            "0003_note_campra_for",
            "0004_note_iffy_scan",
            "0005_meta_iffy_config",
            "0006_meta_automod_account",
            "0007_user_is_teacher",
            "0008_school_logo",
        ] {
            assert!(names.contains(&expected), "missing migration {expected}");
        }
    }
}
