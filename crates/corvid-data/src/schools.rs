//! Repository and pack serializer for schools.

use corvid_api_models::{Id, PackedSchool};
use sqlx::PgPool;

use crate::error::{DataError, Result};
use crate::pack::PackSource;
use crate::rows::SchoolRow;

const SCHOOL_COLUMNS: &str = r"id, name, created_at, logo_id";

const SELECT_SCHOOL: &str = r"
    SELECT id, name, created_at, logo_id
    FROM schools
    WHERE id = $1
";

/// Fields accepted when creating a school.
#[derive(Debug, Clone)]
pub struct NewSchool {
    /// Object id for the new school.
    pub id: Id,
    /// Display name.
    pub name: String,
    /// Logo asset id, when set.
    pub logo_id: Option<String>,
}

/// Database-backed repository for schools.
#[derive(Clone)]
pub struct SchoolStore {
    pool: PgPool,
}

impl SchoolStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a school row by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn fetch(&self, id: &Id) -> Result<Option<SchoolRow>> {
        sqlx::query_as::<_, SchoolRow>(SELECT_SCHOOL)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "schools.fetch",
                source,
            })
    }

    /// Insert a new school and return the persisted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert(&self, school: &NewSchool) -> Result<SchoolRow> {
        let sql = format!(
            "INSERT INTO schools (id, name, logo_id) VALUES ($1, $2, $3) \
             RETURNING {SCHOOL_COLUMNS}"
        );
        sqlx::query_as::<_, SchoolRow>(&sql)
            .bind(school.id.as_str())
            .bind(&school.name)
            .bind(school.logo_id.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "schools.insert",
                source,
            })
    }

    /// Serialize a school to its API representation.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] when packing by id and no row exists,
    /// or an error if the lookup fails.
    pub async fn pack(&self, source: PackSource<'_, SchoolRow>) -> Result<PackedSchool> {
        match source {
            PackSource::Loaded(row) => pack_school_row(row),
            PackSource::Id(id) => {
                let row = self.fetch(id).await?.ok_or_else(|| DataError::NotFound {
                    entity: "school",
                    id: id.to_string(),
                })?;
                pack_school_row(&row)
            }
        }
    }
}

fn pack_school_row(row: &SchoolRow) -> Result<PackedSchool> {
    let id = Id::new(row.id.clone()).map_err(|source| DataError::InvalidRow {
        entity: "school",
        source,
    })?;
    Ok(PackedSchool {
        id,
        name: row.name.clone(),
        created_at: row.created_at,
        logo_id: row.logo_id.clone(),
    })
}
