//! Repository and pack serializer for user accounts.

use corvid_api_models::{Id, PackedUser};
use sqlx::PgPool;

use crate::error::{DataError, Result};
use crate::pack::PackSource;
use crate::rows::UserRow;

const USER_COLUMNS: &str = r"
    id, username, display_name, created_at,
    is_admin, is_suspended, billing_exempt, is_teacher
";

const SELECT_USER: &str = r"
    SELECT id, username, display_name, created_at,
           is_admin, is_suspended, billing_exempt, is_teacher
    FROM users
    WHERE id = $1
";

const DELETE_USER: &str = r"DELETE FROM users WHERE id = $1";

/// Fields accepted when creating a user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Object id for the new account.
    pub id: Id,
    /// Unique handle.
    pub username: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Instance administrator flag.
    pub is_admin: bool,
    /// Teacher role flag.
    pub is_teacher: bool,
    /// Billing exemption flag.
    pub billing_exempt: bool,
}

/// Database-backed repository for user accounts.
#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a user row by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn fetch(&self, id: &Id) -> Result<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(SELECT_USER)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "users.fetch",
                source,
            })
    }

    /// Insert a new user account and return the persisted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (for example, on a duplicate
    /// username).
    pub async fn insert(&self, user: &NewUser) -> Result<UserRow> {
        let sql = format!(
            "INSERT INTO users (id, username, display_name, is_admin, is_teacher, billing_exempt) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id.as_str())
            .bind(&user.username)
            .bind(user.display_name.as_deref())
            .bind(user.is_admin)
            .bind(user.is_teacher)
            .bind(user.billing_exempt)
            .fetch_one(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "users.insert",
                source,
            })
    }

    /// Delete a user account; returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete(&self, id: &Id) -> Result<bool> {
        let result = sqlx::query(DELETE_USER)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "users.delete",
                source,
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Serialize a user to its API representation.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] when packing by id and no row exists,
    /// or an error if the lookup fails.
    pub async fn pack(&self, source: PackSource<'_, UserRow>) -> Result<PackedUser> {
        match source {
            PackSource::Loaded(row) => pack_user_row(row),
            PackSource::Id(id) => {
                let row = self.fetch(id).await?.ok_or_else(|| DataError::NotFound {
                    entity: "user",
                    id: id.to_string(),
                })?;
                pack_user_row(&row)
            }
        }
    }
}

fn pack_user_row(row: &UserRow) -> Result<PackedUser> {
    let id = Id::new(row.id.clone()).map_err(|source| DataError::InvalidRow {
        entity: "user",
        source,
    })?;
    Ok(PackedUser {
        id,
        username: row.username.clone(),
        display_name: row.display_name.clone(),
        created_at: row.created_at,
        is_admin: row.is_admin,
        is_teacher: row.is_teacher,
        billing_exempt: row.billing_exempt,
    })
}
