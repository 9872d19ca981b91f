use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use corvid_api_models::Id;
use corvid_data::{
    MetaStore, Migrator, NewNote, NewUser, NoteStore, PackSource, UserStore, column_exists,
    constraint_exists, index_exists,
};
use corvid_test_support::fixtures::docker_available;
use corvid_test_support::postgres::start_postgres;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::time::sleep;

async fn with_pool<F, Fut>(test: F) -> Result<()>
where
    F: FnOnce(PgPool) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if !docker_available() {
        eprintln!("skipping migration tests: docker socket missing");
        return Ok(());
    }

    let postgres = start_postgres().await?;
    let url = postgres.connection_string().to_string();

    let pool = {
        let mut attempts = 0;
        loop {
            match PgPoolOptions::new().max_connections(5).connect(&url).await {
                Ok(pool) => break pool,
                Err(err) => {
                    attempts += 1;
                    if attempts >= 10 {
                        return Err(err).context("failed to connect to ephemeral postgres");
                    }
                    sleep(Duration::from_millis(200)).await;
                }
            }
        }
    };

    let result = test(pool.clone()).await;
    pool.close().await;
    result
}

async fn assert_column(pool: &PgPool, table: &str, column: &str, expected: bool) -> Result<()> {
    let mut conn = pool.acquire().await?;
    let exists = column_exists(&mut conn, table, column).await?;
    assert_eq!(
        exists, expected,
        "expected {table}.{column} existence to be {expected}"
    );
    Ok(())
}

fn unique_id() -> Id {
    Id::generate()
}

#[tokio::test]
async fn up_then_down_restores_the_prior_schema() -> Result<()> {
    with_pool(|pool| async move {
        let migrator = Migrator::new();
        let applied = migrator.run(&pool).await?;
        assert_eq!(applied as usize, migrator.names().len());

        for (table, column) in [
            ("users", "billing_exempt"),
            ("users", "is_teacher"),
            ("notes", "campra_for"),
            ("notes", "iffy_scan_result"),
            ("notes", "iffy_scan_url"),
            ("meta", "iffy_api_url"),
            ("meta", "iffy_confidence_threshold"),
            ("meta", "automod_account_id"),
            ("schools", "logo_id"),
        ] {
            assert_column(&pool, table, column, true).await?;
        }
        {
            let mut conn = pool.acquire().await?;
            assert!(index_exists(&mut conn, "idx_users_is_teacher").await?);
            assert!(constraint_exists(&mut conn, "meta", "fk_meta_automod_account").await?);
        }

        let reverted = migrator
            .revert(&pool, u32::try_from(migrator.names().len())?)
            .await?;
        assert_eq!(reverted, applied);
        assert_column(&pool, "users", "id", false).await?;
        assert_column(&pool, "meta", "automod_account_id", false).await?;

        // A fresh run rebuilds the whole schema.
        let reapplied = migrator.run(&pool).await?;
        assert_eq!(reapplied, applied);
        assert_column(&pool, "users", "billing_exempt", true).await?;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn reruns_and_rereverts_are_noops() -> Result<()> {
    with_pool(|pool| async move {
        let migrator = Migrator::new();
        migrator.run(&pool).await?;
        assert_eq!(migrator.run(&pool).await?, 0, "second run must be a no-op");

        // Forget the tracking rows to simulate a half-recorded deploy; the
        // existence guards must still make a rerun safe.
        sqlx::query("DELETE FROM schema_migrations")
            .execute(&pool)
            .await?;
        let reapplied = migrator.run(&pool).await?;
        assert_eq!(reapplied as usize, migrator.names().len());
        assert_column(&pool, "users", "billing_exempt", true).await?;

        let total = u32::try_from(migrator.names().len())?;
        assert_eq!(migrator.revert(&pool, total).await?, total);
        assert_eq!(
            migrator.revert(&pool, total).await?,
            0,
            "second revert must be a no-op"
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn deleting_the_automod_account_nulls_the_reference() -> Result<()> {
    with_pool(|pool| async move {
        Migrator::new().run(&pool).await?;
        let users = UserStore::new(pool.clone());
        let meta = MetaStore::new(pool.clone());

        let account = users
            .insert(&NewUser {
                id: unique_id(),
                username: "automod".into(),
                display_name: None,
                is_admin: true,
                is_teacher: false,
                billing_exempt: true,
            })
            .await?;
        let account_id = Id::new(account.id.clone())?;
        meta.set_automod_account(Some(&account_id)).await?;
        assert_eq!(
            meta.fetch().await?.automod_account_id.as_deref(),
            Some(account.id.as_str())
        );

        assert!(users.delete(&account_id).await?);
        assert_eq!(
            meta.fetch().await?.automod_account_id,
            None,
            "deleting the referenced user must null the automod account"
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn pack_by_id_matches_pack_loaded() -> Result<()> {
    with_pool(|pool| async move {
        Migrator::new().run(&pool).await?;
        let users = UserStore::new(pool.clone());
        let notes = NoteStore::new(pool.clone());

        let author = users
            .insert(&NewUser {
                id: unique_id(),
                username: "keri".into(),
                display_name: Some("Keri".into()),
                is_admin: false,
                is_teacher: true,
                billing_exempt: false,
            })
            .await?;
        let author_id = Id::new(author.id.clone())?;
        let note = notes
            .insert(&NewNote {
                id: unique_id(),
                user_id: author_id.clone(),
                text: "first post".into(),
                visibility: "public".into(),
                campra_for: Some("autumn2026".into()),
            })
            .await?;
        let note_id = Id::new(note.id.clone())?;

        let by_id = notes.pack(PackSource::Id(&note_id)).await?;
        let loaded = notes.pack(PackSource::Loaded(&note)).await?;
        assert_eq!(by_id, loaded);
        assert_eq!(by_id.campra_for.as_deref(), Some("autumn2026"));

        let packed_user = users.pack(PackSource::Id(&author_id)).await?;
        assert!(packed_user.is_teacher);

        let missing = notes.pack(PackSource::Id(&unique_id())).await;
        assert!(
            matches!(missing, Err(corvid_data::DataError::NotFound { entity: "note", .. })),
            "missing note must be a typed not-found"
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn scan_results_persist_onto_notes() -> Result<()> {
    with_pool(|pool| async move {
        Migrator::new().run(&pool).await?;
        let users = UserStore::new(pool.clone());
        let notes = NoteStore::new(pool.clone());

        let author = users
            .insert(&NewUser {
                id: unique_id(),
                username: "poster".into(),
                display_name: None,
                is_admin: false,
                is_teacher: false,
                billing_exempt: false,
            })
            .await?;
        let note = notes
            .insert(&NewNote {
                id: unique_id(),
                user_id: Id::new(author.id.clone())?,
                text: "scan me".into(),
                visibility: "home".into(),
                campra_for: None,
            })
            .await?;
        let note_id = Id::new(note.id.clone())?;

        let verdict = serde_json::json!({"flagged": true, "confidence": "high"});
        notes
            .record_scan(&note_id, &verdict, Some("https://iffy.example/records/42"))
            .await?;

        let packed = notes.pack(PackSource::Id(&note_id)).await?;
        assert_eq!(packed.iffy_scan_result, Some(verdict));
        assert_eq!(
            packed.iffy_scan_url.as_deref(),
            Some("https://iffy.example/records/42")
        );

        let missing = notes
            .record_scan(&unique_id(), &serde_json::json!({}), None)
            .await;
        assert!(matches!(
            missing,
            Err(corvid_data::DataError::NotFound { entity: "note", .. })
        ));
        Ok(())
    })
    .await
}
