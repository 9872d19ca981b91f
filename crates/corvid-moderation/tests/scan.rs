use std::time::Duration;

use anyhow::Result;
use axum::{Json, Router, routing::post};
use corvid_api_models::Id;
use corvid_config::ConfigService;
use corvid_data::{MetaStore, NewNote, NewUser, NoteStore, PackSource, UserStore};
use corvid_moderation::{AutoModerator, ModerationError, ScanOutcome};
use corvid_telemetry::Metrics;
use corvid_test_support::fixtures::docker_available;
use corvid_test_support::postgres::start_postgres;
use tokio::net::TcpListener;
use tokio::time::sleep;

async fn connect_service(url: &str) -> Result<ConfigService> {
    let mut attempts = 0;
    loop {
        match ConfigService::new(url.to_string()).await {
            Ok(service) => return Ok(service),
            Err(err) => {
                attempts += 1;
                if attempts >= 10 {
                    return Err(err.into());
                }
                sleep(Duration::from_millis(200)).await;
            }
        }
    }
}

async fn spawn_scan_api(verdict: serde_json::Value) -> Result<String> {
    let app = Router::new().route(
        "/scan",
        post(move || {
            let verdict = verdict.clone();
            async move { Json(verdict) }
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });
    Ok(format!("http://{addr}/scan"))
}

async fn seed_note(service: &ConfigService, text: &str) -> Result<Id> {
    let users = UserStore::new(service.pool().clone());
    let notes = NoteStore::new(service.pool().clone());
    let author = users
        .insert(&NewUser {
            id: Id::generate(),
            username: format!("author{}", Id::generate()),
            display_name: None,
            is_admin: false,
            is_teacher: false,
            billing_exempt: false,
        })
        .await?;
    let note = notes
        .insert(&NewNote {
            id: Id::generate(),
            user_id: Id::new(author.id)?,
            text: text.into(),
            visibility: "public".into(),
            campra_for: None,
        })
        .await?;
    Ok(Id::new(note.id)?)
}

#[tokio::test]
async fn flagged_verdicts_above_threshold_are_persisted() -> Result<()> {
    if !docker_available() {
        eprintln!("skipping moderation tests: docker socket missing");
        return Ok(());
    }
    let postgres = start_postgres().await?;
    let service = connect_service(postgres.connection_string()).await?;
    let meta = MetaStore::new(service.pool().clone());
    let notes = NoteStore::new(service.pool().clone());

    let verdict = serde_json::json!({
        "flagged": true,
        "confidence": "high",
        "record_url": "https://iffy.example/records/9"
    });
    let scan_url = spawn_scan_api(verdict.clone()).await?;
    meta.set_scan_config(Some(&scan_url), "medium").await?;

    let moderator = AutoModerator::new(service.pool().clone(), Metrics::new()?);
    moderator.initialize(&service.snapshot().await?).await?;

    let note_id = seed_note(&service, "questionable content").await?;
    let outcome = moderator.scan_note(&note_id).await?;
    assert_eq!(outcome, ScanOutcome::Flagged);

    let packed = notes.pack(PackSource::Id(&note_id)).await?;
    assert_eq!(packed.iffy_scan_result, Some(verdict));
    assert_eq!(
        packed.iffy_scan_url.as_deref(),
        Some("https://iffy.example/records/9")
    );
    Ok(())
}

#[tokio::test]
async fn verdicts_below_threshold_stay_clean() -> Result<()> {
    if !docker_available() {
        eprintln!("skipping moderation tests: docker socket missing");
        return Ok(());
    }
    let postgres = start_postgres().await?;
    let service = connect_service(postgres.connection_string()).await?;
    let meta = MetaStore::new(service.pool().clone());

    let verdict = serde_json::json!({"flagged": true, "confidence": "low"});
    let scan_url = spawn_scan_api(verdict).await?;
    meta.set_scan_config(Some(&scan_url), "high").await?;

    let moderator = AutoModerator::new(service.pool().clone(), Metrics::new()?);
    moderator.initialize(&service.snapshot().await?).await?;

    let note_id = seed_note(&service, "mild content").await?;
    assert_eq!(moderator.scan_note(&note_id).await?, ScanOutcome::Clean);
    Ok(())
}

#[tokio::test]
async fn unconfigured_moderator_skips_scans() -> Result<()> {
    if !docker_available() {
        eprintln!("skipping moderation tests: docker socket missing");
        return Ok(());
    }
    let postgres = start_postgres().await?;
    let service = connect_service(postgres.connection_string()).await?;

    let moderator = AutoModerator::new(service.pool().clone(), Metrics::new()?);
    moderator.initialize(&service.snapshot().await?).await?;

    let note_id = seed_note(&service, "anything").await?;
    assert_eq!(moderator.scan_note(&note_id).await?, ScanOutcome::Skipped);
    Ok(())
}

#[tokio::test]
async fn initialize_rejects_a_missing_automod_account() -> Result<()> {
    if !docker_available() {
        eprintln!("skipping moderation tests: docker socket missing");
        return Ok(());
    }
    let postgres = start_postgres().await?;
    let service = connect_service(postgres.connection_string()).await?;

    // Point the settings at an account that was never created.
    let ghost = Id::generate();
    let mut settings = service.snapshot().await?;
    settings.moderation.automod_account_id = Some(ghost.clone());

    let moderator = AutoModerator::new(service.pool().clone(), Metrics::new()?);
    let error = moderator
        .initialize(&settings)
        .await
        .expect_err("ghost account must be rejected");
    assert!(
        matches!(error, ModerationError::AccountMissing { id } if id == ghost.to_string())
    );
    Ok(())
}
