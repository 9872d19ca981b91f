//! Shared state threaded through the HTTP handlers.

use std::sync::Arc;

use async_trait::async_trait;
use corvid_config::{ConfigService, InstanceSettings};
use corvid_data::{NoteStore, SchoolStore, UserStore};
use corvid_queue::JobQueue;
use corvid_telemetry::Metrics;

use crate::release::ReleaseClient;

/// Abstraction over the settings backend so handlers can be exercised with
/// stubs in tests.
#[async_trait]
pub trait ConfigFacade: Send + Sync {
    /// Retrieve the current instance settings.
    async fn settings(&self) -> anyhow::Result<InstanceSettings>;
}

#[async_trait]
impl ConfigFacade for ConfigService {
    async fn settings(&self) -> anyhow::Result<InstanceSettings> {
        Ok(self.snapshot().await?)
    }
}

/// Dependencies shared by every handler.
pub struct ApiState {
    pub(crate) config: Arc<dyn ConfigFacade>,
    pub(crate) users: UserStore,
    pub(crate) notes: NoteStore,
    pub(crate) schools: SchoolStore,
    pub(crate) queue: JobQueue,
    pub(crate) telemetry: Metrics,
    pub(crate) release: ReleaseClient,
}

impl ApiState {
    /// Bundle the handler dependencies.
    #[must_use]
    pub fn new(
        config: Arc<dyn ConfigFacade>,
        users: UserStore,
        notes: NoteStore,
        schools: SchoolStore,
        queue: JobQueue,
        telemetry: Metrics,
        release: ReleaseClient,
    ) -> Self {
        Self {
            config,
            users,
            notes,
            schools,
            queue,
            telemetry,
            release,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stub state construction for handler unit tests.

    use super::*;
    use corvid_config::{ConfidenceThreshold, ModerationSettings};
    use corvid_queue::{JobEnvelope, JobExecutor};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use tokio::task::JoinHandle;

    pub(crate) struct StubConfig {
        settings: Option<InstanceSettings>,
    }

    #[async_trait]
    impl ConfigFacade for StubConfig {
        async fn settings(&self) -> anyhow::Result<InstanceSettings> {
            self.settings
                .clone()
                .ok_or_else(|| anyhow::anyhow!("database unreachable"))
        }
    }

    pub(crate) struct RecordingExecutor {
        pub(crate) kinds: Mutex<Vec<&'static str>>,
        pub(crate) notify: Notify,
        fail: bool,
    }

    impl RecordingExecutor {
        pub(crate) fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                kinds: Mutex::new(Vec::new()),
                notify: Notify::new(),
                fail,
            })
        }
    }

    #[async_trait]
    impl JobExecutor for RecordingExecutor {
        async fn execute(&self, envelope: &JobEnvelope) -> anyhow::Result<()> {
            self.kinds.lock().expect("lock").push(envelope.job.kind());
            self.notify.notify_one();
            if self.fail {
                return Err(anyhow::anyhow!("job exploded"));
            }
            Ok(())
        }
    }

    fn sample_settings() -> InstanceSettings {
        InstanceSettings {
            name: Some("corvid-test".into()),
            description: None,
            maintainer_email: None,
            moderation: ModerationSettings {
                api_url: None,
                confidence_threshold: ConfidenceThreshold::Medium,
                automod_account_id: None,
            },
        }
    }

    fn build_state(
        settings: Option<InstanceSettings>,
        executor: Arc<RecordingExecutor>,
        release: ReleaseClient,
    ) -> (Arc<ApiState>, JoinHandle<()>) {
        let metrics = Metrics::new().expect("metrics");
        let (queue, worker) = JobQueue::start(executor, metrics.clone());
        // The stores never connect in handler unit tests; a lazy pool keeps
        // construction free of a live database.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://corvid@127.0.0.1:5432/corvid_test")
            .expect("lazy pool");
        let state = Arc::new(ApiState::new(
            Arc::new(StubConfig { settings }),
            UserStore::new(pool.clone()),
            NoteStore::new(pool.clone()),
            SchoolStore::new(pool),
            queue,
            metrics,
            release,
        ));
        (state, worker)
    }

    pub(crate) fn stub_state(
        executor: Arc<RecordingExecutor>,
    ) -> (Arc<ApiState>, JoinHandle<()>) {
        build_state(
            Some(sample_settings()),
            executor,
            ReleaseClient::default(),
        )
    }

    pub(crate) fn stub_state_unreachable(
        executor: Arc<RecordingExecutor>,
    ) -> (Arc<ApiState>, JoinHandle<()>) {
        build_state(None, executor, ReleaseClient::default())
    }

    pub(crate) fn stub_state_with_release(
        executor: Arc<RecordingExecutor>,
        release: ReleaseClient,
    ) -> (Arc<ApiState>, JoinHandle<()>) {
        build_state(Some(sample_settings()), executor, release)
    }
}
