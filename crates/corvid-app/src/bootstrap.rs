//! Sequential service wiring for the Corvid worker.
//!
//! Boot order: database connectivity (with migrations), then the
//! auto-moderator, then the HTTP listener, then the job queue worker. Only
//! the queue startup is non-blocking relative to the readiness signal; every
//! earlier step is awaited before the next begins.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use corvid_api::{ApiServer, ApiState, ReleaseClient};
use corvid_config::ConfigService;
use corvid_data::{NoteStore, SchoolStore, UserStore};
use corvid_moderation::AutoModerator;
use corvid_queue::JobQueue;
use corvid_telemetry::{LogFormat, LoggingConfig, Metrics};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::executor::PlatformJobExecutor;
use crate::supervisor;

const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Dependencies required to bootstrap the worker.
pub struct BootstrapDependencies {
    logging: LoggingConfig<'static>,
    database_url: String,
    bind_addr: IpAddr,
    http_port: u16,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when `DATABASE_URL` is missing or the optional
    /// server settings fail to parse.
    pub fn from_env() -> AppResult<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| AppError::MissingEnv { name: "DATABASE_URL" })?;
        let http_port = parse_http_port(std::env::var("CORVID_HTTP_PORT").ok().as_deref())?;
        let bind_addr = parse_bind_addr(std::env::var("CORVID_BIND_ADDR").ok().as_deref())?;
        let format = std::env::var("CORVID_LOG_FORMAT")
            .ok()
            .map_or_else(LogFormat::infer, |label| LogFormat::from_label(&label));

        Ok(Self {
            logging: LoggingConfig {
                level: corvid_telemetry::DEFAULT_LOG_LEVEL,
                format,
            },
            database_url,
            bind_addr,
            http_port,
        })
    }
}

/// Entry point for the worker boot sequence.
///
/// # Errors
///
/// Returns an error if dependency construction or startup fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence that relies entirely on injected dependencies.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    corvid_telemetry::init_logging(&dependencies.logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    info!("corvid worker bootstrap starting");

    // Database connectivity and migrations come first; everything else
    // reads configuration through this service.
    let config = ConfigService::new(dependencies.database_url.clone())
        .await
        .map_err(|err| AppError::config("config_service.new", err))?;
    let settings = config
        .snapshot()
        .await
        .map_err(|err| AppError::config("config_service.snapshot", err))?;
    let metrics =
        Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;

    // The auto-moderator must be ready before any request can enqueue work.
    let moderator = Arc::new(AutoModerator::new(config.pool().clone(), metrics.clone()));
    moderator
        .initialize(&settings)
        .await
        .map_err(|err| AppError::moderation("auto_moderator.initialize", err))?;
    info!("auto-moderation subsystem ready");

    let pool = config.pool().clone();
    let (queue, job_receiver) = JobQueue::channel(metrics.clone());
    let state = Arc::new(ApiState::new(
        Arc::new(config),
        UserStore::new(pool.clone()),
        NoteStore::new(pool.clone()),
        SchoolStore::new(pool),
        queue,
        metrics.clone(),
        ReleaseClient::default(),
    ));
    let api = ApiServer::new(state);

    let addr = SocketAddr::new(dependencies.bind_addr, dependencies.http_port);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::io("api_server.bind", source))?;
    info!(addr = %addr, "api listener bound");
    let server = tokio::spawn(api.serve_on(listener));

    // Queue startup is the only non-blocking step before readiness.
    let executor = Arc::new(PlatformJobExecutor::new(Arc::clone(&moderator)));
    let worker = job_receiver.start(executor);

    supervisor::notify_ready().await?;

    let serve_result = server.await;

    if !worker.is_finished() {
        worker.abort();
    }
    if let Err(err) = worker.await {
        if !err.is_cancelled() {
            warn!(error = %err, "queue worker join failed");
        }
    }

    match serve_result {
        Ok(result) => result.map_err(|err| AppError::api_server("api_server.serve", err))?,
        Err(err) => {
            return Err(AppError::api_server("api_server.join", err.into()));
        }
    }
    info!("api server shutdown complete");
    Ok(())
}

fn parse_http_port(value: Option<&str>) -> AppResult<u16> {
    let Some(raw) = value else {
        return Ok(DEFAULT_HTTP_PORT);
    };
    let port: u16 = raw.parse().map_err(|_| AppError::InvalidConfig {
        field: "http_port",
        reason: "not_a_port",
        value: Some(raw.to_string()),
    })?;
    if port == 0 {
        return Err(AppError::InvalidConfig {
            field: "http_port",
            reason: "zero",
            value: Some(raw.to_string()),
        });
    }
    Ok(port)
}

fn parse_bind_addr(value: Option<&str>) -> AppResult<IpAddr> {
    value.map_or(Ok(DEFAULT_BIND_ADDR), |raw| {
        raw.parse().map_err(|_| AppError::InvalidConfig {
            field: "bind_addr",
            reason: "not_an_ip_address",
            value: Some(raw.to_string()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_port_defaults_when_unset() -> AppResult<()> {
        assert_eq!(parse_http_port(None)?, DEFAULT_HTTP_PORT);
        assert_eq!(parse_http_port(Some("8080"))?, 8080);
        Ok(())
    }

    #[test]
    fn http_port_rejects_garbage_and_zero() {
        assert!(matches!(
            parse_http_port(Some("not-a-port")),
            Err(AppError::InvalidConfig {
                field: "http_port",
                reason: "not_a_port",
                ..
            })
        ));
        assert!(matches!(
            parse_http_port(Some("0")),
            Err(AppError::InvalidConfig {
                field: "http_port",
                reason: "zero",
                ..
            })
        ));
    }

    #[test]
    fn bind_addr_defaults_to_loopback() -> AppResult<()> {
        assert_eq!(parse_bind_addr(None)?, DEFAULT_BIND_ADDR);
        let all_interfaces = "0.0.0.0".parse::<IpAddr>().expect("literal address");
        assert_eq!(parse_bind_addr(Some("0.0.0.0"))?, all_interfaces);
        Ok(())
    }

    #[test]
    fn bind_addr_rejects_garbage() {
        assert!(matches!(
            parse_bind_addr(Some("localhost:3000")),
            Err(AppError::InvalidConfig {
                field: "bind_addr",
                ..
            })
        ));
    }
}
