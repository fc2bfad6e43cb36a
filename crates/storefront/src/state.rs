use anyhow::{Context, Result};
use chrono::Duration;
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynCaptchaVerifier, DynHashing},
    config::{
        Config, ConnectionManager, DisabledCaptcha, Hashing, ReCaptchaVerifier, RedisClient,
        RedisConfig, run_migrations,
    },
    di::{DependenciesInject, DependenciesInjectDeps},
    utils::{SystemMetrics, run_metrics_collector},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
    pub system_metrics: Arc<SystemMetrics>,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Connecting to Postgres");
        let pool = ConnectionManager::new_pool(&config.database_url, config.db_max_conn)
            .await
            .context("Failed to connect to database")?;

        if config.run_migrations {
            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
        }

        info!("Initializing Redis connection for storefront");
        let redis_config = RedisConfig::new(
            config.redis_host.clone(),
            config.redis_port,
            config.redis_db,
            config.redis_password.clone(),
        );
        let redis = RedisClient::new(&redis_config).context("Failed to connect to Redis")?;

        redis.ping().await.context("Failed to ping Redis server")?;

        let hash = Arc::new(Hashing::new()) as DynHashing;

        let captcha = if config.recaptcha.enabled {
            Arc::new(ReCaptchaVerifier::new(config.recaptcha.secret.clone())) as DynCaptchaVerifier
        } else {
            info!("⚠️ reCAPTCHA verification is disabled");
            Arc::new(DisabledCaptcha) as DynCaptchaVerifier
        };

        let deps = DependenciesInjectDeps::postgres(
            pool,
            &redis,
            hash,
            captcha,
            Duration::minutes(config.session_ttl_minutes),
        );

        let state = Self::from_deps(deps);

        if let Some(admin) = &config.admin {
            state
                .di_container
                .user_service
                .ensure_admin(&admin.username, &admin.email, &admin.password)
                .await
                .context("Failed to create bootstrap admin")?;
        }

        tokio::spawn(run_metrics_collector(state.system_metrics.clone()));

        Ok(state)
    }

    /// Builds the container and metrics registry around already wired seams.
    pub fn from_deps(deps: DependenciesInjectDeps) -> Self {
        let mut registry = Registry::default();
        let system_metrics = Arc::new(SystemMetrics::new());

        let di_container = DependenciesInject::new(deps, &mut registry);
        system_metrics.register(&mut registry);

        Self {
            di_container,
            registry: Arc::new(Mutex::new(registry)),
            system_metrics,
        }
    }
}
