use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use k1s0_autoload_server::adapter::handler::{self, AppState};
use k1s0_autoload_server::adapter::repository::settings_mysql::SettingsMySqlRepository;
use k1s0_autoload_server::adapter::view::AdminPage;
use k1s0_autoload_server::domain::entity::autoload_entry::{AutoloadRow, SettingEntry};
use k1s0_autoload_server::domain::repository::SettingsRepository;
use k1s0_autoload_server::infrastructure::config::Config;
use k1s0_autoload_server::infrastructure::confirmation_token::HmacConfirmationTokenService;
use k1s0_autoload_server::infrastructure::{database, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/config.yaml".to_string());
    let mut cfg = Config::load(&config_path)?;
    cfg.apply_env_overrides(|key| std::env::var(key).ok());

    // Telemetry
    telemetry::init_logger(&cfg.app.environment, &cfg.log.format);

    info!(
        app_name = %cfg.app.name,
        version = %cfg.app.version,
        environment = %cfg.app.environment,
        "starting autoload server"
    );

    // Settings repository: MySQL if DATABASE_URL or database config is set, otherwise in-memory
    let max_conns = cfg.database.as_ref().map_or(10, |db| db.max_open_conns);
    let database_url = std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| cfg.database.as_ref().map(|db| db.connection_url()));

    let settings_repo: Arc<dyn SettingsRepository> = if let Some(url) = database_url {
        info!("connecting to MySQL...");
        let pool = database::connect(&url, max_conns).await?;
        let repo = SettingsMySqlRepository::new(pool, &cfg.settings_table)?;
        let table = cfg.settings_table.table_name()?;
        info!(table = %table, "connected to MySQL");
        Arc::new(repo)
    } else {
        info!("no database configured, using in-memory repository");
        Arc::new(InMemorySettingsRepository::new(
            cfg.settings_table.enabled_values.clone(),
            cfg.settings_table.disabled_value.clone(),
        ))
    };

    // Confirmation tokens
    let token_service = Arc::new(HmacConfirmationTokenService::from_config(&cfg.token));

    let page = AdminPage::new(cfg.server.admin_path.clone(), cfg.server.page_id.clone());
    info!(listing_url = %page.listing_url(), "autoload listing page registered");

    let mut state = AppState::new(
        settings_repo,
        token_service,
        cfg.settings_table.top_limit,
        page,
    );
    if let Some(auth_cfg) = cfg.auth.clone() {
        info!(
            user_header = %auth_cfg.user_header,
            required_role = %auth_cfg.required_role,
            "operator authentication enabled"
        );
        state = state.with_auth(auth_cfg);
    } else {
        info!("no auth configured, autoload server running without authentication");
    }

    // Router
    let app = handler::router(state);

    // REST server
    let host: std::net::IpAddr = cfg.server.host.parse()?;
    let rest_addr = SocketAddr::from((host, cfg.server.port));
    info!("REST server starting on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("autoload server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}

/// InMemorySettingsRepository は開発用のインメモリ設定リポジトリ。
struct InMemorySettingsRepository {
    entries: RwLock<Vec<SettingEntry>>,
    enabled_values: Vec<String>,
    disabled_value: String,
}

impl InMemorySettingsRepository {
    fn new(enabled_values: Vec<String>, disabled_value: String) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            enabled_values,
            disabled_value,
        }
    }
}

#[async_trait::async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn fetch_top_autoloaded(&self, limit: u32) -> anyhow::Result<Vec<AutoloadRow>> {
        let entries = self.entries.read().await;
        let mut rows: Vec<_> = entries
            .iter()
            .filter(|e| e.is_autoloaded(&self.enabled_values))
            .map(|e| AutoloadRow {
                name: e.name.clone(),
                size: e.value_size(),
            })
            .collect();
        rows.sort_by(|a, b| b.size.cmp(&a.size));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn total_autoload_size(&self) -> anyhow::Result<i64> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.is_autoloaded(&self.enabled_values))
            .map(SettingEntry::value_size)
            .sum())
    }

    async fn delete(&self, name: &str) -> anyhow::Result<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.name != name);
        Ok(entries.len() < before)
    }

    async fn disable_autoload(&self, name: &str) -> anyhow::Result<bool> {
        let mut entries = self.entries.write().await;
        match entries
            .iter_mut()
            .find(|e| e.name == name && e.autoload != self.disabled_value)
        {
            Some(entry) => {
                entry.autoload = self.disabled_value.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
