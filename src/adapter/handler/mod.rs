pub mod autoload_handler;
pub mod error;

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::adapter::middleware::operator_auth::operator_middleware;
use crate::adapter::view::AdminPage;
use crate::domain::repository::SettingsRepository;
use crate::domain::service::ConfirmationTokenService;
use crate::infrastructure::config::AuthConfig;
use crate::infrastructure::metrics::Metrics;
use crate::usecase::{HandleAutoloadActionUseCase, ListAutoloadsUseCase};

/// AppState はアプリケーション全体の共有状態を表す。
#[derive(Clone)]
pub struct AppState {
    pub list_autoloads_uc: Arc<ListAutoloadsUseCase>,
    pub handle_action_uc: Arc<HandleAutoloadActionUseCase>,
    pub token_service: Arc<dyn ConfirmationTokenService>,
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub page: Arc<AdminPage>,
    pub metrics: Arc<Metrics>,
    /// None の場合は認証なし（dev モード）で全リクエストを anonymous として扱う。
    pub auth: Option<Arc<AuthConfig>>,
}

impl AppState {
    pub fn new(
        settings_repo: Arc<dyn SettingsRepository>,
        token_service: Arc<dyn ConfirmationTokenService>,
        top_limit: u32,
        page: AdminPage,
    ) -> Self {
        Self {
            list_autoloads_uc: Arc::new(ListAutoloadsUseCase::new(
                settings_repo.clone(),
                top_limit,
            )),
            handle_action_uc: Arc::new(HandleAutoloadActionUseCase::new(
                settings_repo.clone(),
                token_service.clone(),
            )),
            token_service,
            settings_repo,
            page: Arc::new(page),
            metrics: Arc::new(Metrics::new("k1s0-autoload-server")),
            auth: None,
        }
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }
}

/// ルーターを構築する。一覧画面のルートのみオペレーター認証を通す。
pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route(&state.page.path, get(autoload_handler::autoload_page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            operator_middleware,
        ));

    Router::new()
        // Health / Readiness / Metrics
        .route("/healthz", get(autoload_handler::healthz))
        .route("/readyz", get(autoload_handler::readyz))
        .route("/metrics", get(autoload_handler::metrics))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// ErrorResponse は統一エラーレスポンス。
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub request_id: String,
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self::with_details(code, message, vec![])
    }

    pub fn with_details(code: &str, message: &str, details: Vec<ErrorDetail>) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
                request_id: uuid::Uuid::new_v4().to_string(),
                details,
            },
        }
    }
}
