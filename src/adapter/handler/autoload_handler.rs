use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};

use super::error::page_not_found;
use super::AppState;
use crate::adapter::view::render_listing;
use crate::domain::entity::operator::Operator;
use crate::usecase::handle_autoload_action::HandleAutoloadActionError;
use crate::usecase::{ActionOutcome, ActionQuery};

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /readyz
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    // DB 接続確認: 合計サイズの集計クエリで疎通チェック
    let db_ok = state.settings_repo.total_autoload_size().await.is_ok();

    let (code, status, db_status) = if db_ok {
        (StatusCode::OK, "ready", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready", "error")
    };

    (
        code,
        Json(serde_json::json!({
            "status": status,
            "checks": {
                "database": db_status
            }
        })),
    )
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.metrics.gather_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

/// GET <admin_path>?page=<page_id>[&action=..&option_name=..&_wpnonce=..]
///
/// 操作パラメータが揃っていれば Act を実行して一覧画面へリダイレクトし、
/// そうでなければ一覧画面を描画する。
pub async fn autoload_page(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    Query(query): Query<ActionQuery>,
) -> Response {
    if query.page.as_deref() != Some(state.page.page_id.as_str()) {
        return page_not_found(query.page.as_deref());
    }

    match state.handle_action_uc.execute(&query, &operator.id).await {
        Ok(ActionOutcome::Applied { action, .. }) => {
            state.metrics.record_action_applied(action.as_str());
            return Redirect::to(&state.page.listing_url()).into_response();
        }
        Ok(ActionOutcome::NotAnAction | ActionOutcome::Malformed(_)) => {}
        Err(e) => {
            match &e {
                HandleAutoloadActionError::TokenInvalid { .. } => {
                    state.metrics.record_token_rejected();
                }
                HandleAutoloadActionError::StoreUnavailable(_) => {
                    state.metrics.record_store_error("action");
                }
            }
            return e.into_response();
        }
    }

    state.metrics.record_listing_request();
    match state.list_autoloads_uc.execute().await {
        Ok(listing) => Html(render_listing(
            &listing,
            &state.page,
            state.token_service.as_ref(),
            &operator.id,
        ))
        .into_response(),
        Err(e) => {
            state.metrics.record_store_error("list");
            e.into_response()
        }
    }
}
