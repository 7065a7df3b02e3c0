use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::{ErrorDetail, ErrorResponse};
use crate::usecase::handle_autoload_action::HandleAutoloadActionError;
use crate::usecase::list_autoloads::ListAutoloadsError;

/// トークン不一致時にオペレーターへ返すメッセージ。
pub const TOKEN_INVALID_MESSAGE: &str = "The link you followed has expired or is invalid.";

const STORE_UNAVAILABLE_MESSAGE: &str =
    "The settings store is temporarily unavailable. Please try again later.";

fn store_unavailable(detail: &str) -> Response {
    // 詳細はログのみに出し、レスポンスには含めない
    tracing::error!(error = %detail, "settings store unavailable");
    let err = ErrorResponse::new("SYS_AUTOLOAD_STORE_UNAVAILABLE", STORE_UNAVAILABLE_MESSAGE);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
}

/// ListAutoloadsError を HTTP レスポンスに変換する。
impl IntoResponse for ListAutoloadsError {
    fn into_response(self) -> Response {
        match self {
            ListAutoloadsError::StoreUnavailable(msg) => store_unavailable(&msg),
        }
    }
}

/// HandleAutoloadActionError を HTTP レスポンスに変換する。
impl IntoResponse for HandleAutoloadActionError {
    fn into_response(self) -> Response {
        match self {
            HandleAutoloadActionError::TokenInvalid { .. } => {
                let err = ErrorResponse::with_details(
                    "SYS_AUTOLOAD_TOKEN_INVALID",
                    TOKEN_INVALID_MESSAGE,
                    vec![ErrorDetail {
                        field: "_wpnonce".to_string(),
                        message: "confirmation token does not match the requested action"
                            .to_string(),
                    }],
                );
                (StatusCode::FORBIDDEN, Json(err)).into_response()
            }
            HandleAutoloadActionError::StoreUnavailable(msg) => store_unavailable(&msg),
        }
    }
}

/// ページ識別子が一致しないリクエストへのレスポンス。
pub fn page_not_found(page: Option<&str>) -> Response {
    let err = ErrorResponse::new(
        "SYS_AUTOLOAD_PAGE_NOT_FOUND",
        &format!("page not found: {}", page.unwrap_or("")),
    );
    (StatusCode::NOT_FOUND, Json(err)).into_response()
}
