use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapter::handler::{AppState, ErrorResponse};
use crate::domain::entity::operator::Operator;
use crate::infrastructure::config::AuthConfig;

/// OperatorAuthError はオペレーター認証の失敗理由を表す。
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum OperatorAuthError {
    #[error("operator identity header is missing")]
    MissingOperator,

    #[error("operator {operator} lacks role {required_role}")]
    PermissionDenied {
        operator: String,
        required_role: String,
    },
}

impl IntoResponse for OperatorAuthError {
    fn into_response(self) -> Response {
        match self {
            OperatorAuthError::MissingOperator => {
                let err = ErrorResponse::new(
                    "SYS_AUTH_MISSING_OPERATOR",
                    "Authentication is required. Please sign in through the admin portal.",
                );
                (StatusCode::UNAUTHORIZED, Json(err)).into_response()
            }
            OperatorAuthError::PermissionDenied { required_role, .. } => {
                let err = ErrorResponse::new(
                    "SYS_AUTH_PERMISSION_DENIED",
                    &format!(
                        "Insufficient permissions: role '{}' is required to manage autoloaded options.",
                        required_role
                    ),
                );
                (StatusCode::FORBIDDEN, Json(err)).into_response()
            }
        }
    }
}

/// 認証プロキシが付与したヘッダーからオペレーターを解決する。
pub fn resolve_operator(
    auth: &AuthConfig,
    headers: &HeaderMap,
) -> Result<Operator, OperatorAuthError> {
    let id = headers
        .get(auth.user_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(OperatorAuthError::MissingOperator)?;

    let roles = headers
        .get(auth.roles_header.as_str())
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let operator = Operator::from_header_values(id, roles);
    if !operator.has_role(&auth.required_role) {
        return Err(OperatorAuthError::PermissionDenied {
            operator: operator.id,
            required_role: auth.required_role.clone(),
        });
    }
    Ok(operator)
}

/// operator_middleware はオペレーターを解決して Request extension に格納する axum ミドルウェア。
///
/// auth 設定が無い場合は anonymous を格納する。
/// 識別ヘッダーが無い場合は 401、必要なロールが無い場合は 403 を返す。
pub async fn operator_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let operator = match state.auth.as_deref() {
        None => Operator::anonymous(),
        Some(auth) => match resolve_operator(auth, req.headers()) {
            Ok(operator) => operator,
            Err(e) => {
                tracing::warn!(error = %e, path = %req.uri().path(), "operator rejected");
                return e.into_response();
            }
        },
    };

    req.extensions_mut().insert(operator);
    next.run(req).await
}
