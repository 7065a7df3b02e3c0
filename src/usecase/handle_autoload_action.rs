use std::sync::Arc;

use serde::Deserialize;

use crate::domain::entity::autoload_action::{ActionRequest, AutoloadAction, UnknownActionError};
use crate::domain::repository::SettingsRepository;
use crate::domain::service::autoload_domain_service::DomainError;
use crate::domain::service::{AutoloadDomainService, ConfirmationTokenService};
use crate::usecase::delete_autoload::{DeleteAutoloadError, DeleteAutoloadUseCase};
use crate::usecase::disable_autoload::{DisableAutoloadError, DisableAutoloadUseCase};

/// ActionQuery は一覧画面へのリクエストのクエリパラメータ。
/// 値は全て未検証の文字列として受け取る。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionQuery {
    pub page: Option<String>,
    pub action: Option<String>,
    pub option_name: Option<String>,
    #[serde(rename = "_wpnonce")]
    pub nonce: Option<String>,
}

/// MalformedReason は操作リクエストとして扱えない理由を表す。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    #[error(transparent)]
    UnknownAction(#[from] UnknownActionError),

    #[error("invalid entry name: {0}")]
    InvalidEntryName(#[from] DomainError),
}

/// ActionOutcome は Act 処理の結果を表す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// action / option_name / _wpnonce のいずれかが無い。通常の一覧表示に進む。
    NotAnAction,
    /// 値が不正なため何も変更していない。通常の一覧表示に進む。
    Malformed(MalformedReason),
    /// 変更を適用した。changed は実際に行が変化したかどうか。
    Applied {
        action: AutoloadAction,
        entry_name: String,
        changed: bool,
    },
}

/// HandleAutoloadActionError は Act 処理の中断理由を表す。
#[derive(Debug, thiserror::Error)]
pub enum HandleAutoloadActionError {
    #[error("confirmation token invalid for scope {scope}")]
    TokenInvalid { scope: String },

    #[error("settings store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<DeleteAutoloadError> for HandleAutoloadActionError {
    fn from(e: DeleteAutoloadError) -> Self {
        match e {
            DeleteAutoloadError::StoreUnavailable(msg) => Self::StoreUnavailable(msg),
        }
    }
}

impl From<DisableAutoloadError> for HandleAutoloadActionError {
    fn from(e: DisableAutoloadError) -> Self {
        match e {
            DisableAutoloadError::StoreUnavailable(msg) => Self::StoreUnavailable(msg),
        }
    }
}

/// HandleAutoloadActionUseCase は一覧画面からの delete / disable リクエストを処理するユースケース。
///
/// 処理順: フィールド有無の確認 → action の解釈 → エントリ名のサニタイズと検証
/// → トークン検証 → 更新。トークン発行・検証・更新対象は全てサニタイズ後の名前を使う。
pub struct HandleAutoloadActionUseCase {
    delete_uc: DeleteAutoloadUseCase,
    disable_uc: DisableAutoloadUseCase,
    token_service: Arc<dyn ConfirmationTokenService>,
    domain_service: AutoloadDomainService,
}

impl HandleAutoloadActionUseCase {
    pub fn new(
        settings_repo: Arc<dyn SettingsRepository>,
        token_service: Arc<dyn ConfirmationTokenService>,
    ) -> Self {
        Self {
            delete_uc: DeleteAutoloadUseCase::new(settings_repo.clone()),
            disable_uc: DisableAutoloadUseCase::new(settings_repo),
            token_service,
            domain_service: AutoloadDomainService::new(),
        }
    }

    /// クエリから操作リクエストを組み立てる。
    /// 必要なフィールドが揃っていなければ Ok(None) を返す。
    pub fn parse(&self, query: &ActionQuery) -> Result<Option<ActionRequest>, MalformedReason> {
        let (Some(action), Some(raw_name), Some(token)) = (
            non_empty(query.action.as_deref()),
            non_empty(query.option_name.as_deref()),
            non_empty(query.nonce.as_deref()),
        ) else {
            return Ok(None);
        };

        let action: AutoloadAction = action.parse()?;
        let entry_name = self.domain_service.sanitize_entry_name(raw_name);
        self.domain_service.validate_entry_name(&entry_name)?;

        Ok(Some(ActionRequest {
            action,
            entry_name,
            token: token.to_string(),
        }))
    }

    pub async fn execute(
        &self,
        query: &ActionQuery,
        operator: &str,
    ) -> Result<ActionOutcome, HandleAutoloadActionError> {
        let request = match self.parse(query) {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(ActionOutcome::NotAnAction),
            Err(reason) => {
                tracing::warn!(
                    operator = %operator,
                    reason = %reason,
                    "ignoring malformed autoload action request"
                );
                return Ok(ActionOutcome::Malformed(reason));
            }
        };

        let scope = request.scope();
        if !self.token_service.verify(&request.token, &scope, operator) {
            tracing::warn!(
                operator = %operator,
                scope = %scope,
                "confirmation token rejected"
            );
            return Err(HandleAutoloadActionError::TokenInvalid {
                scope: scope.to_string(),
            });
        }

        let changed = match request.action {
            AutoloadAction::Delete => self.delete_uc.execute(&request.entry_name, operator).await?,
            AutoloadAction::Disable => {
                self.disable_uc
                    .execute(&request.entry_name, operator)
                    .await?
            }
        };

        Ok(ActionOutcome::Applied {
            action: request.action,
            entry_name: request.entry_name,
            changed,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
