use std::sync::Arc;

use crate::domain::repository::SettingsRepository;

/// DeleteAutoloadError は設定エントリ削除に関するエラーを表す。
/// 対象が存在しないことはエラーではない。
#[derive(Debug, thiserror::Error)]
pub enum DeleteAutoloadError {
    #[error("settings store unavailable: {0}")]
    StoreUnavailable(String),
}

/// DeleteAutoloadUseCase は設定エントリ削除ユースケース。
pub struct DeleteAutoloadUseCase {
    settings_repo: Arc<dyn SettingsRepository>,
}

impl DeleteAutoloadUseCase {
    pub fn new(settings_repo: Arc<dyn SettingsRepository>) -> Self {
        Self { settings_repo }
    }

    /// name に一致する行を削除する。行が削除された場合は true を返す。
    /// deleted_by は操作したオペレーター（ログ用）。
    pub async fn execute(&self, name: &str, deleted_by: &str) -> Result<bool, DeleteAutoloadError> {
        let deleted = self
            .settings_repo
            .delete(name)
            .await
            .map_err(|e| DeleteAutoloadError::StoreUnavailable(e.to_string()))?;

        if deleted {
            tracing::info!(entry_name = %name, operator = %deleted_by, "autoload entry deleted");
        } else {
            tracing::info!(
                entry_name = %name,
                operator = %deleted_by,
                "autoload entry not found, nothing deleted"
            );
        }
        Ok(deleted)
    }
}
