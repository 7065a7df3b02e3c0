use std::sync::Arc;

use crate::domain::repository::SettingsRepository;

/// DisableAutoloadError は autoload 無効化に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum DisableAutoloadError {
    #[error("settings store unavailable: {0}")]
    StoreUnavailable(String),
}

/// DisableAutoloadUseCase は設定エントリの autoload を無効にするユースケース。
/// 既に無効なエントリや存在しないエントリに対しても成功する。
pub struct DisableAutoloadUseCase {
    settings_repo: Arc<dyn SettingsRepository>,
}

impl DisableAutoloadUseCase {
    pub fn new(settings_repo: Arc<dyn SettingsRepository>) -> Self {
        Self { settings_repo }
    }

    /// 行が更新された場合は true を返す。
    pub async fn execute(&self, name: &str, disabled_by: &str) -> Result<bool, DisableAutoloadError> {
        let changed = self
            .settings_repo
            .disable_autoload(name)
            .await
            .map_err(|e| DisableAutoloadError::StoreUnavailable(e.to_string()))?;

        if changed {
            tracing::info!(entry_name = %name, operator = %disabled_by, "autoload disabled");
        } else {
            tracing::info!(
                entry_name = %name,
                operator = %disabled_by,
                "autoload already disabled or entry not found"
            );
        }
        Ok(changed)
    }
}
