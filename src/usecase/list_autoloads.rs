use std::sync::Arc;

use crate::domain::entity::autoload_entry::AutoloadListing;
use crate::domain::repository::SettingsRepository;

/// ListAutoloadsError は autoload 一覧取得に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum ListAutoloadsError {
    #[error("settings store unavailable: {0}")]
    StoreUnavailable(String),
}

/// ListAutoloadsUseCase はサイズ上位の autoload エントリと合計サイズを取得するユースケース。
/// 毎回ストアに問い合わせ、結果はキャッシュしない。
pub struct ListAutoloadsUseCase {
    settings_repo: Arc<dyn SettingsRepository>,
    limit: u32,
}

impl ListAutoloadsUseCase {
    pub fn new(settings_repo: Arc<dyn SettingsRepository>, limit: u32) -> Self {
        Self {
            settings_repo,
            limit,
        }
    }

    pub async fn execute(&self) -> Result<AutoloadListing, ListAutoloadsError> {
        let mut rows = self
            .settings_repo
            .fetch_top_autoloaded(self.limit)
            .await
            .map_err(|e| ListAutoloadsError::StoreUnavailable(e.to_string()))?;

        // 安定ソートのため同サイズはストアの返却順を保つ
        rows.sort_by(|a, b| b.size.cmp(&a.size));
        rows.truncate(self.limit as usize);

        let total_size = self
            .settings_repo
            .total_autoload_size()
            .await
            .map_err(|e| ListAutoloadsError::StoreUnavailable(e.to_string()))?;

        Ok(AutoloadListing { rows, total_size })
    }
}
