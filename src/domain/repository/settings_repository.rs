use async_trait::async_trait;

use crate::domain::entity::autoload_entry::AutoloadRow;

/// SettingsRepository はホストアプリケーションの設定ストアへのアクセスを抽象化するリポジトリトレイト。
/// 各操作は単一ステートメントで完結し、トランザクションやロックは使わない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// autoload 対象のエントリを値のバイト長の降順で最大 limit 件取得する。
    async fn fetch_top_autoloaded(&self, limit: u32) -> anyhow::Result<Vec<AutoloadRow>>;

    /// autoload 対象の全エントリの値のバイト長の合計を返す。対象がなければ 0。
    async fn total_autoload_size(&self) -> anyhow::Result<i64>;

    /// name に一致する行を削除する。行が存在しなかった場合は false を返す。
    async fn delete(&self, name: &str) -> anyhow::Result<bool>;

    /// name に一致する行の autoload を無効にする。変更がなかった場合は false を返す。
    async fn disable_autoload(&self, name: &str) -> anyhow::Result<bool>;
}
