use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};

use crate::domain::entity::autoload_entry::AutoloadRow;
use crate::domain::repository::SettingsRepository;
use crate::infrastructure::config::SettingsTableConfig;

/// SettingsMySqlRepository は SettingsRepository の MySQL 実装。
/// ホストアプリケーションの `<prefix>options` テーブルを直接参照する。
pub struct SettingsMySqlRepository {
    pool: MySqlPool,
    table: String,
    enabled_values: Vec<String>,
    disabled_value: String,
}

impl SettingsMySqlRepository {
    /// テーブル名は設定のプレフィックス検証を通したものだけを使う。
    pub fn new(pool: MySqlPool, config: &SettingsTableConfig) -> anyhow::Result<Self> {
        Ok(Self {
            pool,
            table: config.table_name()?,
            enabled_values: config.enabled_values.clone(),
            disabled_value: config.disabled_value.clone(),
        })
    }

    /// テストやマイグレーション用にプールへの参照を返す。
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// `autoload IN (?, ?, ...)` 句を追加する。
    fn push_autoload_filter(&self, builder: &mut QueryBuilder<'_, MySql>) {
        builder.push(" WHERE autoload IN (");
        let mut separated = builder.separated(", ");
        for value in &self.enabled_values {
            separated.push_bind(value.clone());
        }
        separated.push_unseparated(")");
    }
}

#[async_trait]
impl SettingsRepository for SettingsMySqlRepository {
    async fn fetch_top_autoloaded(&self, limit: u32) -> anyhow::Result<Vec<AutoloadRow>> {
        let mut builder = QueryBuilder::<MySql>::new(format!(
            "SELECT option_name, CAST(LENGTH(option_value) AS SIGNED) AS option_size FROM `{}`",
            self.table
        ));
        self.push_autoload_filter(&mut builder);
        builder.push(" ORDER BY option_size DESC LIMIT ");
        builder.push_bind(limit);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| -> anyhow::Result<AutoloadRow> {
                Ok(AutoloadRow {
                    name: row.try_get("option_name")?,
                    size: row.try_get("option_size")?,
                })
            })
            .collect()
    }

    async fn total_autoload_size(&self) -> anyhow::Result<i64> {
        let mut builder = QueryBuilder::<MySql>::new(format!(
            "SELECT CAST(COALESCE(SUM(LENGTH(option_value)), 0) AS SIGNED) AS total_size FROM `{}`",
            self.table
        ));
        self.push_autoload_filter(&mut builder);

        let row = builder.build().fetch_one(&self.pool).await?;
        Ok(row.try_get("total_size")?)
    }

    async fn delete(&self, name: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM `{}` WHERE option_name = ?",
            self.table
        ))
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn disable_autoload(&self, name: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(&format!(
            "UPDATE `{}` SET autoload = ? WHERE option_name = ?",
            self.table
        ))
        .bind(&self.disabled_value)
        .bind(name)
        .execute(&self.pool)
        .await?;

        // MySQL は値が変化しない UPDATE の影響行数を 0 と報告する
        Ok(result.rows_affected() > 0)
    }
}
