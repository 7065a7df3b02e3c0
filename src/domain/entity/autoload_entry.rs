use serde::{Deserialize, Serialize};

/// SettingEntry はホストアプリケーションの options テーブルの1行を表すドメインエンティティ。
/// name は一意キーで、作成後に変更されることはない。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingEntry {
    pub name: String,
    pub value: String,
    pub autoload: String,
}

impl SettingEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>, autoload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            autoload: autoload.into(),
        }
    }

    /// 値のバイト長を返す。値の中身は解釈しない。
    pub fn value_size(&self) -> i64 {
        i64::try_from(self.value.len()).unwrap_or(i64::MAX)
    }

    /// autoload フラグが有効値のいずれかに一致するかを判定する。
    pub fn is_autoloaded(&self, enabled_values: &[String]) -> bool {
        enabled_values.iter().any(|v| v == &self.autoload)
    }
}

/// AutoloadRow は一覧表示用の (name, size) の組。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoloadRow {
    pub name: String,
    pub size: i64,
}

/// AutoloadListing はサイズ上位の autoload エントリと autoload 全体の合計サイズを表す。
/// total_size は上位 N 件ではなく、autoload 対象の全エントリの合計。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoloadListing {
    pub rows: Vec<AutoloadRow>,
    pub total_size: i64,
}
