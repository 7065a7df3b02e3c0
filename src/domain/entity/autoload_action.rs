use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// AutoloadAction はオペレーターが一覧画面から実行できる操作を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoloadAction {
    /// 行を削除する。
    Delete,
    /// autoload フラグを無効値に更新する。
    Disable,
}

impl AutoloadAction {
    pub const ALL: [AutoloadAction; 2] = [AutoloadAction::Delete, AutoloadAction::Disable];

    pub fn as_str(self) -> &'static str {
        match self {
            AutoloadAction::Delete => "delete",
            AutoloadAction::Disable => "disable",
        }
    }

    /// 一覧画面のボタン表示名。
    pub fn label(self) -> &'static str {
        match self {
            AutoloadAction::Delete => "Delete",
            AutoloadAction::Disable => "Disable Autoload",
        }
    }
}

impl fmt::Display for AutoloadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UnknownActionError は delete / disable 以外の action 値を表す。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown autoload action: {0}")]
pub struct UnknownActionError(pub String);

impl FromStr for AutoloadAction {
    type Err = UnknownActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(AutoloadAction::Delete),
            "disable" => Ok(AutoloadAction::Disable),
            other => Err(UnknownActionError(other.to_string())),
        }
    }
}

/// ActionRequest は検証済みの操作リクエスト。1 回の Act 処理の間だけ存在し、永続化しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: AutoloadAction,
    pub entry_name: String,
    pub token: String,
}

impl ActionRequest {
    pub fn scope(&self) -> TokenScope {
        TokenScope::new(self.action, self.entry_name.clone())
    }
}

/// TokenScope は確認トークンのスコープ (action, entry name) を表す。
///
/// 署名対象は `canonical()` の JSON 配列表現で、entry name に `_autoload_` などの
/// 部分文字列が含まれていても別の (action, name) の組と衝突しない。
/// `Display` は `<action>_autoload_<name>` 形式でログ出力専用。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenScope {
    pub action: AutoloadAction,
    pub entry_name: String,
}

impl TokenScope {
    pub fn new(action: AutoloadAction, entry_name: impl Into<String>) -> Self {
        Self {
            action,
            entry_name: entry_name.into(),
        }
    }

    /// 署名に使う正規化表現を返す。
    pub fn canonical(&self) -> String {
        serde_json::json!([self.action.as_str(), self.entry_name]).to_string()
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_autoload_{}", self.action, self.entry_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_str() {
        assert_eq!("delete".parse::<AutoloadAction>(), Ok(AutoloadAction::Delete));
        assert_eq!("disable".parse::<AutoloadAction>(), Ok(AutoloadAction::Disable));
        assert_eq!(
            "purge".parse::<AutoloadAction>(),
            Err(UnknownActionError("purge".to_string()))
        );
        // 大文字小文字は区別する
        assert!("DELETE".parse::<AutoloadAction>().is_err());
    }

    #[test]
    fn test_action_display_roundtrip() {
        for action in AutoloadAction::ALL {
            assert_eq!(action.to_string().parse::<AutoloadAction>(), Ok(action));
        }
    }

    #[test]
    fn test_scope_display() {
        let scope = TokenScope::new(AutoloadAction::Delete, "C");
        assert_eq!(scope.to_string(), "delete_autoload_C");
    }

    #[test]
    fn test_scope_canonical_is_json_array() {
        let scope = TokenScope::new(AutoloadAction::Disable, "widget_\"text\"");
        let parsed: Vec<String> = serde_json::from_str(&scope.canonical()).unwrap();
        assert_eq!(parsed, vec!["disable".to_string(), "widget_\"text\"".to_string()]);
    }

    #[test]
    fn test_scope_canonical_does_not_collide_on_separator() {
        // 単純連結では "delete" + "_autoload_" + "x_autoload_y" のように区切り文字が曖昧になる
        let a = TokenScope::new(AutoloadAction::Delete, "x_autoload_y");
        let b = TokenScope::new(AutoloadAction::Disable, "x_autoload_y");
        assert_ne!(a.canonical(), b.canonical());

        let c = TokenScope::new(AutoloadAction::Delete, "a\",\"b");
        let d = TokenScope::new(AutoloadAction::Delete, "a");
        assert_ne!(c.canonical(), d.canonical());
    }

    #[test]
    fn test_action_request_scope() {
        let req = ActionRequest {
            action: AutoloadAction::Delete,
            entry_name: "C".to_string(),
            token: "abc".to_string(),
        };
        assert_eq!(req.scope(), TokenScope::new(AutoloadAction::Delete, "C"));
    }
}
