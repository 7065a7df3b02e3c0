use std::sync::LazyLock;

use regex::Regex;
use secrecy::SecretString;
use serde::Deserialize;

use super::database::DatabaseConfig;

/// テーブルプレフィックスは SQL に直接埋め込むため、英数字とアンダースコアのみ許可する。
static TABLE_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{0,32}$").expect("table prefix pattern is valid"));

/// 一覧に表示する件数の上限。
pub const MAX_TOP_LIMIT: u32 = 100;

/// Config はアプリケーション全体の設定を表す。
#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub settings_table: SettingsTableConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

/// AppConfig はアプリケーション基本設定を表す。
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

/// ServerConfig はサーバー設定と一覧画面の配置を表す。
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_admin_path")]
    pub admin_path: String,
    #[serde(default = "default_page_id")]
    pub page_id: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_admin_path() -> String {
    "/admin/tools".to_string()
}

fn default_page_id() -> String {
    "autoload-manager".to_string()
}

/// SettingsTableConfig はホストの options テーブルの配置と autoload フラグ値を表す。
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsTableConfig {
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
    #[serde(default = "default_enabled_values")]
    pub enabled_values: Vec<String>,
    #[serde(default = "default_disabled_value")]
    pub disabled_value: String,
    #[serde(default = "default_top_limit")]
    pub top_limit: u32,
}

impl Default for SettingsTableConfig {
    fn default() -> Self {
        Self {
            table_prefix: default_table_prefix(),
            enabled_values: default_enabled_values(),
            disabled_value: default_disabled_value(),
            top_limit: default_top_limit(),
        }
    }
}

fn default_table_prefix() -> String {
    "wp_".to_string()
}

fn default_enabled_values() -> Vec<String> {
    vec!["yes".to_string()]
}

fn default_disabled_value() -> String {
    "no".to_string()
}

fn default_top_limit() -> u32 {
    20
}

impl SettingsTableConfig {
    /// 検証済みの options テーブル名を返す。
    pub fn table_name(&self) -> anyhow::Result<String> {
        if !TABLE_PREFIX_PATTERN.is_match(&self.table_prefix) {
            anyhow::bail!("invalid table_prefix: {:?}", self.table_prefix);
        }
        Ok(format!("{}options", self.table_prefix))
    }

    /// 起動時に設定値を検証する。
    pub fn validate(&self) -> anyhow::Result<()> {
        self.table_name()?;
        if self.enabled_values.is_empty() {
            anyhow::bail!("settings_table.enabled_values must not be empty");
        }
        if self.enabled_values.contains(&self.disabled_value) {
            anyhow::bail!(
                "settings_table.disabled_value {:?} is also listed as an enabled value",
                self.disabled_value
            );
        }
        if !(1..=MAX_TOP_LIMIT).contains(&self.top_limit) {
            anyhow::bail!(
                "settings_table.top_limit must be within 1..={}, got {}",
                MAX_TOP_LIMIT,
                self.top_limit
            );
        }
        Ok(())
    }
}

/// TokenConfig は確認トークンの署名鍵と有効期間を表す。
/// secret が未設定の場合は起動ごとにランダムな鍵を生成する。
#[derive(Debug, Deserialize)]
pub struct TokenConfig {
    #[serde(default)]
    pub secret: Option<SecretString>,
    #[serde(default = "default_token_lifetime_secs")]
    pub lifetime_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: None,
            lifetime_secs: default_token_lifetime_secs(),
        }
    }
}

fn default_token_lifetime_secs() -> u64 {
    86_400
}

/// AuthConfig は認証プロキシから受け取るヘッダーと必要ロールを表す。
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_user_header")]
    pub user_header: String,
    #[serde(default = "default_roles_header")]
    pub roles_header: String,
    #[serde(default = "default_required_role")]
    pub required_role: String,
}

fn default_user_header() -> String {
    "x-forwarded-user".to_string()
}

fn default_roles_header() -> String {
    "x-forwarded-roles".to_string()
}

fn default_required_role() -> String {
    "manage_options".to_string()
}

/// LogConfig はログ出力形式を表す。"text" 以外は JSON 出力。
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Config {
    /// YAML ファイルから設定を読み込む。
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.settings_table.validate()?;
        if !config.server.admin_path.starts_with('/') {
            anyhow::bail!(
                "server.admin_path must start with '/', got {:?}",
                config.server.admin_path
            );
        }
        Ok(config)
    }

    /// 設定ファイルパスから設定を読み込む。
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// 環境変数で上書きする。ENVIRONMENT と AUTOLOAD_TOKEN_SECRET を参照する。
    /// DATABASE_URL は接続時に main で参照する。
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(env) = lookup("ENVIRONMENT").filter(|v| !v.is_empty()) {
            self.app.environment = env;
        }
        if let Some(secret) = lookup("AUTOLOAD_TOKEN_SECRET").filter(|v| !v.is_empty()) {
            self.token.secret = Some(SecretString::new(secret));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_config_defaults() {
        let yaml = r#"
app:
  name: "k1s0-autoload-server"
server: {}
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.app.version, "0.1.0");
        assert_eq!(config.app.environment, "dev");
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.server.admin_path, "/admin/tools");
        assert_eq!(config.server.page_id, "autoload-manager");
        assert!(config.database.is_none());
        assert!(config.auth.is_none());
        assert_eq!(config.settings_table.table_name().unwrap(), "wp_options");
        assert_eq!(config.settings_table.enabled_values, vec!["yes"]);
        assert_eq!(config.settings_table.disabled_value, "no");
        assert_eq!(config.settings_table.top_limit, 20);
        assert!(config.token.secret.is_none());
        assert_eq!(config.token.lifetime_secs, 86_400);
        assert_eq!(config.log.format, "json");
    }

    #[test]
    fn test_config_full() {
        let yaml = r#"
app:
  name: "k1s0-autoload-server"
  version: "0.2.0"
  environment: "prod"
server:
  host: "127.0.0.1"
  port: 9000
  admin_path: "/wp-admin/tools.php"
  page_id: "autoload"
database:
  host: "mysql.internal"
  port: 3306
  name: "wordpress"
  user: "wp"
  password: "secret"
  max_open_conns: 4
settings_table:
  table_prefix: "site2_"
  enabled_values: ["yes", "on", "auto-on", "auto"]
  disabled_value: "off"
  top_limit: 50
token:
  secret: "0123456789abcdef"
  lifetime_secs: 3600
auth:
  required_role: "administrator"
log:
  format: "text"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.app.environment, "prod");
        assert_eq!(config.server.admin_path, "/wp-admin/tools.php");
        assert_eq!(config.database.as_ref().unwrap().max_open_conns, 4);
        assert_eq!(config.settings_table.table_name().unwrap(), "site2_options");
        assert_eq!(config.settings_table.enabled_values.len(), 4);
        assert_eq!(
            config.token.secret.as_ref().unwrap().expose_secret(),
            "0123456789abcdef"
        );
        let auth = config.auth.unwrap();
        assert_eq!(auth.user_header, "x-forwarded-user");
        assert_eq!(auth.required_role, "administrator");
        assert_eq!(config.log.format, "text");
    }

    #[test]
    fn test_config_rejects_invalid_table_prefix() {
        let yaml = r#"
app:
  name: "k1s0-autoload-server"
server: {}
settings_table:
  table_prefix: "wp_; DROP TABLE x; --"
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_config_rejects_out_of_range_limit() {
        let yaml = r#"
app:
  name: "k1s0-autoload-server"
server: {}
settings_table:
  top_limit: 0
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_config_rejects_disabled_value_in_enabled_values() {
        let yaml = r#"
app:
  name: "k1s0-autoload-server"
server: {}
settings_table:
  enabled_values: ["yes", "no"]
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_config_rejects_relative_admin_path() {
        let yaml = r#"
app:
  name: "k1s0-autoload-server"
server:
  admin_path: "admin/tools"
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let yaml = r#"
app:
  name: "k1s0-autoload-server"
server: {}
"#;
        let mut config = Config::from_yaml(yaml).unwrap();
        config.apply_env_overrides(|key| match key {
            "ENVIRONMENT" => Some("staging".to_string()),
            "AUTOLOAD_TOKEN_SECRET" => Some("from-env".to_string()),
            _ => None,
        });

        assert_eq!(config.app.environment, "staging");
        assert_eq!(
            config.token.secret.as_ref().unwrap().expose_secret(),
            "from-env"
        );
    }

    #[test]
    fn test_apply_env_overrides_ignores_empty_values() {
        let yaml = r#"
app:
  name: "k1s0-autoload-server"
  environment: "prod"
server: {}
"#;
        let mut config = Config::from_yaml(yaml).unwrap();
        config.apply_env_overrides(|_| Some(String::new()));

        assert_eq!(config.app.environment, "prod");
        assert!(config.token.secret.is_none());
    }
}
