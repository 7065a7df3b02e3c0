/// Operator は一覧画面にアクセスしている管理者を表す。
/// 認証はフロントの認証プロキシが行い、本サービスはヘッダーから識別子とロールを受け取る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub id: String,
    pub roles: Vec<String>,
}

/// 認証未設定（dev モード）時のオペレーター識別子。
pub const ANONYMOUS_OPERATOR: &str = "anonymous";

impl Operator {
    pub fn new(id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            id: id.into(),
            roles,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_OPERATOR, vec![])
    }

    /// カンマ区切りのロールヘッダー値からオペレーターを構築する。
    pub fn from_header_values(id: &str, roles_header: &str) -> Self {
        let roles = roles_header
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(ToString::to_string)
            .collect();
        Self::new(id.trim(), roles)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
