use crate::domain::entity::autoload_action::TokenScope;

/// ConfirmationTokenService は CSRF 対策の確認トークンを発行・検証するサービストレイト。
/// 発行済みトークンは保持せず、検証は署名の再計算のみで行う。
#[cfg_attr(test, mockall::automock)]
pub trait ConfirmationTokenService: Send + Sync {
    /// scope と operator に束縛されたトークンを発行する。
    fn mint(&self, scope: &TokenScope, operator: &str) -> String;

    /// token が scope と operator に対して有効かを検証する。
    fn verify(&self, token: &str, scope: &TokenScope, operator: &str) -> bool;
}
