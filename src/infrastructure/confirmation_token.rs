use std::sync::Arc;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::config::TokenConfig;
use crate::domain::entity::autoload_action::TokenScope;
use crate::domain::service::ConfirmationTokenService;

type HmacSha256 = Hmac<Sha256>;

/// トークン長（16進文字数）。HMAC-SHA256 の先頭 128 bit を使う。
const TOKEN_HEX_LEN: usize = 32;

/// 現在時刻（UNIX 秒）を返す関数。テストで差し替える。
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// HmacConfirmationTokenService は HMAC-SHA256 による確認トークンの実装。
///
/// 時間を有効期間の半分の tick に区切り、(tick, operator, scope) を署名する。
/// 検証は現在と1つ前の tick を受け付けるため、トークンは有効期間の半分から全体まで有効。
pub struct HmacConfirmationTokenService {
    secret: SecretString,
    tick_secs: i64,
    clock: Clock,
}

impl HmacConfirmationTokenService {
    pub fn new(secret: SecretString, lifetime_secs: u64) -> Self {
        Self::with_clock(
            secret,
            lifetime_secs,
            Arc::new(|| chrono::Utc::now().timestamp()),
        )
    }

    pub fn with_clock(secret: SecretString, lifetime_secs: u64, clock: Clock) -> Self {
        let tick_secs = i64::try_from(lifetime_secs / 2).unwrap_or(i64::MAX).max(1);
        Self {
            secret,
            tick_secs,
            clock,
        }
    }

    /// 設定からサービスを構築する。secret 未設定時はランダムな鍵を生成する。
    pub fn from_config(config: &TokenConfig) -> Self {
        let secret = match config.secret {
            Some(ref s) => SecretString::new(s.expose_secret().clone()),
            None => {
                tracing::warn!(
                    "token.secret is not configured, generating an ephemeral key (links expire on restart)"
                );
                let bytes: [u8; 32] = rand::random();
                SecretString::new(hex::encode(bytes))
            }
        };
        Self::new(secret, config.lifetime_secs)
    }

    fn current_tick(&self) -> i64 {
        (self.clock)().div_euclid(self.tick_secs)
    }

    fn sign(&self, tick: i64, scope: &TokenScope, operator: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(format!("{tick}|{}:{operator}|{}", operator.len(), scope.canonical()).as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());
        digest[..TOKEN_HEX_LEN].to_string()
    }
}

impl ConfirmationTokenService for HmacConfirmationTokenService {
    fn mint(&self, scope: &TokenScope, operator: &str) -> String {
        self.sign(self.current_tick(), scope, operator)
    }

    fn verify(&self, token: &str, scope: &TokenScope, operator: &str) -> bool {
        if token.len() != TOKEN_HEX_LEN {
            return false;
        }
        let tick = self.current_tick();
        [tick, tick - 1].into_iter().any(|t| {
            constant_time_eq(self.sign(t, scope, operator).as_bytes(), token.as_bytes())
        })
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
