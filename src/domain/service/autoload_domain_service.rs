/// ホストの options.option_name カラム幅（バイト）。
pub const MAX_ENTRY_NAME_BYTES: usize = 191;

/// サイズ表示の単位換算（1 KB = 1024 B、1 MB = 1024 KB）。
pub const BYTES_PER_UNIT: f64 = 1024.0;

/// DomainError はドメイン層のバリデーションエラーを表す。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("entry name must not be empty")]
    EmptyEntryName,

    #[error("entry name exceeds {max} bytes: {actual}")]
    EntryNameTooLong { max: usize, actual: usize },
}

/// AutoloadDomainService はエントリ名のサニタイズ・検証とサイズ表示のルールを提供する。
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoloadDomainService;

impl AutoloadDomainService {
    pub fn new() -> Self {
        Self
    }

    /// エントリ名をサニタイズする。
    ///
    /// `<...>` のタグ列を取り除き、制御文字とマークアップ上意味を持つ文字
    /// (`< > " ' & \``) を落として前後の空白を除去する。
    /// 閉じられていない `<` 以降は全てタグとして扱う。
    /// トークン発行・検証・更新対象の全てにこの結果を使う。
    pub fn sanitize_entry_name(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut in_tag = false;
        for c in raw.chars() {
            if in_tag {
                if c == '>' {
                    in_tag = false;
                }
                continue;
            }
            match c {
                '<' => in_tag = true,
                '>' | '"' | '\'' | '&' | '`' => {}
                c if c.is_control() => {}
                c => out.push(c),
            }
        }
        out.trim().to_string()
    }

    /// サニタイズ済みのエントリ名を検証する。
    pub fn validate_entry_name(&self, name: &str) -> Result<(), DomainError> {
        if name.is_empty() {
            return Err(DomainError::EmptyEntryName);
        }
        if name.len() > MAX_ENTRY_NAME_BYTES {
            return Err(DomainError::EntryNameTooLong {
                max: MAX_ENTRY_NAME_BYTES,
                actual: name.len(),
            });
        }
        Ok(())
    }

    /// エントリのサイズを表示用に整形する。
    ///
    /// KB = bytes / 1024 を小数第2位で丸め、1024 KB 未満なら `<kb> KB`、
    /// それ以外は KB / 1024 を小数第2位で丸めて `<mb> MB` とする。
    pub fn format_entry_size(&self, bytes: i64) -> String {
        #[allow(clippy::cast_precision_loss)]
        let kilobytes = round2(bytes as f64 / BYTES_PER_UNIT);
        if kilobytes < BYTES_PER_UNIT {
            format!("{kilobytes:.2} KB")
        } else {
            format!("{:.2} MB", round2(kilobytes / BYTES_PER_UNIT))
        }
    }

    /// autoload 合計サイズを MB 単位（小数第2位で丸め）で整形する。
    pub fn format_total_megabytes(&self, bytes: i64) -> String {
        #[allow(clippy::cast_precision_loss)]
        let megabytes = round2(bytes as f64 / BYTES_PER_UNIT / BYTES_PER_UNIT);
        format!("{megabytes:.2}")
    }
}

/// 小数第2位で丸める（0.5 は 0 から遠い方向）。
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
