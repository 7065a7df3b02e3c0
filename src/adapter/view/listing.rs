use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::domain::entity::autoload_action::{AutoloadAction, TokenScope};
use crate::domain::entity::autoload_entry::AutoloadListing;
use crate::domain::service::{AutoloadDomainService, ConfirmationTokenService};

/// AdminPage は一覧画面の配置（パスとページ識別子）を表す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPage {
    pub path: String,
    pub page_id: String,
}

impl AdminPage {
    pub fn new(path: impl Into<String>, page_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            page_id: page_id.into(),
        }
    }

    /// 一覧画面の URL。操作後のリダイレクト先にもなる。
    pub fn listing_url(&self) -> String {
        format!("{}?page={}", self.path, urlencoding::encode(&self.page_id))
    }

    /// 操作リンクの URL。クエリ値は全て URL エンコードする。
    pub fn action_url(&self, action: AutoloadAction, entry_name: &str, token: &str) -> String {
        format!(
            "{}&action={}&option_name={}&_wpnonce={}",
            self.listing_url(),
            action.as_str(),
            urlencoding::encode(entry_name),
            urlencoding::encode(token),
        )
    }
}

/// 一覧画面の HTML を生成する。
///
/// 操作リンクは、サニタイズしても名前が変わらず検証を通るエントリにだけ出す。
/// それ以外のエントリは操作欄を空にする。
pub fn render_listing(
    listing: &AutoloadListing,
    page: &AdminPage,
    tokens: &dyn ConfirmationTokenService,
    operator: &str,
) -> String {
    let svc = AutoloadDomainService::new();

    let mut body = String::new();
    if listing.rows.is_empty() {
        body.push_str("      <tr><td colspan=\"3\">No autoloaded options found.</td></tr>\n");
    }
    for row in &listing.rows {
        let mut actions = Vec::with_capacity(AutoloadAction::ALL.len());
        if is_operable(&svc, &row.name) {
            for action in AutoloadAction::ALL {
                let token = tokens.mint(&TokenScope::new(action, row.name.as_str()), operator);
                let href = page.action_url(action, &row.name, &token);
                actions.push(format!(
                    "<a class=\"autoload-{}\" href=\"{}\">{}</a>",
                    action.as_str(),
                    encode_double_quoted_attribute(&href),
                    encode_text(action.label()),
                ));
            }
        }
        body.push_str(&format!(
            "      <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            encode_text(&row.name),
            encode_text(&svc.format_entry_size(row.size)),
            actions.join(" | "),
        ));
    }

    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
  <meta charset=\"utf-8\">
  <title>Autoload Manager</title>
</head>
<body>
  <h1>Autoload Manager</h1>
  <p>Total autoloaded size: {total} MB</p>
  <table>
    <thead>
      <tr><th>Option Name</th><th>Size</th><th>Actions</th></tr>
    </thead>
    <tbody>
{body}    </tbody>
  </table>
</body>
</html>
",
        total = encode_text(&svc.format_total_megabytes(listing.total_size)),
    )
}

/// Act が受け取ったときに同じ行を指す名前かどうか。
fn is_operable(svc: &AutoloadDomainService, name: &str) -> bool {
    svc.sanitize_entry_name(name) == name && svc.validate_entry_name(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::autoload_entry::AutoloadRow;
    use crate::domain::service::confirmation_token::MockConfirmationTokenService;

    fn page() -> AdminPage {
        AdminPage::new("/admin/tools", "autoload-manager")
    }

    fn row(name: &str, size: i64) -> AutoloadRow {
        AutoloadRow {
            name: name.to_string(),
            size,
        }
    }

    /// スコープの表示形式をそのままトークンにするモック。
    fn echo_tokens() -> MockConfirmationTokenService {
        let mut tokens = MockConfirmationTokenService::new();
        tokens
            .expect_mint()
            .returning(|scope, operator| format!("{operator}:{scope}"));
        tokens
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(page().listing_url(), "/admin/tools?page=autoload-manager");
    }

    #[test]
    fn test_action_url_encodes_values() {
        let url = page().action_url(AutoloadAction::Delete, "a b&c", "t/1");
        assert_eq!(
            url,
            "/admin/tools?page=autoload-manager&action=delete&option_name=a%20b%26c&_wpnonce=t%2F1"
        );
    }

    #[test]
    fn test_render_listing_rows_and_total() {
        let listing = AutoloadListing {
            rows: vec![row("C", 9000), row("A", 5000)],
            total_size: 14_000,
        };
        let html = render_listing(&listing, &page(), &echo_tokens(), "admin");

        assert!(html.contains("Total autoloaded size: 0.01 MB"));
        assert!(html.contains("<td>C</td><td>8.79 KB</td>"));
        assert!(html.contains("<td>A</td><td>4.88 KB</td>"));
        assert!(html.find("<td>C</td>") < html.find("<td>A</td>"));
        assert!(html.contains(
            "href=\"/admin/tools?page=autoload-manager&amp;action=delete&amp;option_name=C&amp;_wpnonce=admin%3Adelete_autoload_C\""
        ));
        assert!(html.contains(
            "href=\"/admin/tools?page=autoload-manager&amp;action=disable&amp;option_name=A&amp;_wpnonce=admin%3Adisable_autoload_A\""
        ));
        assert!(html.contains(">Disable Autoload</a>"));
    }

    #[test]
    fn test_render_listing_escapes_entry_names() {
        let listing = AutoloadListing {
            rows: vec![row("<script>alert(1)</script>", 10)],
            total_size: 10,
        };
        let html = render_listing(&listing, &page(), &echo_tokens(), "admin");

        assert!(!html.contains("<script>"));
        assert!(html.contains(
            "<td>&lt;script&gt;alert(1)&lt;/script&gt;</td><td>0.01 KB</td><td></td>"
        ));
        assert!(!html.contains("option_name="));
    }

    #[test]
    fn test_render_listing_skips_links_when_sanitize_changes_name() {
        let mut tokens = MockConfirmationTokenService::new();
        tokens
            .expect_mint()
            .withf(|scope, _| scope.entry_name == "widget")
            .times(AutoloadAction::ALL.len())
            .returning(|scope, operator| format!("{operator}:{scope}"));

        let listing = AutoloadListing {
            rows: vec![
                row("<i>widget</i>", 50),
                row("widget", 20),
                row(" widget\n", 5),
            ],
            total_size: 75,
        };
        let html = render_listing(&listing, &page(), &tokens, "admin");

        assert!(html.contains("<td>&lt;i&gt;widget&lt;/i&gt;</td><td>0.05 KB</td><td></td>"));
        assert!(html.contains("<td> widget\n</td><td>0.00 KB</td><td></td>"));
        assert_eq!(
            html.matches("option_name=widget&amp;").count(),
            AutoloadAction::ALL.len()
        );
    }

    #[test]
    fn test_render_listing_without_actionable_name() {
        let mut tokens = MockConfirmationTokenService::new();
        tokens.expect_mint().never();

        let listing = AutoloadListing {
            rows: vec![row("<b></b>", 10)],
            total_size: 10,
        };
        let html = render_listing(&listing, &page(), &tokens, "admin");
        assert!(html.contains("<td>&lt;b&gt;&lt;/b&gt;</td><td>0.01 KB</td><td></td>"));
    }

    #[test]
    fn test_render_listing_empty() {
        let listing = AutoloadListing {
            rows: vec![],
            total_size: 0,
        };
        let html = render_listing(&listing, &page(), &echo_tokens(), "admin");

        assert!(html.contains("No autoloaded options found."));
        assert!(html.contains("Total autoloaded size: 0.00 MB"));
    }
}
