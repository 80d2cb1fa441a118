//! 文本过滤器与字段格式化
//!
//! `[gac]`（以及任意 `[gac|...]`）替换为当前路径的浏览量，
//! `[gac|all]` 替换为整个站点的总浏览量，尚无数据时显示 `N/A`。

use std::sync::LazyLock;

use regex::Regex;

use super::format::format_number;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[gac[^\]]*\]").expect("valid token pattern"));

pub const ALL_TOKEN: &str = "[gac|all]";

/// 文本中的 token 种类
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub path: bool,
    pub all: bool,
}

pub fn scan_tokens(text: &str) -> TokenUsage {
    let mut usage = TokenUsage::default();
    for m in TOKEN_RE.find_iter(text) {
        if m.as_str() == ALL_TOKEN {
            usage.all = true;
        } else {
            usage.path = true;
        }
    }
    usage
}

/// 替换文本中的全部 token
pub fn render_tokens(text: &str, path_count: &str, total_pageviews: Option<i64>) -> String {
    let all = total_pageviews
        .map(format_number)
        .unwrap_or_else(|| "N/A".to_string());
    TOKEN_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            if &caps[0] == ALL_TOKEN {
                all.clone()
            } else {
                path_count.to_string()
            }
        })
        .into_owned()
}

/// 计数字段的 HTML 片段
pub fn format_item_total(total: Option<i64>) -> String {
    format!("<p>{}</p>", total.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_tokens() {
        assert_eq!(scan_tokens("no tokens"), TokenUsage::default());
        assert_eq!(
            scan_tokens("[gac] and [gac|all]"),
            TokenUsage {
                path: true,
                all: true
            }
        );
        assert!(scan_tokens("[gac|/some/path]").path);
    }

    #[test]
    fn test_render_tokens() {
        let out = render_tokens("Views: [gac], site: [gac|all].", "1,234", Some(98765));
        assert_eq!(out, "Views: 1,234, site: 98,765.");
    }

    #[test]
    fn test_render_all_without_data() {
        assert_eq!(render_tokens("[gac|all]", "0", None), "N/A");
    }

    #[test]
    fn test_format_item_total() {
        assert_eq!(format_item_total(Some(1500)), "<p>1500</p>");
        assert_eq!(format_item_total(None), "<p>0</p>");
    }
}
