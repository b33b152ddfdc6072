// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Source name used when a record has neither an explicit source nor a host.
pub const UNKNOWN_SOURCE: &str = "未知来源";

/// Registrable-domain labels with friendly display names.
const SOURCE_NAMES: &[(&str, &str)] = &[
    ("zhihu", "知乎"),
    ("weibo", "微博"),
    ("baidu", "百度"),
    ("douyin", "抖音"),
    ("toutiao", "今日头条"),
    ("bilibili", "B站"),
    ("wallstreetcn", "华尔街见闻"),
    ("thepaper", "澎湃新闻"),
    ("github", "GitHub"),
    ("coolapk", "酷安"),
];

/// Generic second-level labels skipped when picking the site label (`x.com.cn`).
const GENERIC_SLDS: &[&str] = &["com", "net", "org", "gov", "edu"];

/// Resolve a potentially relative link against the page's base URL.
///
/// Absolute links are returned unchanged; unparsable input is returned as-is.
///
/// # Examples
/// ```
/// use news_crawler::utils::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/c/hottest").unwrap();
/// assert_eq!(resolve(&base, "/item/1"), "https://example.com/item/1");
/// ```
pub fn resolve(base: &Url, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extract the lowercase host from a URL.
pub fn get_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_lowercase()))
        .filter(|host| !host.is_empty())
}

/// Label that identifies the site within a host (`www.zhihu.com` → `zhihu`).
fn site_label(host: &str) -> Option<&str> {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() < 2 {
        return None;
    }
    let second = parts[parts.len() - 2];
    if GENERIC_SLDS.contains(&second) && parts.len() > 2 {
        Some(parts[parts.len() - 3])
    } else {
        Some(second)
    }
}

/// Derive a display source from a link.
///
/// Known sites map to their friendly name; other hosts are returned verbatim;
/// a missing or hostless link yields [`UNKNOWN_SOURCE`].
pub fn source_from_link(link: &str) -> String {
    let Some(host) = get_domain(link) else {
        return UNKNOWN_SOURCE.to_string();
    };

    site_label(&host)
        .and_then(|label| {
            SOURCE_NAMES
                .iter()
                .find(|(key, _)| *key == label)
                .map(|(_, name)| name.to_string())
        })
        .unwrap_or(host)
}
