//! Document analyzer - fetch a web page and extract its readable content

use super::html::{decode_entities, remove_tags, strip_html_tags, truncate_chars};
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolCategory, ToolDefinition};
use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

// ============================================================================
// Constants
// ============================================================================

/// Default fetch timeout in seconds
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Characters of main text kept in the result
const MAX_CONTENT_CHARS: usize = 2000;

/// Browser-like User-Agent; some sites refuse unknown clients
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Hosts never fetched unless private hosts are allowed
const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "metadata.google.internal",
    "metadata.internal",
];

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title regex"));

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("meta regex"));

static META_NAME_DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bname\s*=\s*["']description["']"#).expect("meta name regex")
});

static META_CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("meta content regex")
});

/// Elements whose content never counts as page text. The regex crate has no
/// backreferences, so each element gets its own pattern.
static NOISE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "nav", "header", "footer"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).expect("noise regex")
        })
        .collect()
});

/// Containers tried in order for the main text.
static CONTAINER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["main", "article", "body"]
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}\s*>")).expect("container regex"))
        .collect()
});

static BLOCK_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|h[1-6]|tr|section|blockquote|pre)\s*>")
        .expect("block regex")
});

// ============================================================================
// Config
// ============================================================================

/// Document analyzer settings
#[derive(Debug, Clone)]
pub struct DocumentAnalyzerConfig {
    /// Fetch timeout
    pub timeout: Duration,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Permit loopback, private and link-local targets
    pub allow_private_hosts: bool,
}

impl Default for DocumentAnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            allow_private_hosts: false,
        }
    }
}

// ============================================================================
// Tool
// ============================================================================

/// Fetches a URL and returns `{url, title, description, content, content_length, has_content}`.
///
/// Fetch or validation failures produce `{url, error, has_content: false}`.
pub struct DocumentAnalyzerTool {
    definition: ToolDefinition,
    client: reqwest::Client,
    config: DocumentAnalyzerConfig,
}

impl DocumentAnalyzerTool {
    /// Create a new document analyzer
    pub fn new(config: DocumentAnalyzerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let definition = ToolDefinition::new(
            "document_analyzer",
            "Fetch a web page by URL and extract its title, meta description and main text.",
        )
        .with_category(ToolCategory::Http);

        Ok(Self {
            definition,
            client,
            config,
        })
    }

    async fn analyze(&self, raw_url: &str) -> Result<serde_json::Value> {
        let url = validate_url(raw_url, self.config.allow_private_hosts)?;

        debug!(url = %url, "Fetching document");

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                let millis = u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX);
                Error::Timeout(millis)
            } else {
                Error::Network(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(Error::Network(format!("HTTP status {}", response.status())));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let page = extract_page(&html);
        Ok(serde_json::json!({
            "url": raw_url,
            "title": page.title,
            "description": page.description,
            "content": truncate_chars(&page.text, MAX_CONTENT_CHARS),
            "content_length": page.text.chars().count(),
            "has_content": !page.text.is_empty(),
        }))
    }
}

#[async_trait::async_trait]
impl Tool for DocumentAnalyzerTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: &str) -> Result<serde_json::Value> {
        let raw_url = input.trim();
        match self.analyze(raw_url).await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(url = %raw_url, error = %e, "Document analysis failed");
                Ok(serde_json::json!({
                    "url": raw_url,
                    "error": e.to_string(),
                    "has_content": false,
                }))
            }
        }
    }
}

// ============================================================================
// Extraction
// ============================================================================

#[derive(Debug, PartialEq)]
struct ExtractedPage {
    title: String,
    description: String,
    text: String,
}

fn extract_page(html: &str) -> ExtractedPage {
    let title = TITLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| strip_html_tags(m.as_str()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "No title".to_string());

    ExtractedPage {
        title,
        description: extract_meta_description(html),
        text: extract_main_text(html),
    }
}

fn extract_meta_description(html: &str) -> String {
    META_TAG_RE
        .find_iter(html)
        .map(|m| m.as_str())
        .find(|tag| META_NAME_DESCRIPTION_RE.is_match(tag))
        .and_then(|tag| META_CONTENT_RE.captures(tag))
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| decode_entities(m.as_str()).trim().to_string())
        .unwrap_or_default()
}

fn extract_main_text(html: &str) -> String {
    let mut cleaned = html.to_string();
    for re in NOISE_RES.iter() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }

    let container = CONTAINER_RES
        .iter()
        .find_map(|re| re.captures(&cleaned).and_then(|c| c.get(1)))
        .map_or(cleaned.as_str(), |m| m.as_str());

    let with_breaks = BLOCK_BREAK_RE.replace_all(container, "\n");
    let text = decode_entities(&remove_tags(&with_breaks));

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// URL validation
// ============================================================================

fn validate_url(raw: &str, allow_private_hosts: bool) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidInput(format!("Invalid URL: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::InvalidInput(format!(
                "URL scheme '{scheme}' is not allowed"
            )))
        }
    }

    if allow_private_hosts {
        return Ok(url);
    }

    let host = url
        .host_str()
        .ok_or_else(|| Error::InvalidInput("URL has no host".to_string()))?
        .to_lowercase();

    let bracketless = host.trim_start_matches('[').trim_end_matches(']');
    let private_ip = bracketless
        .parse::<IpAddr>()
        .is_ok_and(|ip| is_private_ip(&ip));

    if private_ip
        || BLOCKED_HOSTS.contains(&host.as_str())
        || host.ends_with(".internal")
        || host.ends_with(".local")
        || host.ends_with(".localhost")
    {
        warn!(host = %host, "Blocked request to internal host");
        return Err(Error::InvalidInput(format!(
            "Requests to '{host}' are not allowed"
        )));
    }

    Ok(url)
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Rust &amp; Friends</title>
  <meta charset="utf-8">
  <meta name="description" content="A page about Rust.">
  <style>body { color: red; }</style>
  <script>console.log("noise");</script>
</head>
<body>
  <header><h1>Site header</h1></header>
  <nav><a href="/">Home</a></nav>
  <main>
    <h2>Ownership</h2>
    <p>Each value has a single owner.</p>
    <p>   </p>
    <p>Borrowing lets you reference without owning.</p>
  </main>
  <footer>Copyright</footer>
</body>
</html>"#;

    #[test]
    fn test_extract_page() {
        let page = extract_page(PAGE);
        assert_eq!(page.title, "Rust & Friends");
        assert_eq!(page.description, "A page about Rust.");
        assert_eq!(
            page.text,
            "Ownership\nEach value has a single owner.\nBorrowing lets you reference without owning."
        );
    }

    #[test]
    fn test_falls_back_to_body_without_main() {
        let html = "<html><body><nav>menu</nav><div>Body text</div></body></html>";
        assert_eq!(extract_main_text(html), "Body text");
    }

    #[test]
    fn test_article_preferred_over_body() {
        let html = "<body><div>outside</div><article><p>inside</p></article></body>";
        assert_eq!(extract_main_text(html), "inside");
    }

    #[test]
    fn test_missing_title_and_description() {
        let page = extract_page("<p>text</p>");
        assert_eq!(page.title, "No title");
        assert_eq!(page.description, "");
        assert_eq!(page.text, "text");
    }

    #[test]
    fn test_meta_description_attribute_order() {
        let html = r#"<meta content='Swapped order' name="description">"#;
        assert_eq!(extract_meta_description(html), "Swapped order");
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/page", false).is_ok());
        assert!(validate_url("invalid-url", false).is_err());
        assert!(validate_url("ftp://example.com", false).is_err());
        assert!(validate_url("http://localhost:8080", false).is_err());
        assert!(validate_url("http://127.0.0.1/", false).is_err());
        assert!(validate_url("http://192.168.1.10/", false).is_err());
        assert!(validate_url("http://127.0.0.1/", true).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_reports_error() {
        let tool = DocumentAnalyzerTool::new(DocumentAnalyzerConfig::default()).unwrap();
        let out = tool.execute("invalid-url").await.unwrap();
        assert_eq!(out["url"], "invalid-url");
        assert_eq!(out["has_content"], false);
        assert!(out["error"].is_string());
    }
}
