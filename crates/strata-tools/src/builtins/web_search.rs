//! Web search tool
//!
//! Uses the Tavily search API when `TAVILY_API_KEY` is configured and falls
//! back to scraping the DuckDuckGo HTML endpoint otherwise. Provider failures
//! are reported as a single `{error, query}` entry in the result list so the
//! task still completes.

use super::html::strip_html_tags;
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolCategory, ToolDefinition};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

/// Tavily search endpoint
pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// DuckDuckGo HTML endpoint
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Default number of results
const DEFAULT_MAX_RESULTS: usize = 5;

/// HTTP timeout for the search request (seconds)
const SEARCH_TIMEOUT_SECS: u64 = 15;

/// User-Agent header to avoid bot blocking
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]+class="result__a"[^>]+href="([^"]*)"[^>]*>(.*?)</a>"#)
        .expect("title regex")
});

static SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]+class="result__snippet"[^>]*>(.*?)</a>"#).expect("snippet regex")
});

/// Web search settings
#[derive(Clone)]
pub struct WebSearchConfig {
    /// Tavily API key; `None` selects the DuckDuckGo fallback
    pub tavily_api_key: Option<String>,
    /// Maximum number of results returned
    pub max_results: usize,
    /// Request timeout
    pub timeout: Duration,
    /// Tavily endpoint
    pub tavily_url: String,
    /// DuckDuckGo endpoint
    pub duckduckgo_url: String,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            max_results: DEFAULT_MAX_RESULTS,
            timeout: Duration::from_secs(SEARCH_TIMEOUT_SECS),
            tavily_url: TAVILY_SEARCH_URL.to_string(),
            duckduckgo_url: DUCKDUCKGO_HTML_URL.to_string(),
        }
    }
}

impl fmt::Debug for WebSearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSearchConfig")
            .field(
                "tavily_api_key",
                &self.tavily_api_key.as_ref().map(|_| "****"),
            )
            .field("max_results", &self.max_results)
            .field("timeout", &self.timeout)
            .field("tavily_url", &self.tavily_url)
            .field("duckduckgo_url", &self.duckduckgo_url)
            .finish()
    }
}

/// A single search hit.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    /// Page title
    pub title: String,
    /// Destination URL
    pub url: String,
    /// Text snippet
    pub content: String,
    /// Relevance score
    pub score: f64,
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_answer: bool,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    title: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f64,
}

/// Web search tool.
pub struct WebSearchTool {
    definition: ToolDefinition,
    client: reqwest::Client,
    config: WebSearchConfig,
}

impl WebSearchTool {
    /// Create a new web search tool.
    pub fn new(config: WebSearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let definition = ToolDefinition::new(
            "web_search",
            "Search the web for current information. Input is a plain search query; \
             returns a list of results with title, url, content and score.",
        )
        .with_category(ToolCategory::Search);

        Ok(Self {
            definition,
            client,
            config,
        })
    }

    /// Whether searches go through Tavily.
    #[must_use]
    pub fn uses_tavily(&self) -> bool {
        self.config.tavily_api_key.is_some()
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        match &self.config.tavily_api_key {
            Some(key) => self.search_tavily(query, key).await,
            None => self.search_duckduckgo(query).await,
        }
    }

    async fn search_tavily(&self, query: &str, api_key: &str) -> Result<Vec<SearchResult>> {
        debug!(query = %query, "Searching via Tavily");

        let request = TavilyRequest {
            api_key,
            query,
            max_results: self.config.max_results,
            search_depth: "advanced",
            include_answer: true,
        };

        let response = self
            .client
            .post(&self.config.tavily_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Tavily returned status {}",
                response.status()
            )));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| Error::Execution(format!("Invalid Tavily response: {e}")))?;

        Ok(body
            .results
            .into_iter()
            .take(self.config.max_results)
            .map(|r| SearchResult {
                title: r.title.unwrap_or_else(|| "No title".to_string()),
                url: r.url,
                content: r.content,
                score: r.score,
            })
            .collect())
    }

    /// POST avoids the CAPTCHA DuckDuckGo shows for GET requests with
    /// non-ASCII queries.
    async fn search_duckduckgo(&self, query: &str) -> Result<Vec<SearchResult>> {
        debug!(query = %query, "Searching via DuckDuckGo HTML");

        let response = self
            .client
            .post(&self.config.duckduckgo_url)
            .header("Referer", "https://html.duckduckgo.com/")
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "DuckDuckGo returned status {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if html.contains("anomaly-modal") {
            warn!("DuckDuckGo returned CAPTCHA page");
            return Err(Error::Network(
                "DuckDuckGo CAPTCHA triggered; search temporarily blocked".to_string(),
            ));
        }

        Ok(parse_search_results(&html, self.config.max_results))
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: &str) -> Result<serde_json::Value> {
        let query = input.trim();
        if query.is_empty() {
            return Ok(serde_json::json!([{ "error": "Empty search query", "query": input }]));
        }

        match self.search(query).await {
            Ok(results) => {
                debug!(query = %query, count = results.len(), "Search complete");
                serde_json::to_value(results).map_err(|e| Error::Execution(e.to_string()))
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Web search failed");
                Ok(serde_json::json!([{ "error": e.to_string(), "query": query }]))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Parse search results from DuckDuckGo HTML.
///
/// Title:   `<a class="result__a" href="...">TITLE</a>`
/// Snippet: `<a class="result__snippet">SNIPPET</a>`
fn parse_search_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let snippets: Vec<String> = SNIPPET_RE
        .captures_iter(html)
        .map(|cap| strip_html_tags(cap.get(1).map_or("", |m| m.as_str())))
        .collect();

    TITLE_RE
        .captures_iter(html)
        .enumerate()
        .map(|(i, cap)| {
            let url = extract_real_url(cap.get(1).map_or("", |m| m.as_str()));
            let title = strip_html_tags(cap.get(2).map_or("", |m| m.as_str()));
            let content = snippets.get(i).cloned().unwrap_or_default();
            (title, url, content)
        })
        .filter(|(title, url, _)| !title.is_empty() && !url.is_empty())
        .take(max_results)
        .enumerate()
        .map(|(rank, (title, url, content))| SearchResult {
            title,
            url,
            content,
            score: rank_score(rank),
        })
        .collect()
}

/// Positional score: 1.0 for the first hit, 0.1 less for each one after.
fn rank_score(rank: usize) -> f64 {
    let rank = u32::try_from(rank).unwrap_or(u32::MAX);
    (1.0 - 0.1 * f64::from(rank)).max(0.0)
}

/// DuckDuckGo wraps URLs in a redirect: `//duckduckgo.com/l/?uddg=REAL_URL&...`
fn extract_real_url(raw: &str) -> String {
    if let Some(pos) = raw.find("uddg=") {
        let rest = &raw[pos + 5..];
        let end = rest.find('&').unwrap_or(rest.len());
        urlencoding::decode(&rest[..end])
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| rest[..end].to_string())
    } else {
        raw.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <div class="result">
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=abc">Example <b>Title</b></a>
            <a class="result__snippet" href="x">This is a snippet about example.</a>
        </div>
        <div class="result">
            <a rel="nofollow" class="result__a" href="https://rust-lang.org">Rust</a>
            <a class="result__snippet" href="y">A language empowering everyone.</a>
        </div>
    "#;

    fn offline_config() -> WebSearchConfig {
        WebSearchConfig {
            timeout: Duration::from_secs(2),
            duckduckgo_url: "http://127.0.0.1:9/html/".to_string(),
            tavily_url: "http://127.0.0.1:9/search".to_string(),
            ..WebSearchConfig::default()
        }
    }

    #[test]
    fn test_extract_real_url() {
        let raw = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=abc";
        assert_eq!(extract_real_url(raw), "https://example.com");
        assert_eq!(extract_real_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_parse_empty_html() {
        assert!(parse_search_results("", 5).is_empty());
    }

    #[test]
    fn test_parse_sample_html() {
        let results = parse_search_results(SAMPLE_HTML, 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Example Title");
        assert_eq!(results[0].url, "https://example.com");
        assert_eq!(results[0].content, "This is a snippet about example.");
        assert!((results[0].score - 1.0).abs() < f64::EPSILON);
        assert!((results[1].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_parse_respects_max_results() {
        assert_eq!(parse_search_results(SAMPLE_HTML, 1).len(), 1);
    }

    #[test]
    fn test_definition() {
        let tool = WebSearchTool::new(WebSearchConfig::default()).unwrap();
        assert_eq!(tool.definition().name, "web_search");
        assert_eq!(tool.definition().category, ToolCategory::Search);
        assert!(!tool.uses_tavily());
    }

    #[test]
    fn test_config_debug_hides_key() {
        let config = WebSearchConfig {
            tavily_api_key: Some("tvly-secret".to_string()),
            ..WebSearchConfig::default()
        };
        assert!(!format!("{config:?}").contains("tvly-secret"));
    }

    #[tokio::test]
    async fn test_empty_query() {
        let tool = WebSearchTool::new(WebSearchConfig::default()).unwrap();
        let out = tool.execute("   ").await.unwrap();
        assert_eq!(out[0]["error"], "Empty search query");
    }

    #[tokio::test]
    async fn test_provider_failure_is_reported_in_result() {
        let tool = WebSearchTool::new(offline_config()).unwrap();
        let out = tool.execute("rust async").await.unwrap();
        assert_eq!(out.as_array().map(Vec::len), Some(1));
        assert_eq!(out[0]["query"], "rust async");
        assert!(out[0]["error"].is_string());
    }

    #[tokio::test]
    async fn test_tavily_failure_is_reported_in_result() {
        let config = WebSearchConfig {
            tavily_api_key: Some("tvly-test".to_string()),
            ..offline_config()
        };
        let tool = WebSearchTool::new(config).unwrap();
        assert!(tool.uses_tavily());
        let out = tool.execute("rust").await.unwrap();
        assert!(out[0]["error"].is_string());
    }
}
