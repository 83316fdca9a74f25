use chrono::{Duration, Local};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::config::ContentConfig;
use crate::error::{Result, TaidanError};

/// Summary entry from the repository search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RepoSummary>,
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

/// Repository content assembled for dialogue conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoContent {
    pub name: String,
    pub description: String,
    pub stars: u64,
    pub language: String,
    pub topics: Vec<String>,
    pub readme: String,
    pub url: String,
    pub owner: String,
    pub repo: String,
}

impl RepoContent {
    /// Render a prompt-ready summary, capping the README length.
    pub fn summary(&self, max_readme_length: usize) -> String {
        let mut parts = Vec::new();

        parts.push(format!("Repository: {}", self.name));
        if !self.description.is_empty() {
            parts.push(format!("Description: {}", self.description));
        }
        if !self.language.is_empty() {
            parts.push(format!("Primary Language: {}", self.language));
        }
        if self.stars > 0 {
            parts.push(format!("GitHub Stars: {}", self.stars));
        }
        if !self.topics.is_empty() {
            parts.push(format!("Topics: {}", self.topics.join(", ")));
        }
        if !self.readme.is_empty() {
            let readme: String = if self.readme.chars().count() > max_readme_length {
                let truncated: String = self.readme.chars().take(max_readme_length).collect();
                format!("{}...", truncated)
            } else {
                self.readme.clone()
            };
            parts.push(format!("README Content:\n{}", readme));
        }

        parts.join("\n\n")
    }
}

/// Fetches repository content from the GitHub API with a local file cache.
pub struct GitHubContentFetcher {
    client: Client,
    config: ContentConfig,
    cache_dir: PathBuf,
}

impl GitHubContentFetcher {
    pub fn new(config: ContentConfig) -> Result<Self> {
        let cache_dir = PathBuf::from(".taidan").join("cache").join("content");
        std::fs::create_dir_all(&cache_dir)?;

        let client = Client::builder()
            .user_agent("taidan/0.1.0")
            .build()
            .map_err(TaidanError::Http)?;

        info!("Initialized GitHub fetcher with cache dir: {}", cache_dir.display());
        Ok(Self {
            client,
            config,
            cache_dir,
        })
    }

    /// Fetch trending repositories: created within the last week, sorted by
    /// stars.
    pub async fn trending_repos(&self, language: &str, limit: usize) -> Result<Vec<RepoSummary>> {
        info!("Fetching trending {} repositories", language);

        let cache_file = self.cache_dir.join(format!("trending_{}_{}.json", language, limit));
        if let Some(cached) = self.read_cache::<Vec<RepoSummary>>(&cache_file) {
            debug!("Using cached trending repositories");
            return Ok(cached);
        }

        let week_ago = (Local::now() - Duration::days(7)).format("%Y-%m-%d");
        let url = format!("{}/search/repositories", self.config.api_base);
        let response = self
            .request(&url)
            .query(&[
                ("q", format!("language:{} created:>{}", language, week_ago)),
                ("sort", "stars".to_string()),
                ("order", "desc".to_string()),
                ("per_page", limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| TaidanError::Content(format!("Trending search failed: {}", e)))?;

        let search: SearchResponse = response.json().await?;
        self.write_cache(&cache_file, &search.items)?;

        info!("Fetched {} trending repositories", search.items.len());
        Ok(search.items)
    }

    /// Fetch README and basic info for one repository URL.
    pub async fn fetch_repository_content(&self, repo_url: &str) -> Result<RepoContent> {
        info!("Fetching content from repository: {}", repo_url);

        let (owner, repo) = parse_repo_url(repo_url)?;

        let cache_file = self.cache_dir.join(format!("{}_{}_content.json", owner, repo));
        if let Some(cached) = self.read_cache::<RepoContent>(&cache_file) {
            debug!("Using cached repository content");
            return Ok(cached);
        }

        let info_url = format!("{}/repos/{}/{}", self.config.api_base, owner, repo);
        let info: RepoInfo = self
            .request(&info_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| TaidanError::Content(format!("Repository lookup failed: {}", e)))?
            .json()
            .await?;

        let readme = self.fetch_readme(&owner, &repo).await.unwrap_or_else(|e| {
            warn!("No README found for {}/{}: {}", owner, repo, e);
            String::new()
        });

        let content = RepoContent {
            name: info.name,
            description: info.description.unwrap_or_default(),
            stars: info.stargazers_count,
            language: info.language.unwrap_or_default(),
            topics: info.topics,
            readme,
            url: repo_url.to_string(),
            owner,
            repo,
        };

        self.write_cache(&cache_file, &content)?;
        info!("Successfully fetched content for {}/{}", content.owner, content.repo);
        Ok(content)
    }

    /// Fetch content for every trending repository, with progress reporting.
    pub async fn fetch_trending_content(
        &self,
        language: &str,
        limit: usize,
    ) -> Result<Vec<RepoContent>> {
        let repos = self.trending_repos(language, limit).await?;

        let progress = ProgressBar::new(repos.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut contents = Vec::new();
        for repo in &repos {
            progress.set_message(repo.full_name.clone());
            match self.fetch_repository_content(&repo.html_url).await {
                Ok(content) => contents.push(content),
                Err(e) => warn!("Skipping {}: {}", repo.full_name, e),
            }
            progress.inc(1);
        }
        progress.finish_with_message("done");

        Ok(contents)
    }

    async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<String> {
        let url = format!("{}/repos/{}/{}/readme", self.config.api_base, owner, repo);
        let response = self
            .request(&url)
            // Raw media type skips the base64 content envelope
            .header("Accept", "application/vnd.github.raw")
            .send()
            .await?
            .error_for_status()
            .map_err(|e| TaidanError::Content(format!("README fetch failed: {}", e)))?;

        Ok(response.text().await?)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.config.github_token {
            builder = builder.header("Authorization", format!("token {}", token));
        }
        builder
    }

    fn read_cache<T: serde::de::DeserializeOwned>(&self, cache_file: &PathBuf) -> Option<T> {
        let meta = cache_file.metadata().ok()?;
        let modified = meta.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        if age.as_secs() > self.config.cache_hours * 3600 {
            return None;
        }

        let content = std::fs::read_to_string(cache_file).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn write_cache<T: Serialize>(&self, cache_file: &PathBuf, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(cache_file, content)?;
        Ok(())
    }
}

/// Extract (owner, repo) from a GitHub repository URL.
fn parse_repo_url(repo_url: &str) -> Result<(String, String)> {
    let without_scheme = repo_url
        .strip_prefix("https://")
        .or_else(|| repo_url.strip_prefix("http://"))
        .unwrap_or(repo_url);

    let mut parts = without_scheme.split('/');
    let host = parts.next().unwrap_or_default();
    if !host.contains("github.com") {
        return Err(TaidanError::Content(format!("Not a GitHub URL: {}", repo_url)));
    }

    let owner = parts.next().filter(|s| !s.is_empty());
    let repo = parts.next().filter(|s| !s.is_empty());
    match (owner, repo) {
        (Some(owner), Some(repo)) => Ok((
            owner.to_string(),
            repo.trim_end_matches(".git").to_string(),
        )),
        _ => Err(TaidanError::Content(format!(
            "Invalid GitHub repository URL format: {}",
            repo_url
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo_url() {
        let (owner, repo) = parse_repo_url("https://github.com/watermint/taidan").unwrap();
        assert_eq!(owner, "watermint");
        assert_eq!(repo, "taidan");

        let (_, repo) = parse_repo_url("https://github.com/foo/bar.git").unwrap();
        assert_eq!(repo, "bar");

        assert!(parse_repo_url("https://gitlab.com/foo/bar").is_err());
        assert!(parse_repo_url("https://github.com/onlyowner").is_err());
    }

    #[test]
    fn test_summary_truncates_readme() {
        let content = RepoContent {
            name: "demo".to_string(),
            description: "a tool".to_string(),
            stars: 42,
            language: "Rust".to_string(),
            topics: vec!["cli".to_string()],
            readme: "r".repeat(100),
            url: "https://github.com/x/demo".to_string(),
            owner: "x".to_string(),
            repo: "demo".to_string(),
        };

        let summary = content.summary(10);
        assert!(summary.contains("Repository: demo"));
        assert!(summary.contains("GitHub Stars: 42"));
        assert!(summary.contains(&format!("{}...", "r".repeat(10))));
    }

    #[test]
    fn test_summary_skips_empty_fields() {
        let content = RepoContent {
            name: "demo".to_string(),
            description: String::new(),
            stars: 0,
            language: String::new(),
            topics: vec![],
            readme: String::new(),
            url: "https://github.com/x/demo".to_string(),
            owner: "x".to_string(),
            repo: "demo".to_string(),
        };

        let summary = content.summary(1000);
        assert_eq!(summary, "Repository: demo");
    }
}
