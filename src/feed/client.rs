//! HTTP implementation of [`FeedSource`] for a Discuit server
//!
//! Every call is a single GET decoded from JSON. Nothing is retried here:
//! a failed request, a non-2xx status or an undecodable body is returned as
//! an error and ends the run.

use crate::config::{FeedConfig, UserAgentConfig};
use crate::feed::types::{CommentPage, FeedPage, PostDetail};
use crate::feed::FeedSource;
use crate::SweepError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Builds an HTTP client identifying the sweep to the remote site
///
/// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the Discuit JSON API
#[derive(Debug, Clone)]
pub struct DiscuitClient {
    client: Client,
    base_url: String,
    sort: String,
    community_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitialData {
    no_users: u64,
}

impl DiscuitClient {
    /// Creates a client for the configured site
    pub fn new(feed: &FeedConfig, user_agent: &UserAgentConfig) -> Result<Self, SweepError> {
        let client = build_http_client(user_agent).map_err(|source| SweepError::Http {
            url: feed.base_url.clone(),
            source,
        })?;

        Ok(Self {
            client,
            base_url: feed.base_url.trim_end_matches('/').to_string(),
            sort: feed.sort.clone(),
            community_id: feed.community_id.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of registered accounts, shown in the report header
    pub async fn fetch_user_count(&self) -> Result<u64, SweepError> {
        let url = format!("{}/api/_initial", self.base_url);
        let data: InitialData = self.get_json(&url, &[]).await?;
        Ok(data.no_users)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SweepError> {
        tracing::trace!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| SweepError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SweepError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| SweepError::Http {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| SweepError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl FeedSource for DiscuitClient {
    async fn fetch_feed_page(&self, cursor: &str) -> Result<FeedPage, SweepError> {
        let url = format!("{}/api/posts", self.base_url);
        let mut query = vec![("sort", self.sort.as_str()), ("next", cursor)];
        if let Some(community) = &self.community_id {
            query.push(("communityId", community.as_str()));
        }
        self.get_json(&url, &query).await
    }

    async fn fetch_post_comments(&self, public_id: &str) -> Result<CommentPage, SweepError> {
        let url = format!("{}/api/posts/{}", self.base_url, public_id);
        let detail: PostDetail = self.get_json(&url, &[]).await?;
        Ok(detail.into())
    }

    async fn fetch_comment_page(
        &self,
        public_id: &str,
        cursor: &str,
    ) -> Result<CommentPage, SweepError> {
        let url = format!("{}/api/posts/{}/comments", self.base_url, public_id);
        self.get_json(&url, &[("next", cursor)]).await
    }
}
