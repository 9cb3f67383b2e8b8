use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::news::{config::NewsApiConfig, error::FetchError, types::Article};

/// Upstream article provider.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn top_headlines(
        &self,
        categories: &[String],
        languages: &[String],
    ) -> Result<Vec<Article>, FetchError>;

    async fn search(&self, query: &str) -> Result<Vec<Article>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

pub struct NewsApiClient {
    http: reqwest::Client,
    config: NewsApiConfig,
}

impl NewsApiClient {
    pub fn new(config: NewsApiConfig, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("news-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    async fn get_articles(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Article>, FetchError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        debug!("GET {} {:?}", url, params);

        let response = self
            .http
            .get(&url)
            .header("X-Api-Key", &self.config.api_key)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(ErrorResponse {
                    code: Some(code),
                    message,
                }) => format!("{code}: {message}"),
                Ok(ErrorResponse { message, .. }) => message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };

            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: ArticlesResponse = response.json().await?;
        debug!("{} returned {} articles", path, body.articles.len());

        Ok(body.articles)
    }
}

#[async_trait]
impl ArticleFetcher for NewsApiClient {
    async fn top_headlines(
        &self,
        categories: &[String],
        languages: &[String],
    ) -> Result<Vec<Article>, FetchError> {
        self.get_articles(
            "/v2/top-headlines",
            &[
                ("category", categories.join(",")),
                ("language", languages.join(",")),
            ],
        )
        .await
    }

    async fn search(&self, query: &str) -> Result<Vec<Article>, FetchError> {
        self.get_articles("/v2/everything", &[("q", query.to_string())])
            .await
    }
}
