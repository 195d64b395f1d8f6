use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use super::{ArticleGateway, GatewayError, GatewayFuture, select_single};
use crate::config::ApiConfig;
use crate::model::{Article, ArticleLookup, ArticleUpdate, Claim, UpdateResponse};

pub const ARTICLE_PATH: &str = "/api/article/";
pub const CLAIM_LIST_PATH: &str = "/api/claim/list";
pub const CLAIM_SEARCH_PATH: &str = "/api/claim/search/";
pub const ARTICLE_UPDATE_PATH: &str = "/api/article/update";

/// JSON-over-HTTP gateway against the claimdesk REST API.
pub struct HttpGateway {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpGateway {
    pub fn new(config: ApiConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

/// Map non-2xx to [`GatewayError::Status`], otherwise decode the JSON body.
async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<T, GatewayError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(GatewayError::Status {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
        });
    }
    Ok(resp.json().await?)
}

fn is_dot_segment(text: &str) -> bool {
    matches!(text, "." | "..")
}

impl ArticleGateway for HttpGateway {
    fn fetch_article<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Article> {
        Box::pin(async move {
            let id = id.trim();
            if id.is_empty() {
                return Err(GatewayError::MissingId);
            }

            let endpoint = self.config.endpoint(ARTICLE_PATH);
            let resp = self
                .client
                .post(&endpoint)
                .json(&ArticleLookup { id: id.to_string() })
                .send()
                .await?;

            let data: Option<Vec<Article>> = read_json(resp, &endpoint).await?;
            let articles = data.ok_or(GatewayError::EmptyResponse { endpoint })?;
            select_single(id, articles)
        })
    }

    fn fetch_claims<'a>(&'a self, ids: &'a [String]) -> GatewayFuture<'a, Vec<Claim>> {
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }

            let endpoint = self.config.endpoint(CLAIM_LIST_PATH);
            let resp = self.client.post(&endpoint).json(ids).send().await?;

            let data: Option<Vec<Claim>> = read_json(resp, &endpoint).await?;
            data.ok_or(GatewayError::EmptyResponse { endpoint })
        })
    }

    fn search_claims<'a>(&'a self, text: &'a str) -> GatewayFuture<'a, Vec<Claim>> {
        Box::pin(async move {
            // URL parsing folds `.` and `..` path segments (encoded or not)
            // into the parent path, so they can never reach the search route.
            if is_dot_segment(text) {
                tracing::debug!(query = %text, "dot-only claim search, nothing to send");
                return Ok(Vec::new());
            }

            let endpoint = self.config.endpoint(&format!(
                "{}{}",
                CLAIM_SEARCH_PATH,
                urlencoding::encode(text)
            ));
            let resp = self
                .client
                .get(&endpoint)
                .header(CONTENT_TYPE, "application/json")
                .send()
                .await?;

            let data: Option<Vec<Claim>> = read_json(resp, &endpoint).await?;
            data.ok_or(GatewayError::EmptyResponse { endpoint })
        })
    }

    fn update_article<'a>(&'a self, update: &'a ArticleUpdate) -> GatewayFuture<'a, ()> {
        Box::pin(async move {
            if update.id.trim().is_empty() {
                return Err(GatewayError::MissingId);
            }

            let endpoint = self.config.endpoint(ARTICLE_UPDATE_PATH);
            let resp = self.client.post(&endpoint).json(update).send().await?;

            let body: UpdateResponse = read_json(resp, &endpoint).await?;
            match body.error {
                Some(message) => Err(GatewayError::Rejected(message)),
                None => Ok(()),
            }
        })
    }
}
