use crate::adapters::oauth::OAuthCredentials;
use crate::domain::model::{FetchResponse, PageRequest};
use crate::domain::ports::Fetcher;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

/// Zendesk：basic auth，使用者名稱為 `<email>/token`，密碼為 API token
pub struct BasicAuthFetcher {
    client: Client,
    username: String,
    api_token: String,
}

impl BasicAuthFetcher {
    pub fn new(client: Client, email: &str, api_token: impl Into<String>) -> Self {
        Self {
            client,
            username: format!("{}/token", email),
            api_token: api_token.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[async_trait]
impl Fetcher for BasicAuthFetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<FetchResponse> {
        let builder = with_query(self.client.get(&request.url), request)
            .basic_auth(&self.username, Some(&self.api_token));
        decode(builder.send().await?).await
    }
}

/// Appfigures：OAuth 1.0a 簽章
pub struct OAuth1Fetcher {
    client: Client,
    credentials: OAuthCredentials,
}

impl OAuth1Fetcher {
    pub fn new(client: Client, credentials: OAuthCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

#[async_trait]
impl Fetcher for OAuth1Fetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<FetchResponse> {
        let builder = with_query(self.client.get(&request.url), request).header(
            reqwest::header::AUTHORIZATION,
            self.credentials.authorization_header(&[]),
        );
        decode(builder.send().await?).await
    }
}

fn with_query(builder: RequestBuilder, request: &PageRequest) -> RequestBuilder {
    if request.query.is_empty() {
        builder
    } else {
        builder.query(&request.query)
    }
}

/// 成功時 body 必須是 JSON；失敗時 body 內容不重要
async fn decode(response: Response) -> Result<FetchResponse> {
    let status = response.status();
    tracing::debug!("API response status: {}", status);

    let body = if status.is_success() {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)?
    } else {
        serde_json::Value::Null
    };

    Ok(FetchResponse {
        status: status.as_u16(),
        body,
    })
}
