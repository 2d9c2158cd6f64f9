//! OAuth 1.0a for the Appfigures API.
//!
//! Requests are signed with the PLAINTEXT method, which Appfigures accepts
//! over HTTPS. When no stored access token is configured the out-of-band
//! flow runs on the console: request token, authorize URL, verifier prompt,
//! access token.

use crate::config::AppfiguresConfig;
use crate::utils::error::{EtlError, Result};
use chrono::Utc;
use dialoguer::Input;
use reqwest::Client;

const OAUTH_SCOPE: &str = "private:read,products:read";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: Option<String>,
    pub token_secret: Option<String>,
}

impl OAuthCredentials {
    pub fn consumer(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
            token_secret: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>, token_secret: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self.token_secret = Some(token_secret.into());
        self
    }

    pub fn signature(&self) -> String {
        format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(self.token_secret.as_deref().unwrap_or(""))
        )
    }

    /// `Authorization: OAuth ...` 標頭；`extra` 放 oauth_callback / oauth_verifier
    pub fn authorization_header(&self, extra: &[(&str, &str)]) -> String {
        let now = Utc::now();
        let timestamp = now.timestamp().to_string();
        let nonce = format!("{:x}", now.timestamp_nanos_opt().unwrap_or_default());
        let signature = self.signature();

        let mut params: Vec<(&str, &str)> = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce.as_str()),
            ("oauth_signature_method", "PLAINTEXT"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_version", "1.0"),
        ];
        if let Some(token) = &self.token {
            params.push(("oauth_token", token.as_str()));
        }
        params.extend_from_slice(extra);
        params.push(("oauth_signature", signature.as_str()));

        let fields: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, percent_encode(v)))
            .collect();
        format!("OAuth {}", fields.join(", "))
    }
}

/// 設定中的 access token 可用時直接使用，否則走互動式授權
pub async fn obtain_credentials(client: &Client, config: &AppfiguresConfig) -> Result<OAuthCredentials> {
    if let Some(credentials) = stored_credentials(config) {
        tracing::debug!("🔑 Using stored Appfigures access token");
        return Ok(credentials);
    }

    tracing::info!("🔑 No stored access token, starting Appfigures authorization");
    let (request_token, request_secret) = request_token(client, config).await?;

    println!(
        "Go here: {} to get your verification token.",
        authorize_url(config, &request_token)
    );
    let verifier = tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt("Paste verifier here")
            .interact_text()
    })
    .await
    .map_err(|e| EtlError::AuthError {
        message: e.to_string(),
    })??;

    let credentials = access_token(client, config, &request_token, &request_secret, verifier.trim()).await?;
    if let (Some(token), Some(secret)) = (&credentials.token, &credentials.token_secret) {
        println!("Access Token: {}\tAccess Secret:{}", token, secret);
    }
    Ok(credentials)
}

pub fn stored_credentials(config: &AppfiguresConfig) -> Option<OAuthCredentials> {
    let token = config.access_token.as_deref()?;
    let secret = config.access_token_secret.as_deref()?;
    let length = config.access_token_length;

    if token.len() != length || secret.len() != length {
        return None;
    }
    Some(
        OAuthCredentials::consumer(&config.client_key, &config.client_secret)
            .with_token(token, secret),
    )
}

pub async fn request_token(client: &Client, config: &AppfiguresConfig) -> Result<(String, String)> {
    let consumer = OAuthCredentials::consumer(&config.client_key, &config.client_secret);
    let url = format!("{}/oauth/request_token", base(config));

    let response = client
        .get(&url)
        .header(
            reqwest::header::AUTHORIZATION,
            consumer.authorization_header(&[("oauth_callback", "oob")]),
        )
        .header("X-OAuth-Scope", OAUTH_SCOPE)
        .send()
        .await?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        return Err(EtlError::TransportError { status, url });
    }
    parse_token_response(&response.text().await?)
}

pub async fn access_token(
    client: &Client,
    config: &AppfiguresConfig,
    request_token: &str,
    request_secret: &str,
    verifier: &str,
) -> Result<OAuthCredentials> {
    let consumer = OAuthCredentials::consumer(&config.client_key, &config.client_secret);
    let signer = consumer.clone().with_token(request_token, request_secret);
    let url = format!("{}/oauth/access_token", base(config));

    let response = client
        .post(&url)
        .header(
            reqwest::header::AUTHORIZATION,
            signer.authorization_header(&[("oauth_verifier", verifier)]),
        )
        .form(&[("oauth_verifier", verifier)])
        .send()
        .await?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        return Err(EtlError::TransportError { status, url });
    }
    let (token, secret) = parse_token_response(&response.text().await?)?;
    Ok(consumer.with_token(token, secret))
}

pub fn authorize_url(config: &AppfiguresConfig, request_token: &str) -> String {
    format!(
        "{}/oauth/authorize?oauth_token={}",
        base(config),
        percent_encode(request_token)
    )
}

/// `oauth_token=...&oauth_token_secret=...` 形式的回應
pub fn parse_token_response(body: &str) -> Result<(String, String)> {
    let mut token = None;
    let mut secret = None;
    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        match key.as_ref() {
            "oauth_token" => token = Some(value.into_owned()),
            "oauth_token_secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }

    match (token, secret) {
        (Some(token), Some(secret)) => Ok((token, secret)),
        _ => Err(EtlError::AuthError {
            message: "token response is missing oauth_token or oauth_token_secret".to_string(),
        }),
    }
}

fn base(config: &AppfiguresConfig) -> &str {
    config.base_url.trim_end_matches('/')
}

/// RFC 3986 unreserved characters stay as-is
fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char)
            }
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}
