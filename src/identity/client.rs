//! Identity Backend REST Client
//!
//! HTTP client for the Appwrite-compatible account and database APIs.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::{DocumentList, DocumentQuery, Identity, IdentityBackend};
use crate::error::{BackendError, BackendResult};

/// Header carrying the project id on every request
const PROJECT_HEADER: &str = "X-Appwrite-Project";

/// Identity backend REST client
pub struct IdentityClient {
    client: Client,
    config: IdentityClientConfig,
}

/// Configuration for the identity client
#[derive(Debug, Clone)]
pub struct IdentityClientConfig {
    /// API endpoint including the version prefix (e.g., "https://cloud.appwrite.io/v1")
    pub endpoint: String,
    /// Project the accounts and documents belong to
    pub project_id: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for IdentityClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

impl IdentityClient {
    /// Create a new client with its own cookie store
    pub fn new(config: IdentityClientConfig) -> BackendResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            PROJECT_HEADER,
            HeaderValue::from_str(&config.project_id)
                .map_err(|e| BackendError::Config(format!("project id: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    async fn send(&self, request: RequestBuilder) -> BackendResult<Response> {
        let response = request.send().await.map_err(BackendError::from_reqwest)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(BackendError::from_response(response).await)
        }
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> BackendResult<Response> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl IdentityBackend for IdentityClient {
    async fn get_account(&self) -> BackendResult<Identity> {
        let response = self.send(self.client.get(self.url("/account"))).await?;
        Self::decode(response).await
    }

    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<()> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post("/account/sessions/email", &body).await?;
        Ok(())
    }

    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> BackendResult<Identity> {
        let mut body = serde_json::json!({
            "userId": user_id,
            "email": email,
            "password": password,
        });
        if let Some(name) = name {
            body["name"] = serde_json::Value::from(name);
        }

        let response = self.post("/account", &body).await?;
        Self::decode(response).await
    }

    async fn delete_current_session(&self) -> BackendResult<()> {
        self.send(self.client.delete(self.url("/account/sessions/current")))
            .await?;
        Ok(())
    }

    fn oauth_authorization_url(
        &self,
        provider: &str,
        success_url: &str,
        failure_url: &str,
    ) -> BackendResult<String> {
        let path = format!(
            "/account/tokens/oauth2/{}",
            urlencoding::encode(provider)
        );
        let mut url =
            Url::parse(&self.url(&path)).map_err(|e| BackendError::Config(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("project", &self.config.project_id)
            .append_pair("success", success_url)
            .append_pair("failure", failure_url);

        Ok(url.to_string())
    }

    async fn create_session_from_token(&self, user_id: &str, secret: &str) -> BackendResult<()> {
        let body = serde_json::json!({ "userId": user_id, "secret": secret });
        self.post("/account/sessions/token", &body).await?;
        Ok(())
    }

    async fn create_recovery(&self, email: &str, redirect_url: &str) -> BackendResult<()> {
        let body = serde_json::json!({ "email": email, "url": redirect_url });
        self.post("/account/recovery", &body).await?;
        Ok(())
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[DocumentQuery],
    ) -> BackendResult<DocumentList> {
        let path = format!(
            "/databases/{}/collections/{}/documents",
            urlencoding::encode(database_id),
            urlencoding::encode(collection_id)
        );
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_param()))
            .collect();

        tracing::debug!(database = %database_id, collection = %collection_id, "Listing documents");

        let response = self
            .send(self.client.get(self.url(&path)).query(&params))
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> IdentityClient {
        IdentityClient::new(IdentityClientConfig {
            endpoint: "https://identity.example.com/v1/".to_string(),
            project_id: "visitlog".to_string(),
            request_timeout_ms: 1000,
        })
        .unwrap()
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = test_client();
        assert_eq!(
            client.url("/account"),
            "https://identity.example.com/v1/account"
        );
    }

    #[test]
    fn test_oauth_url_carries_targets() {
        let client = test_client();
        let url = client
            .oauth_authorization_url(
                "google",
                "http://localhost:8085/oauth/callback",
                "http://localhost:8085/login",
            )
            .unwrap();

        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/v1/account/tokens/oauth2/google");

        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("project".to_string(), "visitlog".to_string())));
        assert!(pairs.contains(&(
            "success".to_string(),
            "http://localhost:8085/oauth/callback".to_string()
        )));
        assert!(pairs.contains(&(
            "failure".to_string(),
            "http://localhost:8085/login".to_string()
        )));
    }

    #[test]
    fn test_invalid_project_id_rejected() {
        let result = IdentityClient::new(IdentityClientConfig {
            project_id: "bad\nid".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(BackendError::Config(_))));
    }
}
