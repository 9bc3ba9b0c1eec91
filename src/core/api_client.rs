// src/core/api_client.rs
//! HTTP gateway to the recruiting backend: bearer injection and 401 handling

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::app_log;
use crate::auth::AuthSession;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::response::LoginResponse;

const LOGIN_ENDPOINT: &str = "/login";

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    session: AuthSession,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: AuthSession) -> ApiResult<Self> {
        Self::with_base_url(config.api_base_url.clone(), config.timeout(), session)
    }

    /// The client itself carries no timeout; it is applied per request so
    /// that analysis streams can run unbounded.
    pub fn with_base_url(
        base_url: impl Into<String>,
        timeout: Duration,
        session: AuthSession,
    ) -> ApiResult<Self> {
        let client = reqwest::Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            timeout,
            session,
        })
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = self.url(endpoint);
        app_log!(debug, "{} {}", method, url);

        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and maps every non-2xx status to an error.
    /// A 401 ends the session before surfacing.
    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        app_log!(trace, "Response status: {}", status);

        if status == StatusCode::UNAUTHORIZED {
            app_log!(warn, "Backend answered 401 for {}", response.url());
            self.session.logout().await;
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            app_log!(error, "Service error response {}: {}", status, body);
            return Err(ApiError::Status { status, body });
        }

        Ok(response)
    }

    async fn read_json<R: DeserializeOwned>(response: Response, context: &str) -> ApiResult<R> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            app_log!(debug, "Undecodable body for {}: {}", context, text);
            ApiError::decode(context, e)
        })
    }

    async fn call<R: DeserializeOwned>(&self, builder: RequestBuilder, endpoint: &str) -> ApiResult<R> {
        let response = self.send(builder.timeout(self.timeout)).await?;
        Self::read_json(response, endpoint).await
    }

    /// Generic GET request
    pub async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<R> {
        self.call(self.request(Method::GET, endpoint), endpoint).await
    }

    pub async fn get_query<Q, R>(&self, endpoint: &str, query: &Q) -> ApiResult<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call(self.request(Method::GET, endpoint).query(query), endpoint)
            .await
    }

    /// Generic POST request with JSON
    pub async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> ApiResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call(self.request(Method::POST, endpoint).json(payload), endpoint)
            .await
    }

    pub async fn post_empty<R: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<R> {
        self.call(self.request(Method::POST, endpoint), endpoint).await
    }

    pub async fn put_json<T, R>(&self, endpoint: &str, payload: &T) -> ApiResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call(self.request(Method::PUT, endpoint).json(payload), endpoint)
            .await
    }

    pub async fn delete<R: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<R> {
        self.call(self.request(Method::DELETE, endpoint), endpoint).await
    }

    pub async fn delete_query<Q, R>(&self, endpoint: &str, query: &Q) -> ApiResult<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call(self.request(Method::DELETE, endpoint).query(query), endpoint)
            .await
    }

    pub async fn delete_json<T, R>(&self, endpoint: &str, payload: &T) -> ApiResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call(self.request(Method::DELETE, endpoint).json(payload), endpoint)
            .await
    }

    pub async fn post_multipart<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> ApiResult<R> {
        self.call(self.request(Method::POST, endpoint).multipart(form), endpoint)
            .await
    }

    /// Raw body of a GET, for file downloads
    pub async fn get_bytes<Q: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        query: &Q,
    ) -> ApiResult<Vec<u8>> {
        let builder = self
            .request(Method::GET, endpoint)
            .query(query)
            .timeout(self.timeout);
        let response = self.send(builder).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn post_json_bytes<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> ApiResult<Vec<u8>> {
        let builder = self
            .request(Method::POST, endpoint)
            .json(payload)
            .timeout(self.timeout);
        let response = self.send(builder).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Multipart POST whose response body is consumed as a stream.
    /// No timeout is applied.
    pub async fn post_stream(&self, endpoint: &str, form: Form) -> ApiResult<Response> {
        app_log!(info, "Opening stream {}", self.url(endpoint));
        self.send(self.request(Method::POST, endpoint).multipart(form))
            .await
    }

    /// Exchange credentials for a token and store it in the session
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<()> {
        crate::error::require_non_empty("username", username)?;
        crate::error::require_non_empty("password", password)?;

        let form = Form::new()
            .text("username", username.to_string())
            .text("password", password.to_string());

        let response: LoginResponse = match self.post_multipart(LOGIN_ENDPOINT, form).await {
            Ok(response) => response,
            Err(ApiError::Unauthorized) => {
                return Err(ApiError::Rejected("invalid username or password".into()))
            }
            Err(e) => return Err(e),
        };

        let username = response
            .username
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| username.to_string());
        self.session
            .establish(response.access_token, username)
            .await;
        Ok(())
    }

    pub async fn logout(&self) {
        self.session.logout().await;
    }
}
