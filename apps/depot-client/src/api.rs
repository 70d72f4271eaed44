//! HTTP API client with a shared bearer-credential slot.

use std::sync::{Arc, RwLock};

use reqwest::header::COOKIE;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::types::{Credentials, LoginResponse, RegisterResponse, RemoteFile, UploadResponse};

/// Holds the current bearer credential. The client holds exactly one token
/// at a time; a new login replaces the previous one.
#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_token(&self, token: String) {
        *self.token.write().expect("session lock poisoned") = Some(token);
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().expect("session lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().expect("session lock poisoned").is_some()
    }
}

/// Thin wrapper over `reqwest` that attaches the session credential to
/// every request as the `Authorization` bearer cookie.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid server URL: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Config(format!("failed to build URL: {e}")))
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.header(COOKIE, format!("Authorization=Bearer {token}")),
            None => request,
        }
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ClientError> {
        let url = self.url("/register")?;
        let response = self
            .http
            .post(url)
            .json(credentials)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        parse(response).await
    }

    /// Log in and store the returned token in the session on success.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError> {
        let url = self.url("/login")?;
        let response = self
            .http
            .post(url)
            .json(credentials)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let login: LoginResponse = parse(response).await?;
        self.session.set_token(login.jwt_token.clone());
        Ok(login)
    }

    pub async fn list_files(&self) -> Result<Vec<RemoteFile>, ClientError> {
        let url = self.url("/files")?;
        let response = self
            .with_session(self.http.get(url))
            .send()
            .await
            .map_err(ClientError::Transport)?;
        parse(response).await
    }

    /// Send a prepared multipart upload. The caller owns the body stream,
    /// including its progress reporting and cancellation behavior.
    pub async fn upload(&self, form: reqwest::multipart::Form) -> Result<UploadResponse, ClientError> {
        let url = self.url("/upload")?;
        let response = self
            .with_session(self.http.post(url))
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        parse(response).await
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response.json().await.map_err(ClientError::Decode)
}
