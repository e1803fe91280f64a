//! HTTP client for the contacts API.
//!
//! Each client is bound to one [`ClientConfig`] and remembers the bearer token
//! returned by the last register, login or password change.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::api::contacts::{CreatedResponse, MessageResponse};
use crate::api::users::TokenResponse;
use crate::contacts::{Contact, ContactDraft};
use crate::history::HistoryEntry;
use crate::types::{AccessToken, ContactId};

/// Where the client sends its requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Build a config from a base URL such as `http://localhost:8080`.
    ///
    /// A trailing slash is added so that route paths are joined below any
    /// path prefix in the base URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(30),
        })
    }
}

/// Client errors.
#[derive(Debug)]
pub enum ClientError {
    /// Invalid base URL or route
    Url(url::ParseError),
    /// Transport or decoding failure
    Http(reqwest::Error),
    /// The server answered with a non-success status
    Status { status: StatusCode, message: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(e) => write!(f, "Invalid URL: {}", e),
            Self::Http(e) => write!(f, "HTTP error: {}", e),
            Self::Status { status, message } => write!(f, "{}: {}", status, message),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

impl ClientError {
    /// HTTP status of a rejected request, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordBody<'a> {
    new_password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactBody<'a> {
    name: &'a str,
    phone_number: &'a str,
    email: Option<&'a str>,
    address: Option<&'a str>,
}

impl<'a> From<&'a ContactDraft> for ContactBody<'a> {
    fn from(draft: &'a ContactDraft) -> Self {
        Self {
            name: &draft.name,
            phone_number: &draft.phone_number,
            email: draft.email.as_deref(),
            address: draft.address.as_deref(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    search_term: &'a str,
}

/// Typed client for every endpoint of the contacts API.
pub struct ContactsClient {
    config: ClientConfig,
    client: Client,
    token: Option<AccessToken>,
}

impl ContactsClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("contacts-service/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config,
            client,
            token: None,
        })
    }

    /// Token sent as the bearer credential, if any.
    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// Replace the stored token, e.g. to replay an older one.
    pub fn set_token(&mut self, token: Option<AccessToken>) {
        self.token = token;
    }

    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<AccessToken, ClientError> {
        let body = CredentialsBody { username, password };
        let res: TokenResponse = self
            .send_json(self.request(Method::POST, "users/register")?.json(&body))
            .await?;
        Ok(self.remember(res))
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<AccessToken, ClientError> {
        let body = CredentialsBody { username, password };
        let res: TokenResponse = self
            .send_json(self.request(Method::POST, "users/login")?.json(&body))
            .await?;
        Ok(self.remember(res))
    }

    pub async fn change_password(&mut self, new_password: &str) -> Result<AccessToken, ClientError> {
        let body = ChangePasswordBody { new_password };
        let res: TokenResponse = self
            .send_json(self.request(Method::PATCH, "users/password")?.json(&body))
            .await?;
        Ok(self.remember(res))
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        self.send_json(self.request(Method::GET, "users/history")?)
            .await
    }

    pub async fn clear_history(&self) -> Result<(), ClientError> {
        self.send(self.request(Method::DELETE, "users/history")?)
            .await
            .map(drop)
    }

    pub async fn create_contact(&self, draft: &ContactDraft) -> Result<ContactId, ClientError> {
        let res: CreatedResponse = self
            .send_json(
                self.request(Method::POST, "contacts")?
                    .json(&ContactBody::from(draft)),
            )
            .await?;
        Ok(res.id)
    }

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, ClientError> {
        self.send_json(self.request(Method::GET, "contacts")?).await
    }

    pub async fn get_contact(&self, id: ContactId) -> Result<Contact, ClientError> {
        self.send_json(self.request(Method::GET, &format!("contacts/{}", id))?)
            .await
    }

    pub async fn update_contact(
        &self,
        id: ContactId,
        draft: &ContactDraft,
    ) -> Result<(), ClientError> {
        let _: MessageResponse = self
            .send_json(
                self.request(Method::PATCH, &format!("contacts/{}", id))?
                    .json(&ContactBody::from(draft)),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_contact(&self, id: ContactId) -> Result<(), ClientError> {
        self.send(self.request(Method::DELETE, &format!("contacts/{}", id))?)
            .await
            .map(drop)
    }

    pub async fn search_contacts(&self, term: &str) -> Result<Vec<Contact>, ClientError> {
        let body = SearchBody { search_term: term };
        self.send_json(self.request(Method::POST, "contacts/search")?.json(&body))
            .await
    }

    fn remember(&mut self, res: TokenResponse) -> AccessToken {
        let token = AccessToken::new(res.token);
        self.token = Some(token.clone());
        token
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.config.base_url.join(path)?;
        let builder = self.client.request(method, url);

        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = %status, url = %response.url(), "Response received");

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or(text);

        Err(ClientError::Status { status, message })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        Ok(self.send(builder).await?.json().await?)
    }
}
