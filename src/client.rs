//! Async client for the mailbox REST backend.

use crate::{Attachment, Error, Message, MessageHeader, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Async client for the mailbox REST API.
///
/// Use [`Client::new`] for a local backend or [`Client::builder`] for custom
/// endpoints, proxies, and timeouts.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    api_url: Url,
    serve_url: Url,
    proxy: Option<String>,
}

#[derive(Serialize)]
struct SeenPatch {
    seen: bool,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for a backend on `localhost:9000`.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Get the proxy URL if one was configured.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// List the message headers of a mailbox, in the order the backend stores them.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailbox_view::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), mailbox_view::Error> {
    /// let client = Client::new()?;
    /// for header in client.list_mailbox("swaks").await? {
    ///     println!("{}: {}", header.from, header.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_mailbox(&self, name: &str) -> Result<Vec<MessageHeader>> {
        let url = endpoint(&self.api_url, &["mailbox", name])?;
        self.get_json(url).await
    }

    /// Fetch a full message, including bodies and attachment metadata.
    pub async fn get_message(&self, mailbox: &str, id: &str) -> Result<Message> {
        let url = endpoint(&self.api_url, &["message", mailbox, id])?;
        self.get_json(url).await
    }

    /// Flag a message as seen with `PATCH {"seen": true}`.
    pub async fn mark_seen(&self, mailbox: &str, id: &str) -> Result<()> {
        let url = endpoint(&self.api_url, &["message", mailbox, id])?;
        self.http
            .patch(url)
            .json(&SeenPatch { seen: true })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Delete a single message.
    pub async fn delete_message(&self, mailbox: &str, id: &str) -> Result<()> {
        let url = endpoint(&self.api_url, &["message", mailbox, id])?;
        self.http.delete(url).send().await?.error_for_status()?;
        Ok(())
    }

    /// Delete every message in a mailbox.
    pub async fn purge_mailbox(&self, name: &str) -> Result<()> {
        let url = endpoint(&self.api_url, &["mailbox", name])?;
        self.http.delete(url).send().await?.error_for_status()?;
        Ok(())
    }

    /// Link to the raw RFC 822 source of a message.
    pub fn source_url(&self, mailbox: &str, id: &str) -> Result<Url> {
        endpoint(&self.serve_url, &["mailbox", mailbox, id, "source"])
    }

    /// Download link for one attachment of a message.
    pub fn attachment_url(&self, mailbox: &str, id: &str, attachment: &Attachment) -> Result<Url> {
        endpoint(
            &self.serve_url,
            &[
                "mailbox",
                mailbox,
                id,
                "attach",
                attachment.id.as_str(),
                attachment.filename.as_str(),
            ],
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        serde_json::from_str(&body).map_err(Into::into)
    }
}

/// RFC 3986 unreserved characters pass through; everything else is escaped.
const ROUTE_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Application route of a message, used for the navigate signal.
pub fn message_path(mailbox: &str, id: &str) -> String {
    format!(
        "/m/{}/{}",
        utf8_percent_encode(mailbox, ROUTE_SEGMENT),
        utf8_percent_encode(id, ROUTE_SEGMENT)
    )
}

/// Append percent-encoded path segments to a base URL.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::BaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

const API_URL: &str = "http://localhost:9000/api/v1";
const SERVE_URL: &str = "http://localhost:9000/serve";
const USER_AGENT_VALUE: &str = concat!("mailbox-view/", env!("CARGO_PKG_VERSION"));

/// Builder for configuring a [`Client`].
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_url: String,
    serve_url: String,
    proxy: Option<String>,
    timeout: Option<Duration>,
    danger_accept_invalid_certs: bool,
    user_agent: String,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - API at `http://localhost:9000/api/v1`
    /// - Static links under `http://localhost:9000/serve`
    /// - No proxy, no timeout
    /// - `danger_accept_invalid_certs = false`
    pub fn new() -> Self {
        Self {
            api_url: API_URL.to_string(),
            serve_url: SERVE_URL.to_string(),
            proxy: None,
            timeout: None,
            danger_accept_invalid_certs: false,
            user_agent: USER_AGENT_VALUE.to_string(),
        }
    }

    /// Override the REST API root (the prefix of `/mailbox/...` and `/message/...`).
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the root of static `/serve/...` links.
    pub fn serve_url(mut self, serve_url: impl Into<String>) -> Self {
        self.serve_url = serve_url.into();
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:9050").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Control whether to accept invalid TLS certificates (default: false).
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailbox_view::Client;
    /// # fn main() -> Result<(), mailbox_view::Error> {
    /// let client = Client::builder()
    ///     .api_url("https://mail.example.test/api/v1")
    ///     .serve_url("https://mail.example.test/serve")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Client> {
        let api_url = Url::parse(&self.api_url)?;
        let serve_url = Url::parse(&self.serve_url)?;
        for url in [&api_url, &serve_url] {
            if url.cannot_be_a_base() {
                return Err(Error::BaseUrl(url.to_string()));
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(self.user_agent)
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Client {
            http: builder.build()?,
            api_url,
            serve_url,
            proxy: self.proxy,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
