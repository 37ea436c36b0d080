//! 10MinuteMail session implementation.

use crate::models::{
    AddressResponse, ExpiredResponse, ForwardBody, ForwardRequest, ReplyBody, ReplyRequest,
    ResetResponse, SecondsLeftResponse,
};
use crate::{Error, Message, Result};
use log::{debug, info, warn};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, SystemTime};
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long the service keeps a session alive after creation or renewal.
pub const SESSION_LIFETIME: Duration = Duration::from_secs(10 * 60);

const BASE_URL: &str = "https://10minutemail.com";
const USER_AGENT_VALUE: &str = concat!("tenminutemail-client/", env!("CARGO_PKG_VERSION"));
const SESSION_COOKIE: &str = "JSESSIONID";
const RESET_SENTINEL: &str = "reset";

const ENDPOINT_ADDRESS: &str = "session/address";
const ENDPOINT_EXPIRED: &str = "session/expired";
const ENDPOINT_RESET: &str = "session/reset";
const ENDPOINT_SECONDS_LEFT: &str = "session/secondsLeft";
const ENDPOINT_MESSAGES_AFTER: &str = "messages/messagesAfter";
const ENDPOINT_REPLY: &str = "messages/reply";
const ENDPOINT_FORWARD: &str = "messages/forward";

/// A live 10MinuteMail mailbox.
///
/// Use [`Session::new`] for defaults or [`Session::builder`] for a custom
/// base URL, timeout, proxy, or HTTP client.
///
/// Operations that move the message cursor or the expiry baseline take
/// `&mut self`. Share a session between tasks only behind a mutex.
#[derive(Debug)]
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    address: String,
    token: String,
    // Local clock reading taken before the create/reset request was sent.
    last_reset: SystemTime,
    // Number of messages already handed out; next `latest` starts here.
    received: u64,
}

impl Session {
    /// Create a builder for configuring the session.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Create a new session with a random address.
    ///
    /// # Examples
    /// ```no_run
    /// # use tenminutemail_client::Session;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tenminutemail_client::Error> {
    /// let session = Session::new().await?;
    /// println!("{}", session.address());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new() -> Result<Self> {
        SessionBuilder::new().build().await
    }

    /// The email address attached to this session.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The instant at which the session is due to expire.
    ///
    /// This is a local estimate, never later than the server's own timer.
    pub fn expires_at(&self) -> SystemTime {
        self.last_reset + SESSION_LIFETIME
    }

    /// Whether the session is due to have expired and needs renewal.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }

    /// Same as [`Session::is_expired`], evaluated at `now`.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now >= self.expires_at()
    }

    /// Number of messages received so far through [`Session::messages`]
    /// and [`Session::latest`].
    pub fn received_count(&self) -> u64 {
        self.received
    }

    /// Fetch every message received by this address.
    ///
    /// Also moves the cursor used by [`Session::latest`], so a following
    /// `latest` call only returns mail that arrived afterwards.
    pub async fn messages(&mut self) -> Result<Vec<Message>> {
        self.messages_after(0).await
    }

    /// Fetch the messages that this session has not returned before.
    ///
    /// # Examples
    /// ```no_run
    /// # use tenminutemail_client::Session;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tenminutemail_client::Error> {
    /// let mut session = Session::new().await?;
    /// for msg in session.latest().await? {
    ///     println!("{}: {}", msg.sender, msg.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn latest(&mut self) -> Result<Vec<Message>> {
        self.messages_after(self.received).await
    }

    async fn messages_after(&mut self, start: u64) -> Result<Vec<Message>> {
        let index = start.to_string();
        let messages: Vec<Message> = self
            .get_json(&[ENDPOINT_MESSAGES_AFTER, index.as_str()])
            .await?;

        self.received = start + messages.len() as u64;
        debug!(
            "fetched {} message(s) after index {start}, cursor now {}",
            messages.len(),
            self.received
        );

        Ok(messages)
    }

    /// Extend the session by another ten minutes.
    ///
    /// Returns `Ok(true)` only when the server confirms the reset. Any other
    /// answer yields `Ok(false)` and leaves [`Session::expires_at`] untouched;
    /// a session that keeps refusing is permanently expired.
    ///
    /// A session cookie set by the reset response replaces the current one.
    pub async fn renew(&mut self) -> Result<bool> {
        let reset_at = SystemTime::now();

        let response = self.get(&[ENDPOINT_RESET]).await?;
        if let Some(token) = session_cookie(&response) {
            debug!("server rotated the session cookie");
            self.token = token;
        }

        let body = response.bytes().await.map_err(Error::ReadBody)?;
        let response: ResetResponse = serde_json::from_slice(&body).map_err(Error::Decode)?;
        if response.response != RESET_SENTINEL {
            warn!("session reset not confirmed, server said {:?}", response.response);
            return Ok(false);
        }

        self.last_reset = reset_at;
        info!("renewed session for {}", self.address);
        Ok(true)
    }

    /// Seconds the server reports as remaining for this session.
    ///
    /// Informational only; it does not move [`Session::expires_at`].
    pub async fn seconds_left(&self) -> Result<i64> {
        let response: SecondsLeftResponse = self.get_json(&[ENDPOINT_SECONDS_LEFT]).await?;
        Ok(response.seconds_left)
    }

    /// Whether the server considers the session expired.
    pub async fn server_expired(&self) -> Result<bool> {
        let response: ExpiredResponse = self.get_json(&[ENDPOINT_EXPIRED]).await?;
        Ok(response.expired)
    }

    /// Reply to the sender of the message with the given ID.
    ///
    /// `Ok(false)` means the server declined, usually because the message
    /// is too old.
    pub async fn reply(&self, message_id: &str, body: &str) -> Result<bool> {
        let request = ReplyRequest {
            reply: ReplyBody {
                message_id,
                reply_body: body,
            },
        };
        self.post_action(ENDPOINT_REPLY, &request).await
    }

    /// Forward the message with the given ID to `recipient`.
    ///
    /// The server reports success even for invalid recipients or mail that
    /// bounces later, so `Ok(true)` is not a delivery confirmation.
    pub async fn forward(&self, message_id: &str, recipient: &str) -> Result<bool> {
        let request = ForwardRequest {
            forward: ForwardBody {
                message_id,
                forward_address: recipient,
            },
        };
        self.post_action(ENDPOINT_FORWARD, &request).await
    }

    /// Authenticated GET returning the raw response.
    async fn get(&self, segments: &[&str]) -> Result<reqwest::Response> {
        let url = endpoint(&self.base_url, segments);
        debug!("GET {url}");

        let request = self
            .http
            .get(url)
            .header(COOKIE, self.cookie()?)
            .build()
            .map_err(Error::BuildRequest)?;

        let response = self.http.execute(request).await.map_err(Error::Request)?;
        check_blocked(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let body = self
            .get(segments)
            .await?
            .bytes()
            .await
            .map_err(Error::ReadBody)?;

        serde_json::from_slice(&body).map_err(Error::Decode)
    }

    /// Authenticated JSON POST whose outcome is carried by the status code.
    async fn post_action<B: Serialize>(&self, path: &str, body: &B) -> Result<bool> {
        let payload = serde_json::to_vec(body).map_err(Error::Encode)?;
        let url = endpoint(&self.base_url, &[path]);
        debug!("POST {url}");

        let request = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(COOKIE, self.cookie()?)
            .body(payload)
            .build()
            .map_err(Error::BuildRequest)?;

        let response = self.http.execute(request).await.map_err(Error::Request)?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::FORBIDDEN => {
                warn!("{url} answered 403");
                Err(Error::BlockedByServer)
            }
            status => {
                warn!("{url} declined with status {status}");
                Ok(false)
            }
        }
    }

    fn cookie(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&format!("{SESSION_COOKIE}={}", self.token))
            .map_err(|_| Error::MissingSession)
    }
}

/// Builder for configuring a 10MinuteMail session.
///
/// Start with [`Session::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    base_url: String,
    timeout: Duration,
    proxy: Option<String>,
    user_agent: String,
    danger_accept_invalid_certs: bool,
    client: Option<reqwest::Client>,
}

impl SessionBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - `https://10minutemail.com` as base URL
    /// - [`DEFAULT_TIMEOUT`] per request
    /// - No proxy
    /// - Strict TLS validation
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
            user_agent: USER_AGENT_VALUE.to_string(),
            danger_accept_invalid_certs: false,
            client: None,
        }
    }

    /// Override the service base URL.
    ///
    /// Useful for testing against a local mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bound each request by `timeout`. Timeouts surface as [`Error::Request`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:9050").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Control whether to accept invalid TLS certificates (default: false).
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Use a preconfigured HTTP client.
    ///
    /// Timeout, proxy, user agent and TLS settings on this builder are
    /// ignored when a client is supplied.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the HTTP client and open a session.
    ///
    /// This performs one request to obtain the address and session cookie.
    ///
    /// # Examples
    /// ```no_run
    /// # use std::time::Duration;
    /// # use tenminutemail_client::Session;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tenminutemail_client::Error> {
    /// let session = Session::builder()
    ///     .timeout(Duration::from_secs(5))
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<Session> {
        let base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let http = match self.client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder()
                    .timeout(self.timeout)
                    .user_agent(self.user_agent)
                    .danger_accept_invalid_certs(self.danger_accept_invalid_certs);

                if let Some(proxy_url) = &self.proxy {
                    builder =
                        builder.proxy(reqwest::Proxy::all(proxy_url).map_err(Error::BuildRequest)?);
                }

                builder.build().map_err(Error::BuildRequest)?
            }
        };

        // Assume the session started before the request went out so the
        // local expiry never runs past the server's.
        let last_reset = SystemTime::now();

        let url = endpoint(&base_url, &[ENDPOINT_ADDRESS]);
        debug!("GET {url}");
        let request = http.get(url).build().map_err(Error::BuildRequest)?;
        let response = check_blocked(http.execute(request).await.map_err(Error::Request)?)?;

        let token = session_cookie(&response);

        let body = response.bytes().await.map_err(Error::ReadBody)?;
        let token = token.ok_or(Error::MissingSession)?;
        let AddressResponse { address } =
            serde_json::from_slice(&body).map_err(Error::Decode)?;

        info!("opened session for {address}");

        Ok(Session {
            http,
            base_url,
            address,
            token,
            last_reset,
            received: 0,
        })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_blocked(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status() == StatusCode::FORBIDDEN {
        warn!("{} answered 403", response.url());
        return Err(Error::BlockedByServer);
    }
    Ok(response)
}

fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Append path segments to the path of `base`, keeping its query.
///
/// `base` must be able to carry a path; [`SessionBuilder::build`] rejects
/// bases that cannot.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        for segment in segments {
            path.extend(segment.split('/').filter(|part| !part.is_empty()));
        }
    }
    url
}

/// Append path segments to a base URL, one `/` between each part.
///
/// The base is returned as given when there is nothing to append.
pub fn join(base: &str, segments: &[&str]) -> Result<String> {
    let url = Url::parse(base)?;
    if segments.iter().all(|segment| segment.trim_matches('/').is_empty()) {
        return Ok(base.to_string());
    }
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
    }
    Ok(endpoint(&url, segments).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_reset_at(last_reset: SystemTime) -> Session {
        Session {
            http: reqwest::Client::new(),
            base_url: Url::parse(BASE_URL).unwrap(),
            address: "someone@10minutemail.com".to_string(),
            token: "token".to_string(),
            last_reset,
            received: 0,
        }
    }

    #[test]
    fn expiry_boundary() {
        let baseline = SystemTime::now();
        let session = session_reset_at(baseline);
        let deadline = baseline + SESSION_LIFETIME;

        assert_eq!(session.expires_at(), deadline);
        assert!(!session.is_expired_at(baseline));
        assert!(!session.is_expired_at(deadline - Duration::from_nanos(1)));
        assert!(session.is_expired_at(deadline));
        assert!(session.is_expired_at(deadline + Duration::from_secs(1)));
    }

    #[test]
    fn fresh_session_not_expired() {
        assert!(!session_reset_at(SystemTime::now()).is_expired());
    }

    #[test]
    fn old_session_expired() {
        assert!(session_reset_at(SystemTime::now() - SESSION_LIFETIME).is_expired());
    }

    #[test]
    fn join_segments() {
        let cases: &[(&str, &[&str], &str)] = &[
            ("https://example.com", &["mypath"], "https://example.com/mypath"),
            ("https://example.com", &[], "https://example.com"),
            (
                "https://example.com",
                &["one", "two", "three"],
                "https://example.com/one/two/three",
            ),
            (
                "https://example.com/",
                &["messages/messagesAfter", "3"],
                "https://example.com/messages/messagesAfter/3",
            ),
            (
                "https://example.com/?lang=en",
                &["session/address"],
                "https://example.com/session/address?lang=en",
            ),
            ("https://example.com/a/../b", &["x"], "https://example.com/b/x"),
            ("https://example.com/api/", &["reset"], "https://example.com/api/reset"),
        ];

        for (base, segments, want) in cases {
            assert_eq!(
                join(base, segments).unwrap(),
                *want,
                "joining {segments:?} onto {base}"
            );
        }
    }

    #[test]
    fn join_rejects_unusable_base() {
        assert!(matches!(join("not a url", &["x"]), Err(Error::InvalidUrl(_))));
        assert!(matches!(
            join("mailto:someone@example.com", &["x"]),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn endpoint_keeps_query() {
        let base = Url::parse("http://127.0.0.1:8080/?lang=en").unwrap();
        let url = endpoint(&base, &[ENDPOINT_MESSAGES_AFTER, "4"]);
        assert_eq!(url.path(), "/messages/messagesAfter/4");
        assert_eq!(url.query(), Some("lang=en"));
    }

    #[test]
    fn cookie_header_carries_token() {
        let session = session_reset_at(SystemTime::now());
        assert_eq!(session.cookie().unwrap(), "JSESSIONID=token");
    }
}
