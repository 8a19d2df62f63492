use anyhow::Context;
use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;

use super::{
    ChannelParser, ChannelStream, EVENTS_PATH, SESSIONS_PATH, SessionSource, SourceError,
    SourceErrorKind, SourceResult,
};
use crate::model::SessionRecord;

/// Standard User-Agent header for neckview requests.
pub const USER_AGENT: &str = concat!("neckview/", env!("CARGO_PKG_VERSION"));

/// Session source backed by the server's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpSessionSource {
    http: reqwest::Client,
    sessions_url: Url,
    events_url: Url,
}

impl HttpSessionSource {
    /// Creates a source for the server at `base`.
    ///
    /// Endpoint paths are resolved relative to `base`, so a base of
    /// `http://host:8080/neck/` targets `http://host:8080/neck/api/sessions`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or `base` cannot
    /// be joined with the endpoint paths.
    pub fn new(base: &Url) -> anyhow::Result<Self> {
        let base = with_trailing_slash(base);
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            sessions_url: base.join(SESSIONS_PATH).context("Invalid sessions URL")?,
            events_url: base.join(EVENTS_PATH).context("Invalid events URL")?,
        })
    }

    pub fn sessions_url(&self) -> &Url {
        &self.sessions_url
    }

    pub fn events_url(&self) -> &Url {
        &self.events_url
    }

    async fn get_sessions(&self) -> SourceResult<Vec<SessionRecord>> {
        debug!(url = %self.sessions_url, "fetching sessions");
        let response = self
            .http
            .get(self.sessions_url.clone())
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::http_status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        serde_json::from_slice(&body).map_err(|err| {
            SourceError::new(
                SourceErrorKind::Parse,
                format!("Failed to parse session list: {err}"),
            )
        })
    }

    async fn connect_channel(&self) -> SourceResult<ChannelStream> {
        debug!(url = %self.events_url, "opening event channel");
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let response = self
            .http
            .get(self.events_url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::http_status(status.as_u16()));
        }

        Ok(ChannelParser::new(response.bytes_stream()).boxed())
    }
}

impl SessionSource for HttpSessionSource {
    fn fetch_sessions(&self) -> BoxFuture<'_, SourceResult<Vec<SessionRecord>>> {
        Box::pin(self.get_sessions())
    }

    fn open_channel(&self) -> BoxFuture<'_, SourceResult<ChannelStream>> {
        Box::pin(self.connect_channel())
    }
}

fn with_trailing_slash(base: &Url) -> Url {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn classify_reqwest_error(e: &reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::new(SourceErrorKind::Transport, format!("Request timed out: {e}"))
    } else if e.is_connect() {
        SourceError::new(SourceErrorKind::Transport, format!("Connection failed: {e}"))
    } else if e.is_decode() || e.is_body() {
        SourceError::new(SourceErrorKind::Parse, format!("Bad response body: {e}"))
    } else {
        SourceError::new(SourceErrorKind::Transport, format!("Network error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::model::SessionState;
    use crate::source::ChannelEvent;

    fn source_for(server: &MockServer) -> HttpSessionSource {
        let base = Url::parse(&server.uri()).unwrap();
        HttpSessionSource::new(&base).unwrap()
    }

    #[test]
    fn test_endpoints_resolve_relative_to_base_path() {
        let base = Url::parse("http://localhost:1080/neck").unwrap();
        let source = HttpSessionSource::new(&base).unwrap();

        assert_eq!(
            source.sessions_url().as_str(),
            "http://localhost:1080/neck/api/sessions"
        );
        assert_eq!(
            source.events_url().as_str(),
            "http://localhost:1080/neck/api/events"
        );
    }

    #[tokio::test]
    async fn test_fetch_sessions_parses_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "timestamp": 1000, "proto": "http", "host": "a:80", "from": "1.1.1.1:1", "state": 0},
                {"id": 2, "timestamp": 2000, "proto": "socks5", "host": "b:443", "from": "1.1.1.1:2", "state": 2}
            ])))
            .mount(&server)
            .await;

        let records = source_for(&server).fetch_sessions().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id.as_str(), "2");
        assert_eq!(records[1].state, SessionState::Established);
    }

    #[tokio::test]
    async fn test_fetch_sessions_rejects_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = source_for(&server).fetch_sessions().await.unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_fetch_sessions_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sessions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source_for(&server).fetch_sessions().await.unwrap_err();

        assert_eq!(err, SourceError::http_status(503));
    }

    #[tokio::test]
    async fn test_fetch_sessions_unreachable_server_is_transport_error() {
        // Reserve a free port, then release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let base = Url::parse(&format!("http://{addr}/")).unwrap();
        let source = HttpSessionSource::new(&base).unwrap();

        let err = source.fetch_sessions().await.unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_open_channel_streams_events() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .and(header("accept", "text/event-stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string("event: init\ndata: ok\n\nevent: update\ndata: 1\n\n"),
            )
            .mount(&server)
            .await;

        let mut channel = source_for(&server).open_channel().await.unwrap();

        assert_eq!(channel.next().await.unwrap().unwrap(), ChannelEvent::Init);
        assert_eq!(channel.next().await.unwrap().unwrap(), ChannelEvent::Update);
        assert!(channel.next().await.is_none());
    }

    #[tokio::test]
    async fn test_open_channel_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = source_for(&server).open_channel().await;

        assert!(matches!(result, Err(e) if e.kind == SourceErrorKind::HttpStatus));
    }
}
