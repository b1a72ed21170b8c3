use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::client::API_KEY_PARAM;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

/// Something that can GET a URL and hand back the response body.
///
/// HTTP error statuses are not errors here: their body is returned like any
/// other so the XML parser can look at it.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<String>;
}

/// Blocking reqwest transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bustracker-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::HttpClient)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| transport_error(url, e))?;

        response.text().map_err(|e| transport_error(url, e))
    }
}

fn transport_error(url: &Url, e: reqwest::Error) -> Error {
    // Connection, DNS, timeout and interrupted-body failures are worth retrying.
    let transient = e.is_timeout() || e.is_connect() || e.is_request() || e.is_body();
    Error::Transport {
        url: redacted(url),
        transient,
        source: Box::new(e.without_url()),
    }
}

/// The URL with the API key removed, for logs and error messages.
pub fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != API_KEY_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    if pairs.is_empty() {
        shown.set_query(None);
    } else {
        shown.query_pairs_mut().clear().extend_pairs(pairs);
    }
    shown.to_string()
}

/// GETs `url`, retrying transient failures according to `policy`.
pub fn fetch_with_retry<T>(transport: &T, url: &Url, policy: &RetryPolicy) -> Result<String>
where
    T: Transport + ?Sized,
{
    let shown = redacted(url);
    policy.run(
        |attempt| {
            debug!("Fetching {} (attempt {}/{})", shown, attempt, policy.max_attempts);
            transport.get(url)
        },
        Error::is_transient,
    )
}
