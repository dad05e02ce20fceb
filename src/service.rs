use std::fmt;
use std::time::Duration;

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ureq::Agent;

use crate::Error;

/// Longest slice of a response body kept in error messages.
const BODY_EXCERPT_LEN: usize = 400;

/// One (from, to, date) lookup. Without a date the service answers with its latest rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    pub from: String,
    pub to: String,
    pub date: Option<Date>,
}

impl fmt::Display for RateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(f, "{}/{} {date}", self.from, self.to),
            None => write!(f, "{}/{} latest", self.from, self.to),
        }
    }
}

/// The `data` object of a successful response, also the content of the saved file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateData {
    pub from: String,
    pub to: String,
    /// Value of 1 unit of `from` in `to`
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    pub date: Date,
}

/// Anything that can answer a [`RateRequest`].
pub trait RateSource {
    fn fetch(&self, request: &RateRequest) -> Result<RateData, Error>;
}

/// The exchange-rate service, reached over HTTP.
pub struct HttpRateSource {
    agent: Agent,
    base_url: String,
    api_key: String,
}

impl HttpRateSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            // Non-2xx answers are turned into HttpError below, with their body
            .http_status_as_error(false)
            .build();

        Self {
            agent: Agent::new_with_config(config),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn url_for(&self, request: &RateRequest) -> String {
        build_url(&self.base_url, request)
    }
}

impl RateSource for HttpRateSource {
    fn fetch(&self, request: &RateRequest) -> Result<RateData, Error> {
        let url = self.url_for(request);
        tracing::info!("requesting {url}");

        let network_error = |e: ureq::Error| Error::NetworkError {
            url: url.clone(),
            reason: e.to_string(),
        };

        let mut resp = self
            .agent
            .post(&url)
            .send_form([("key", self.api_key.as_str())])
            .map_err(network_error)?;
        let status = resp.status();
        let body = match resp.body_mut().read_to_vec() {
            Ok(body) => body,
            Err(ureq::Error::BodyExceedsLimit(limit)) => {
                let details = format!("response body larger than {limit} bytes");
                return Err(if status.is_success() {
                    Error::MalformedResponse(details)
                } else {
                    Error::HttpError {
                        status: status.as_u16(),
                        body: details,
                    }
                });
            }
            Err(e) => return Err(network_error(e)),
        };

        if !status.is_success() {
            let details = excerpt(&body);
            return Err(Error::HttpError {
                status: status.as_u16(),
                body: if details.is_empty() {
                    "no details".to_string()
                } else {
                    details
                },
            });
        }

        decode_envelope(&body)
    }
}

/// `<base>/?from=F&to=T[&date=D]`
pub fn build_url(base_url: &str, request: &RateRequest) -> String {
    let mut url = format!(
        "{}/?from={}&to={}",
        base_url.trim_end_matches('/'),
        request.from,
        request.to
    );
    if let Some(date) = request.date {
        url.push_str(&format!("&date={date}"));
    }
    url
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Value,
}

/// Turn a response body of the form `{"error": "...", "data": {...}}` into a result.
///
/// The service reports failures with HTTP 200 and a non-empty `error`, so that field is
/// checked before `data` is looked at.
pub fn decode_envelope(body: &[u8]) -> Result<RateData, Error> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|e| {
        Error::MalformedResponse(format!("{e} (body: {})", excerpt(body)))
    })?;

    match envelope.error {
        Some(message) if !message.is_empty() => Err(Error::ServiceError(message)),
        _ => serde_json::from_value(envelope.data)
            .map_err(|e| Error::MalformedResponse(format!("unusable data object: {e}"))),
    }
}

fn excerpt(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .trim()
        .chars()
        .take(BODY_EXCERPT_LEN)
        .collect()
}
