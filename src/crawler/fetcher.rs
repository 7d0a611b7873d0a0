//! Retry-wrapped fetching over an abstract transport
//!
//! The fetcher is a policy layer: the [`Transport`] capability performs one
//! request; [`classify`] decides what an attempt outcome means; the fetcher
//! loops attempts with bounded backoff and produces a [`FetchResult`].
//!
//! Retry ladder (at most 3 attempts per target):
//!
//! | Outcome            | Action                                        |
//! |--------------------|-----------------------------------------------|
//! | HTTP 404           | Terminal, no retry                            |
//! | HTTP 429           | Retry after backoff x 5                       |
//! | Other HTTP >= 400  | Retry after backoff, backoff doubles          |
//! | Timeout            | Retry after backoff, backoff doubles          |
//! | Connection error   | Retry after backoff, backoff doubles          |
//! | Other transport    | Terminal immediately                          |

use std::time::Duration;
use thiserror::Error;

/// Maximum attempts per target
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff before the first retry; doubles after each retry
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Browser-like user agent for the plain HTTP transport
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/131.0.0.0 Safari/537.36 sitemirror/1.0";

/// One raw response from the transport capability
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Transport-level failures, classified for retry decisions
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection error")]
    Connect,

    #[error("{0}")]
    Other(String),
}

/// The page-transport capability
///
/// One implementation wraps a plain HTTP client; a scripted rendering
/// backend would implement the same trait and hand back fully-rendered
/// markup. Tests substitute scripted transports.
pub trait Transport {
    fn perform(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl std::future::Future<Output = Result<RawResponse, TransportError>>;
}

/// What kind of resource a fetch expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// A markup page; non-markup content types are skipped, not errors
    Page,
    /// A binary attachment; the body is taken as-is
    Attachment,
}

/// Result of a fetch, after all retries
#[derive(Debug)]
pub enum FetchResult {
    /// Markup content, decoded as UTF-8 text
    Markup { body: String, content_type: String },

    /// Binary attachment content
    Binary { bytes: Vec<u8>, content_type: String },

    /// The server answered, but not with markup; nothing to mirror
    NotMarkup { content_type: String },

    /// Terminal failure; the reason goes into the failure ledger
    Failure { reason: String },
}

/// Outcome of a single fetch attempt, as seen by the retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Status(u16),
    Timeout,
    Connect,
    Other(String),
}

/// Decision for one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The attempt succeeded; use the response
    Success,

    /// Try again after `delay`; `next_backoff` feeds the following attempt
    Retry {
        delay: Duration,
        next_backoff: Duration,
    },

    /// Give up with a ledger reason
    Terminal { reason: String },
}

/// Classifies one attempt outcome into a retry decision
///
/// Pure function of (outcome, attempt number, current backoff), so the
/// whole retry ladder is testable without networking.
pub fn classify(outcome: &AttemptOutcome, attempt: u32, backoff: Duration) -> Decision {
    let exhausted = attempt >= MAX_ATTEMPTS;
    let retry_or = |reason: String| {
        if exhausted {
            Decision::Terminal { reason }
        } else {
            Decision::Retry {
                delay: backoff,
                next_backoff: backoff * 2,
            }
        }
    };

    match outcome {
        AttemptOutcome::Status(s) if (200..300).contains(s) => Decision::Success,

        AttemptOutcome::Status(404) => Decision::Terminal {
            reason: "HTTP 404".to_string(),
        },

        // Rate limited: wait much longer, but the attempt ceiling still holds
        AttemptOutcome::Status(429) => {
            if exhausted {
                Decision::Terminal {
                    reason: "HTTP 429".to_string(),
                }
            } else {
                Decision::Retry {
                    delay: backoff * 5,
                    next_backoff: backoff * 2,
                }
            }
        }

        AttemptOutcome::Status(s) => retry_or(format!("HTTP {}", s)),

        AttemptOutcome::Timeout => retry_or("Timeout".to_string()),

        AttemptOutcome::Connect => retry_or("Connection error".to_string()),

        AttemptOutcome::Other(msg) => Decision::Terminal {
            reason: msg.chars().take(100).collect(),
        },
    }
}

/// Retry-wrapping fetcher over a transport capability
pub struct Fetcher<T: Transport> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// The underlying transport capability
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches a URL, retrying per [`classify`], and shapes the result by
    /// the expected content kind
    pub async fn fetch(&self, url: &str, kind: FetchKind) -> FetchResult {
        let mut backoff = INITIAL_BACKOFF;

        for attempt in 1..=MAX_ATTEMPTS {
            let (outcome, response) = match self.transport.perform(url, self.timeout).await {
                Ok(resp) => (AttemptOutcome::Status(resp.status), Some(resp)),
                Err(TransportError::Timeout) => (AttemptOutcome::Timeout, None),
                Err(TransportError::Connect) => (AttemptOutcome::Connect, None),
                Err(TransportError::Other(msg)) => (AttemptOutcome::Other(msg), None),
            };

            match classify(&outcome, attempt, backoff) {
                Decision::Success => {
                    // classify only returns Success for a real response
                    if let Some(resp) = response {
                        return self.shape(resp, kind);
                    }
                }
                Decision::Retry {
                    delay,
                    next_backoff,
                } => {
                    tracing::info!(
                        "Attempt {}/{} for {} failed ({:?}), retrying in {:?}",
                        attempt,
                        MAX_ATTEMPTS,
                        url,
                        outcome,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    backoff = next_backoff;
                }
                Decision::Terminal { reason } => {
                    return FetchResult::Failure { reason };
                }
            }
        }

        // The loop always returns from the final attempt; classify never
        // yields Retry once attempts are exhausted
        FetchResult::Failure {
            reason: "Retries exhausted".to_string(),
        }
    }

    /// Shapes a successful response by the expected content kind
    fn shape(&self, resp: RawResponse, kind: FetchKind) -> FetchResult {
        match kind {
            FetchKind::Attachment => FetchResult::Binary {
                bytes: resp.body,
                content_type: resp.content_type,
            },
            FetchKind::Page => {
                if is_markup_type(&resp.content_type) {
                    FetchResult::Markup {
                        body: String::from_utf8_lossy(&resp.body).into_owned(),
                        content_type: resp.content_type,
                    }
                } else {
                    FetchResult::NotMarkup {
                        content_type: resp.content_type,
                    }
                }
            }
        }
    }
}

/// Checks whether a declared content type is a markup type
fn is_markup_type(content_type: &str) -> bool {
    let ct = content_type.to_lowercase();
    // An absent Content-Type is assumed to be markup
    ct.is_empty() || ct.contains("text/html") || ct.contains("application/xhtml")
}

/// Plain request/response transport backed by reqwest
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds the HTTP client used for the entire run
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn perform(&self, url: &str, timeout: Duration) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(map_reqwest_error)?
            .to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect
    } else {
        TransportError::Other(e.to_string())
    }
}
