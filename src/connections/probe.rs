//! Connectivity checks against a profile's endpoint.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{info, warn};

use super::model::{ConnectionProfile, ProfileId};

/// Upper bound on a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Path appended to the endpoint for the probe request.
const PROBE_PATH: &str = "/user";

const PROBE_USER_AGENT: &str = concat!("connection-settings/", env!("CARGO_PKG_VERSION"));

/// Result of one probe. All three are ordinary values; a probe never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The endpoint answered with a 2xx status.
    Reachable { status: u16 },
    /// The endpoint answered, but not with success (bad token, wrong path, ...).
    Unreachable { status: u16 },
    /// No response: empty or malformed endpoint, transport failure, or timeout.
    ProbeError { detail: String },
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable { status } => write!(f, "Connection successful (HTTP {status})"),
            Self::Unreachable { status } => write!(f, "Connection failed (HTTP {status})"),
            Self::ProbeError { detail } => {
                write!(f, "An error occurred while testing the connection: {detail}")
            }
        }
    }
}

/// A probe outcome tied to the profile it was run against.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub profile_id: ProfileId,
    pub endpoint: String,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
    pub checked_at: DateTime<Utc>,
}

impl ProbeReport {
    pub fn new(profile: &ConnectionProfile, outcome: ProbeOutcome) -> Self {
        Self {
            profile_id: profile.id,
            endpoint: profile.endpoint.clone(),
            outcome,
            checked_at: Utc::now(),
        }
    }
}

/// Issues a single authenticated `GET <endpoint>/user` per probe. No retries.
pub struct ConnectivityChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl ConnectivityChecker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Probe `profile`'s endpoint with its credential. Logs the outcome.
    pub async fn probe(&self, profile: &ConnectionProfile) -> ProbeOutcome {
        info!(profile_id = %profile.id, endpoint = %profile.log_endpoint(), "Testing connection");

        let outcome = self
            .check(&profile.endpoint, profile.credential.expose_secret())
            .await;

        match &outcome {
            ProbeOutcome::Reachable { status } => {
                info!(profile_id = %profile.id, status, "Connection successful");
            }
            ProbeOutcome::Unreachable { status } => {
                warn!(profile_id = %profile.id, status, "Connection failed");
            }
            ProbeOutcome::ProbeError { detail } => {
                warn!(profile_id = %profile.id, error = %detail, "Connection test errored");
            }
        }
        outcome
    }

    /// Probe and wrap the outcome in a timestamped report.
    pub async fn report(&self, profile: &ConnectionProfile) -> ProbeReport {
        let outcome = self.probe(profile).await;
        ProbeReport::new(profile, outcome)
    }

    async fn check(&self, endpoint: &str, credential: &str) -> ProbeOutcome {
        let Some(url) = probe_url(endpoint) else {
            return ProbeOutcome::ProbeError {
                detail: "endpoint is empty".to_string(),
            };
        };

        // An unencodable header value surfaces from send() as a builder error.
        let result = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("token {credential}"))
            .header(USER_AGENT, PROBE_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => ProbeOutcome::Reachable {
                status: resp.status().as_u16(),
            },
            Ok(resp) => ProbeOutcome::Unreachable {
                status: resp.status().as_u16(),
            },
            Err(e) if e.is_timeout() => ProbeOutcome::ProbeError {
                detail: format!("timed out after {}s", self.timeout.as_secs_f32()),
            },
            Err(e) => ProbeOutcome::ProbeError {
                detail: e.without_url().to_string(),
            },
        }
    }
}

impl Default for ConnectivityChecker {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

/// `<endpoint>/user`, or `None` for a blank endpoint.
fn probe_url(endpoint: &str) -> Option<String> {
    let base = endpoint.trim().trim_end_matches('/');
    if base.is_empty() {
        return None;
    }
    Some(format!("{base}{PROBE_PATH}"))
}
