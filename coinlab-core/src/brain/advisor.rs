//! Advisory capability — an injected, bounded position-size opinion.
//!
//! The advisor is consulted only after scoring has already fixed the
//! direction and the levels are placed; its answer can scale the size
//! and nothing else. Implementations never panic on bad input; every
//! failure mode maps to an `AdvisorError` and the caller falls back to
//! multiplier 1.0.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{AccountContext, Direction};
use crate::error::AdvisorError;

/// Advisory multipliers outside this range are rejected as malformed.
pub const MIN_MULTIPLIER: f64 = 0.5;
pub const MAX_MULTIPLIER: f64 = 2.0;

/// Everything the advisor is allowed to see about a pending entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    pub coin: String,
    pub direction: Direction,
    /// Winning weighted score from the scoring phase.
    pub score: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub account: AccountContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryResponse {
    /// Position-size multiplier; valid range [0.5, 2.0].
    pub multiplier: f64,
    #[serde(default)]
    pub reason: String,
}

/// A bounded source of position-size multipliers.
pub trait Advisor {
    fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisorError>;
}

/// No advisory input: always multiplier 1.0. The backtest default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAdvisor;

impl Advisor for NullAdvisor {
    fn advise(&self, _request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisorError> {
        Ok(AdvisoryResponse {
            multiplier: 1.0,
            reason: String::new(),
        })
    }
}

/// JSON-over-HTTP advisor with a hard request timeout.
///
/// The brain calls `advise` synchronously inside the decision cycle, so
/// the timeout bounds decision latency directly.
pub struct HttpAdvisor {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpAdvisor {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AdvisorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisorError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl Advisor for HttpAdvisor {
    fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisorError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    AdvisorError::Timeout
                } else {
                    AdvisorError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(AdvisorError::Transport(format!(
                "advisory endpoint returned {}",
                response.status()
            )));
        }

        let parsed: AdvisoryResponse = response
            .json()
            .map_err(|e| AdvisorError::Malformed(e.to_string()))?;

        if !parsed.multiplier.is_finite()
            || !(MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&parsed.multiplier)
        {
            return Err(AdvisorError::Malformed(format!(
                "multiplier {} outside [{MIN_MULTIPLIER}, {MAX_MULTIPLIER}]",
                parsed.multiplier
            )));
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AdvisoryRequest {
        AdvisoryRequest {
            coin: "BTC".to_string(),
            direction: Direction::Long,
            score: 0.8,
            entry_price: 100.0,
            stop_loss: 97.0,
            take_profit: 106.0,
            account: AccountContext::derive(10_000.0, None),
        }
    }

    #[test]
    fn null_advisor_is_identity() {
        let resp = NullAdvisor.advise(&request()).unwrap();
        assert_eq!(resp.multiplier, 1.0);
    }

    #[test]
    fn request_serializes_with_snake_case_fields() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(json["direction"], "long");
        assert!(json["account"]["balance"].is_number());
    }

    #[test]
    fn response_reason_defaults_to_empty() {
        let resp: AdvisoryResponse = serde_json::from_str(r#"{"multiplier": 1.3}"#).unwrap();
        assert_eq!(resp.multiplier, 1.3);
        assert!(resp.reason.is_empty());
    }
}
