//! Phase C: position sizing with a bounded advisory multiplier.
//!
//! The advisor can scale the base size within [0.5, 2.0]; anything it
//! does wrong (timeout, transport failure, garbage multiplier) collapses
//! to multiplier 1.0 with a warning. The strategy's `max_size_pct`
//! remains a hard cap no multiplier can pierce.

use tracing::{debug, warn};

use crate::brain::advisor::{Advisor, AdvisoryRequest, MAX_MULTIPLIER, MIN_MULTIPLIER};
use crate::domain::RiskConfig;

/// Ask the advisor for a multiplier; any failure or out-of-range answer
/// degrades to 1.0.
pub fn resolve_multiplier<A: Advisor>(advisor: &A, request: &AdvisoryRequest) -> f64 {
    match advisor.advise(request) {
        Ok(response) => {
            let m = response.multiplier;
            if !m.is_finite() || !(MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&m) {
                warn!(
                    coin = %request.coin,
                    multiplier = m,
                    "advisory multiplier out of range, using 1.0"
                );
                return 1.0;
            }
            if !response.reason.is_empty() {
                debug!(coin = %request.coin, multiplier = m, reason = %response.reason, "advisory multiplier");
            }
            m
        }
        Err(err) => {
            warn!(coin = %request.coin, error = %err, "advisory call failed, using 1.0");
            1.0
        }
    }
}

/// Final size fraction: base scaled by the multiplier, capped at the
/// strategy maximum.
pub fn position_size_pct(risk: &RiskConfig, multiplier: f64) -> f64 {
    (risk.base_size_pct * multiplier).min(risk.max_size_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::advisor::{AdvisoryResponse, NullAdvisor};
    use crate::domain::{AccountContext, Direction};
    use crate::error::AdvisorError;

    struct FixedAdvisor(f64);

    impl Advisor for FixedAdvisor {
        fn advise(&self, _r: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisorError> {
            Ok(AdvisoryResponse {
                multiplier: self.0,
                reason: String::new(),
            })
        }
    }

    struct FailingAdvisor;

    impl Advisor for FailingAdvisor {
        fn advise(&self, _r: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisorError> {
            Err(AdvisorError::Timeout)
        }
    }

    fn request() -> AdvisoryRequest {
        AdvisoryRequest {
            coin: "BTC".to_string(),
            direction: Direction::Long,
            score: 0.7,
            entry_price: 100.0,
            stop_loss: 97.0,
            take_profit: 106.0,
            account: AccountContext::derive(10_000.0, None),
        }
    }

    #[test]
    fn null_advisor_yields_one() {
        assert_eq!(resolve_multiplier(&NullAdvisor, &request()), 1.0);
    }

    #[test]
    fn in_range_multiplier_passes_through() {
        assert_eq!(resolve_multiplier(&FixedAdvisor(1.6), &request()), 1.6);
        assert_eq!(resolve_multiplier(&FixedAdvisor(0.5), &request()), 0.5);
        assert_eq!(resolve_multiplier(&FixedAdvisor(2.0), &request()), 2.0);
    }

    #[test]
    fn out_of_range_degrades_to_one() {
        assert_eq!(resolve_multiplier(&FixedAdvisor(0.0), &request()), 1.0);
        assert_eq!(resolve_multiplier(&FixedAdvisor(5.0), &request()), 1.0);
        assert_eq!(resolve_multiplier(&FixedAdvisor(-1.0), &request()), 1.0);
        assert_eq!(resolve_multiplier(&FixedAdvisor(f64::NAN), &request()), 1.0);
        assert_eq!(
            resolve_multiplier(&FixedAdvisor(f64::INFINITY), &request()),
            1.0
        );
    }

    #[test]
    fn failure_degrades_to_one() {
        assert_eq!(resolve_multiplier(&FailingAdvisor, &request()), 1.0);
    }

    #[test]
    fn size_respects_hard_cap() {
        let risk = RiskConfig::default(); // base 0.05, max 0.25
        assert_eq!(position_size_pct(&risk, 1.0), 0.05);
        assert_eq!(position_size_pct(&risk, 2.0), 0.10);
        let mut aggressive = risk.clone();
        aggressive.base_size_pct = 0.20;
        // 0.20 * 2.0 = 0.40 would pierce the cap.
        assert_eq!(position_size_pct(&aggressive, 2.0), 0.25);
    }
}
