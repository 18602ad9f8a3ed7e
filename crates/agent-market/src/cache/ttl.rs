//! Time-to-live per volatility class

use serde::{Deserialize, Serialize};
use std::time::Duration;

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// How often the underlying remote dataset changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityClass {
    /// Intraday prices, volume and indicators derived from them
    Hourly,
    /// Profiles, price targets, anything blended with the current price
    Daily,
    /// Financial statements, estimates and models built on them
    Weekly,
    /// Published documents that never change once released
    Monthly,
}

/// TTL assigned to each [`VolatilityClass`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlPolicy {
    pub hourly: Duration,
    pub daily: Duration,
    pub weekly: Duration,
    pub monthly: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            hourly: HOUR,
            daily: DAY,
            weekly: DAY * 7,
            monthly: DAY * 30,
        }
    }
}

impl TtlPolicy {
    pub fn ttl(&self, class: VolatilityClass) -> Duration {
        match class {
            VolatilityClass::Hourly => self.hourly,
            VolatilityClass::Daily => self.daily,
            VolatilityClass::Weekly => self.weekly,
            VolatilityClass::Monthly => self.monthly,
        }
    }

    /// Same TTL for every class, handy in tests
    pub fn uniform(ttl: Duration) -> Self {
        Self {
            hourly: ttl,
            daily: ttl,
            weekly: ttl,
            monthly: ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.ttl(VolatilityClass::Hourly), Duration::from_secs(3600));
        assert_eq!(policy.ttl(VolatilityClass::Daily), Duration::from_secs(86_400));
        assert_eq!(policy.ttl(VolatilityClass::Weekly), Duration::from_secs(604_800));
        assert_eq!(policy.ttl(VolatilityClass::Monthly), Duration::from_secs(2_592_000));
    }

    #[test]
    fn test_classes_are_ordered_by_duration() {
        let p = TtlPolicy::default();
        assert!(p.hourly < p.daily && p.daily < p.weekly && p.weekly < p.monthly);
    }
}
