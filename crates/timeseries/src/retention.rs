//! Retention policy configuration
//!
//! Exactly one policy is active per storage instance. In JSON:
//!
//! ```json
//! { "count": 500 }
//! { "horizon": { "minutes": 5, "seconds": 30 } }
//! ```

use crate::error::{SeriesError, SeriesResult};
use crate::fixed_horizon::FixedHorizonTimeSeries;
use crate::fixed_length::FixedLengthTimeSeries;
use crate::series::Series;
use chrono::Duration;
use kestrel_ports::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How much history each symbol keeps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep the newest N entries
    Count(usize),
    /// Keep entries within a duration of the latest append
    Horizon(HorizonSpec),
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::Horizon(HorizonSpec {
            hours: 1,
            ..Default::default()
        })
    }
}

impl RetentionPolicy {
    /// Count-bounded policy
    pub fn count(max_length: usize) -> Self {
        RetentionPolicy::Count(max_length)
    }

    /// Duration-bounded policy
    pub fn horizon(horizon: Duration) -> Self {
        RetentionPolicy::Horizon(HorizonSpec::from(horizon))
    }

    /// Check the policy parameters without building a series
    pub fn validate(&self) -> SeriesResult<()> {
        match self {
            RetentionPolicy::Count(0) => Err(SeriesError::InvalidArgument(
                "count retention must keep at least 1 entry".to_string(),
            )),
            RetentionPolicy::Count(_) => Ok(()),
            RetentionPolicy::Horizon(spec) => spec.to_duration().map(|_| ()),
        }
    }

    /// Build a fresh, empty series following this policy
    pub fn build(&self, clock: Arc<dyn Clock>) -> SeriesResult<Box<dyn Series>> {
        match self {
            RetentionPolicy::Count(max_length) => {
                Ok(Box::new(FixedLengthTimeSeries::new(clock, *max_length)?))
            }
            RetentionPolicy::Horizon(spec) => Ok(Box::new(FixedHorizonTimeSeries::new(
                clock,
                spec.to_duration()?,
            )?)),
        }
    }
}

/// A horizon written as calendar components
///
/// Components are summed, so `{ "minutes": 1, "seconds": 30 }` is 90 seconds.
/// Missing components default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonSpec {
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
    pub microseconds: i64,
}

impl HorizonSpec {
    /// Sum the components into a duration
    pub fn to_duration(&self) -> SeriesResult<Duration> {
        let overflow = || SeriesError::InvalidArgument(format!("horizon {:?} overflows", self));

        let parts = [
            Duration::try_weeks(self.weeks),
            Duration::try_days(self.days),
            Duration::try_hours(self.hours),
            Duration::try_minutes(self.minutes),
            Duration::try_seconds(self.seconds),
            Duration::try_milliseconds(self.milliseconds),
            Some(Duration::microseconds(self.microseconds)),
        ];

        let mut total = Duration::zero();
        for part in parts {
            total = part
                .and_then(|d| total.checked_add(&d))
                .ok_or_else(overflow)?;
        }

        if total < Duration::zero() {
            return Err(SeriesError::InvalidArgument(format!(
                "horizon must not be negative, got {total}"
            )));
        }

        Ok(total)
    }
}

impl From<Duration> for HorizonSpec {
    fn from(duration: Duration) -> Self {
        let seconds = duration.num_seconds();
        let remainder = duration - Duration::seconds(seconds);

        Self {
            seconds,
            microseconds: remainder.num_microseconds().unwrap_or(0),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_clock::ManualClock;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_count_policy() {
        let policy: RetentionPolicy = serde_json::from_str(r#"{"count": 500}"#).unwrap();
        assert_eq!(policy, RetentionPolicy::Count(500));
    }

    #[test]
    fn test_parse_horizon_policy() {
        let policy: RetentionPolicy =
            serde_json::from_str(r#"{"horizon": {"minutes": 1, "seconds": 30}}"#).unwrap();

        match policy {
            RetentionPolicy::Horizon(spec) => {
                assert_eq!(spec.to_duration().unwrap(), Duration::seconds(90));
            }
            other => panic!("Wrong policy: {other:?}"),
        }
    }

    #[test]
    fn test_default_is_one_hour() {
        let RetentionPolicy::Horizon(spec) = RetentionPolicy::default() else {
            panic!("default should be a horizon policy");
        };
        assert_eq!(spec.to_duration().unwrap(), Duration::hours(1));
    }

    #[test]
    fn test_negative_horizon_is_invalid() {
        let spec = HorizonSpec {
            minutes: 1,
            seconds: -61,
            ..Default::default()
        };
        assert!(matches!(
            spec.to_duration(),
            Err(SeriesError::InvalidArgument(_))
        ));
        assert!(RetentionPolicy::Horizon(spec).validate().is_err());
    }

    #[test]
    fn test_overflowing_horizon_is_invalid() {
        let spec = HorizonSpec {
            weeks: i64::MAX,
            ..Default::default()
        };
        assert!(spec.to_duration().is_err());
    }

    #[test]
    fn test_zero_count_is_invalid() {
        assert!(RetentionPolicy::count(0).validate().is_err());
        assert!(RetentionPolicy::count(0).build(ManualClock::new(None)).is_err());
    }

    #[test]
    fn test_duration_round_trips_through_spec() {
        let duration = Duration::milliseconds(1_500);
        let spec = HorizonSpec::from(duration);
        assert_eq!(spec.to_duration().unwrap(), duration);
    }

    #[test]
    fn test_build_count_series() {
        let mut series = RetentionPolicy::count(1).build(ManualClock::new(None)).unwrap();
        series.append(dec!(1), None);
        series.append(dec!(2), Some(chrono::Utc::now() + Duration::seconds(1)));
        assert_eq!(series.len(), 1);
        assert_eq!(series.latest().map(|(_, p)| p), Some(dec!(2)));
    }
}
