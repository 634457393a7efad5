//! Travel budget units.
//!
//! Budgets arrive in meters at every boundary and are compared against
//! millimeter-space geometry internally.

use serde::{Deserialize, Serialize};

/// Millimeters per meter.
pub const MM_PER_METER: f64 = 1000.0;

/// A positive, finite per-pass drawn-length limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelBudget {
    limit_mm: f64,
}

impl TravelBudget {
    /// Builds a budget from meters. Absent, non-positive or non-finite
    /// values mean "no budget".
    pub fn from_meters(meters: Option<f64>) -> Option<Self> {
        meters.and_then(|m| Self::from_mm(m * MM_PER_METER))
    }

    /// Builds a budget from millimeters, `None` when not usable.
    pub fn from_mm(limit_mm: f64) -> Option<Self> {
        if limit_mm.is_finite() && limit_mm > 0.0 {
            Some(Self { limit_mm })
        } else {
            None
        }
    }

    pub fn limit_mm(&self) -> f64 {
        self.limit_mm
    }

    pub fn limit_meters(&self) -> f64 {
        self.limit_mm / MM_PER_METER
    }
}

impl std::fmt::Display for TravelBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} m", self.limit_meters())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_meters() {
        assert_eq!(TravelBudget::from_meters(Some(2.0)).unwrap().limit_mm(), 2000.0);
        assert_eq!(TravelBudget::from_meters(Some(1.5)).unwrap().limit_meters(), 1.5);
    }

    #[test]
    fn test_unusable_budgets_mean_no_limit() {
        assert!(TravelBudget::from_meters(None).is_none());
        assert!(TravelBudget::from_meters(Some(0.0)).is_none());
        assert!(TravelBudget::from_meters(Some(-1.0)).is_none());
        assert!(TravelBudget::from_meters(Some(f64::NAN)).is_none());
        assert!(TravelBudget::from_meters(Some(f64::INFINITY)).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(TravelBudget::from_mm(2500.0).unwrap().to_string(), "2.500 m");
    }
}
