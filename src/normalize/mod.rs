//! Source payload → flat per-city daily series in standard units.
//!
//! Both transforms are pure over an in-memory payload. The originating path
//! is only used for log context. A payload that is well-formed but carries
//! no rows comes back as [`Normalized::Empty`]; unreadable files never get
//! this far (see [`crate::parser::load_payload`]).

pub mod demand;
pub mod weather;

pub use demand::normalize_demand;
pub use weather::normalize_weather;

/// Result of a transform that did not hit a hard failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Records(Vec<T>),
    /// The expected list was missing or empty.
    Empty,
}

impl<T> Normalized<T> {
    /// Records, with `Empty` flattened to an empty vector.
    pub fn into_records(self) -> Vec<T> {
        match self {
            Normalized::Records(records) => records,
            Normalized::Empty => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Normalized::Records(records) => records.is_empty(),
            Normalized::Empty => true,
        }
    }
}

/// Tenths of a degree Celsius → degrees Fahrenheit.
pub fn tenths_to_fahrenheit(tenths_c: f64) -> f64 {
    (tenths_c / 10.0) * 9.0 / 5.0 + 32.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenths_to_fahrenheit_reference_points() {
        assert_eq!(tenths_to_fahrenheit(0.0), 32.0);
        assert_eq!(tenths_to_fahrenheit(100.0), 50.0);
        assert_eq!(tenths_to_fahrenheit(250.0), 77.0);
        assert_eq!(tenths_to_fahrenheit(-400.0), -40.0);
    }

    #[test]
    fn test_tenths_to_fahrenheit_is_monotonic() {
        let mut previous = f64::NEG_INFINITY;
        for tenths in (-600..=600).step_by(7) {
            let f = tenths_to_fahrenheit(tenths as f64);
            assert!(f > previous);
            previous = f;
        }
    }

    #[test]
    fn test_empty_marker_flattens() {
        let empty: Normalized<u8> = Normalized::Empty;
        assert!(empty.is_empty());
        assert!(empty.into_records().is_empty());
        assert!(!Normalized::Records(vec![1u8]).is_empty());
    }
}
