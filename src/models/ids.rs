//! Strongly-typed ID wrappers for all entity types
//!
//! Ids are integers derived from the creation timestamp in milliseconds, the
//! same shape the stored JSON has always used. Newtype wrappers prevent mixing
//! ids from different entity types at compile time.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw id
            pub fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the underlying integer
            pub fn value(&self) -> i64 {
                self.0
            }

            /// Allocate an id from the current time, strictly above `after`
            ///
            /// Several records created within the same millisecond still
            /// receive distinct, increasing ids. Returns `None` once `after`
            /// is already the largest representable id.
            pub fn next_after(after: Option<Self>) -> Option<Self> {
                let now = Utc::now().timestamp_millis();
                match after {
                    Some(last) if last.0 >= now => last.0.checked_add(1).map(Self),
                    _ => Some(Self(now)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().trim_start_matches('#').parse()?))
            }
        }
    };
}

define_id!(ModuleId);
define_id!(ClientId);
define_id!(BudgetId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_after_is_monotonic() {
        let first = ModuleId::next_after(None).unwrap();
        let second = ModuleId::next_after(Some(first)).unwrap();
        let third = ModuleId::next_after(Some(second)).unwrap();
        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn test_next_after_future_id() {
        let future = ClientId::from_raw(i64::MAX - 1);
        assert_eq!(ClientId::next_after(Some(future)).unwrap().value(), i64::MAX);
    }

    #[test]
    fn test_next_after_largest_id() {
        assert_eq!(BudgetId::next_after(Some(BudgetId::from_raw(i64::MAX))), None);
    }

    #[test]
    fn test_id_serialization_is_plain_integer() {
        let id = BudgetId::from_raw(1718000000000);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "1718000000000");
        let back: BudgetId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_parse() {
        assert_eq!("42".parse::<ModuleId>().unwrap().value(), 42);
        assert_eq!("#42".parse::<ModuleId>().unwrap().value(), 42);
        assert!("abc".parse::<ModuleId>().is_err());
    }
}
