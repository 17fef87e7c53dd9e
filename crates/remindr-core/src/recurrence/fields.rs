//! Range-checked rule fields.
//!
//! Each field type can only hold values inside its range, so a rule built
//! from them is valid by construction. Deserialization goes through the same
//! check.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RuleRangeError;

macro_rules! bounded_field {
    ($(#[$meta:meta])* $name:ident, $repr:ty, $repr_name:literal, $field:literal, $min:literal ..= $max:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = $repr_name, into = $repr_name)]
        pub struct $name($repr);

        impl $name {
            pub const MIN: $repr = $min;
            pub const MAX: $repr = $max;

            pub fn new(value: i64) -> Result<Self, RuleRangeError> {
                if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
                    Ok(Self(value as $repr))
                } else {
                    Err(RuleRangeError {
                        field: $field,
                        min: i64::from(Self::MIN),
                        max: i64::from(Self::MAX),
                        value,
                    })
                }
            }

            pub fn get(self) -> $repr {
                self.0
            }
        }

        impl TryFrom<$repr> for $name {
            type Error = RuleRangeError;

            fn try_from(value: $repr) -> Result<Self, Self::Error> {
                Self::new(i64::from(value))
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

bounded_field!(
    /// Day of month for a Monthly rule. Capped at 28 so it exists in every month.
    MonthDay, u8, "u8", "monthday", 1..=28
);

bounded_field!(
    /// Calendar month, 1 = January.
    Month, u8, "u8", "month", 1..=12
);

bounded_field!(
    /// Day of month for a Yearly rule. Clamped to the month's length when stepping.
    DayOfMonth, u8, "u8", "day", 1..=31
);

bounded_field!(
    /// Which occurrence of a weekday within a month.
    WeekOfMonth, u8, "u8", "week", 1..=5
);

bounded_field!(
    /// Days between occurrences of an XDays rule.
    Interval, u16, "u16", "interval", 1..=9999
);
