//! Best-effort field values
//!
//! Every extracted attribute is either present and well-formed or explicitly
//! unavailable. Exports and JSON render the latter as `Not Available`.

use serde::{Serialize, Serializer};
use std::fmt;

/// Text written wherever a field is unavailable
pub const UNAVAILABLE: &str = "Not Available";

/// A field that extraction may or may not have produced
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    Present(T),
    #[default]
    Unavailable,
}

impl<T> Field<T> {
    /// Returns true if a value is present
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns the value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Present(value),
            None => Self::Unavailable,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(value) => value.fmt(f),
            Self::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

impl<T: fmt::Display> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A positive price in whole cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: u64,
}

impl Price {
    /// Creates a price from cents; zero is not a price
    pub fn from_cents(cents: u64) -> Option<Self> {
        (cents > 0).then_some(Self { cents })
    }

    pub fn cents(&self) -> u64 {
        self.cents
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}
