use crate::{Error, Result};

use chrono::{DateTime, Duration, Utc};

/// Attribute the service reads the expiry timestamp from.
pub const EXPIRES_ATTRIBUTE: &str = "__expires";

/// When a written item should expire.
///
/// ```rust
/// use chrono::Duration;
/// use deta_base_crud::common::expiry;
///
/// let expiry = expiry::Expiry::In(Duration::seconds(60));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Expiry {
    /// Expire at a fixed point in time.
    At(DateTime<Utc>),
    /// Expire after the given duration, counted from when the request is built.
    In(Duration),
}

impl Expiry {
    /// Unix timestamp (seconds) at which the item expires.
    ///
    /// Fails with [`Error::ExpiryOutOfRange`] if the duration overflows the calendar.
    pub fn timestamp(&self) -> Result<i64> {
        self.timestamp_from(Utc::now())
    }

    fn timestamp_from(&self, now: DateTime<Utc>) -> Result<i64> {
        match self {
            Self::At(at) => Ok(at.timestamp()),
            Self::In(duration) => now
                .checked_add_signed(*duration)
                .map(|at| at.timestamp())
                .ok_or(Error::ExpiryOutOfRange(*duration)),
        }
    }
}
