//! DispatchToken - opaque subscription handle
//!
//! Tokens are minted from a process-wide counter, so a token handed out by one
//! dispatcher never collides with a token of another.

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

const TOKEN_PREFIX: &str = "ID_";

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Handle identifying a registered callback.
///
/// Returned by registration and passed back to `unregister` and `wait_for`.
/// Tokens order by minting time, which is also registration order.
///
/// # Examples
/// ```
/// use contracts::DispatchToken;
///
/// let a = DispatchToken::mint();
/// let b = DispatchToken::mint();
/// assert_ne!(a, b);
/// assert!(a < b);
/// assert!(a.to_string().starts_with("ID_"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DispatchToken(u64);

impl DispatchToken {
    /// Mint a token that has never been handed out before in this process.
    #[inline]
    pub fn mint() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw sequence number.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DispatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", TOKEN_PREFIX, self.0)
    }
}

impl fmt::Debug for DispatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DispatchToken({})", self)
    }
}

impl Serialize for DispatchToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
