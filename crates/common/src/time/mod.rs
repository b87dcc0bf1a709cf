//! Time abstractions
//!
//! The secure cache measures entry age against a [`Clock`] so expiry can be
//! driven deterministically in tests with [`MockClock`].
//!
//! ```rust
//! use std::time::Duration;
//!
//! use trustgate_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now() - start, Duration::from_secs(5));
//! ```

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
