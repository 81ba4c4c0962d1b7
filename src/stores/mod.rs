// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-session state containers.
//!
//! Each authenticated session owns one [`AuthStore`] and one [`RaceStore`].
//! Every container operation runs the same lifecycle: mark loading and
//! clear the previous error, make exactly one backend request, then merge
//! the result or capture the failure message. No operation retries, and
//! no snapshot lock is ever held across a backend await.

pub mod auth;
pub mod races;
pub mod registry;

pub use auth::{AuthSnapshot, AuthStore};
pub use races::{RaceSnapshot, RaceStore};
pub use registry::{SessionRegistry, UserSession};
