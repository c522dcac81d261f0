//! Trait definitions for request dispatch.
//!
//! Clients implement [`Dispatch`]; composition code only depends on the
//! trait, so it can be driven by any transport.

mod dispatch;

pub use dispatch::{dispatch_pending, Dispatch};
