//! Simple cli for tracking your daily activities. Start an activity, note where
//! you are and what you're doing, finish it later and look at the totals.
//! State lives in a single file in the user's profile, so there are no runtimes
//! and nothing to configure.
//!

pub mod cli;
pub mod storage;
pub mod store;
pub mod utils;
