//! State tracking for the retry passes
//!
//! This module defines the lifecycle of a single URL from the moment it is
//! pulled out of the sitemap until it is archived or given up on.

mod work_state;

pub use work_state::{WorkItem, WorkState};
