//! State module for tracking per-host crawl state
//!
//! The crawl driver keeps one `HostState` per host it talks to, used for
//! rate limiting and for holding that host's robots.txt for the run.

mod host_state;

pub use host_state::HostState;
