//! Headless browser session management and wait primitives.
//!
//! The session owns the Chromium process and its CDP event handler task;
//! waits are modeled as explicit suspension points that either resolve or
//! report a timeout, never as callbacks.

mod session;
mod wait;

pub use session::{BrowserOptions, BrowserSession};
pub use wait::{
    wait_for_selector, NetworkIdleWatcher, SelectorWait, DEFAULT_POLL_INTERVAL,
    NETWORK_IDLE_ALLOWANCE, NETWORK_IDLE_QUIET_WINDOW,
};
