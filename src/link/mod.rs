//! Heartbeat-freshness supervision shared by both sides of the link.

mod link_monitor;

pub use link_monitor::{LinkMonitor, LinkTransition};

#[cfg(test)]
mod tests;
