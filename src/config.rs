//! Tunables shared by both processes and the runtime network configuration.
//!
//! Timing values are kept as `chrono::TimeDelta` where they are compared against
//! `DateTime<Utc>` timestamps and as `std::time::Duration` where they feed tokio sleeps.

use chrono::TimeDelta;
use std::{env, net::SocketAddr, time::Duration};

/// Ground side: no frame from the vehicle for this long latches the link as lost.
pub const GCS_LINK_TIMEOUT: TimeDelta = TimeDelta::seconds(30);
/// Vehicle side: no GCS heartbeat for this long triggers the RTL failsafe.
pub const UAV_LINK_TIMEOUT: TimeDelta = TimeDelta::seconds(60);
/// Vehicle side: how long to wait for the very first frame before aborting.
pub const UAV_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);
/// Vehicle side: spacing of "attempting link restore" notices while the link is down.
pub const UAV_RETRY_NOTICE_PERIOD: TimeDelta = TimeDelta::seconds(30);

pub const HEARTBEAT_PERIOD: TimeDelta = TimeDelta::seconds(1);
pub const HEARTBEAT_PERIOD_STD: Duration = Duration::from_secs(1);
pub const TELEMETRY_PERIOD: TimeDelta = TimeDelta::milliseconds(500);

/// Number and spacing of the heartbeats the ground sends before its workers take over.
pub const GCS_INITIAL_HEARTBEATS: usize = 3;
pub const GCS_INITIAL_HEARTBEAT_SPACING: Duration = Duration::from_millis(500);

/// Period of one vehicle control loop iteration. Tunable.
pub const VEHICLE_LOOP_PERIOD: Duration = Duration::from_millis(20);
/// Upper bound for a single blocking receive. Also bounds shutdown latency. Tunable.
pub const RX_POLL_TIMEOUT: Duration = Duration::from_millis(500);
/// Period of the ground link watchdog. Tunable.
pub const WATCHDOG_PERIOD: Duration = Duration::from_millis(500);

pub const RTL_ALT_M: f64 = 30.0;
pub const RTL_HOME_RADIUS_M: f64 = 0.2;
pub const CLIMB_MPS: f64 = 2.0;
pub const MOVE_MPS: f64 = 5.0;

pub const HOME_LAT_DEG: f64 = -23.2;
pub const HOME_LON_DEG: f64 = -45.9;

pub const GCS_SYSTEM_ID: u32 = 255;
pub const GCS_COMPONENT_ID: u32 = 190;
pub const UAV_SYSTEM_ID: u32 = 1;
pub const UAV_COMPONENT_ID: u32 = 1;

/// Socket addresses of one process, read from the environment.
#[derive(Debug, Clone, Copy)]
pub struct NetConfig {
    /// Local address to receive frames on.
    pub listen: SocketAddr,
    /// Remote address frames are sent to.
    pub peer: SocketAddr,
}

impl NetConfig {
    /// Vehicle addresses from `UAV_LISTEN_ADDR` / `UAV_GCS_ADDR`.
    pub fn vehicle_from_env() -> Result<Self, std::net::AddrParseError> {
        Self::from_env(("UAV_LISTEN_ADDR", "0.0.0.0:14550"), ("UAV_GCS_ADDR", "127.0.0.1:14551"))
    }

    /// Ground addresses from `GCS_LISTEN_ADDR` / `GCS_VEHICLE_ADDR`.
    pub fn ground_from_env() -> Result<Self, std::net::AddrParseError> {
        Self::from_env(("GCS_LISTEN_ADDR", "0.0.0.0:14551"), ("GCS_VEHICLE_ADDR", "127.0.0.1:14550"))
    }

    fn from_env(
        listen: (&str, &str),
        peer: (&str, &str),
    ) -> Result<Self, std::net::AddrParseError> {
        let listen_var = env::var(listen.0);
        let peer_var = env::var(peer.0);
        Ok(Self {
            listen: listen_var.as_ref().map_or(listen.1, String::as_str).parse()?,
            peer: peer_var.as_ref().map_or(peer.1, String::as_str).parse()?,
        })
    }
}
