use super::{
    error::CommandError,
    ground_snapshot::{GroundSnapshot, RxEvent, SessionStatus},
};
use crate::config::GCS_LINK_TIMEOUT;
use crate::link::LinkTransition;
use crate::messaging::{
    MAV_CMD_COMPONENT_ARM_DISARM, MAV_CMD_NAV_LAND, MAV_CMD_NAV_TAKEOFF, MAV_FRAME_LOCAL_NED,
    MavContent, POSITION_TARGET_POSITION_ONLY, SetPositionTargetLocalNed, Transport,
    TransportError,
};
use crate::vehicle::FlightMode;
use crate::{event, info, link, warn};
use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Ground side of the link: command gating, telemetry cache and link supervision.
///
/// Cloning is cheap; all clones share one snapshot and one transport. The receiver,
/// the heartbeat worker, the watchdog and the console each hold a clone.
#[derive(Clone)]
pub struct GroundSession {
    snapshot: Arc<Mutex<GroundSnapshot>>,
    transport: Arc<dyn Transport>,
    started: DateTime<Utc>,
}

impl GroundSession {
    pub fn new(transport: Arc<dyn Transport>, now: DateTime<Utc>) -> Self {
        Self { snapshot: Arc::new(Mutex::new(GroundSnapshot::new(now))), transport, started: now }
    }

    /// Transmits the command produced by `build` if the link is usable.
    ///
    /// The check and the transmission happen under the snapshot lock, so nothing is
    /// sent once `stopped` has been latched.
    ///
    /// # Arguments
    /// * `what` - Command name used in log lines.
    /// * `build` - Produces the frame content; only called when the link is usable.
    ///
    /// # Returns
    /// `Ok(())` once sent, `CommandError::LinkLost` if the link is down or latched, or the
    /// transport error of a failed send.
    pub async fn try_send<F>(&self, what: &str, build: F) -> Result<(), CommandError>
    where F: FnOnce() -> MavContent + Send {
        let snapshot = self.snapshot.lock().await;
        if !snapshot.can_send() {
            drop(snapshot);
            warn!(
                "Link lost (no vehicle telemetry for {}s), {what} not sent",
                GCS_LINK_TIMEOUT.num_seconds()
            );
            return Err(CommandError::LinkLost);
        }
        self.transport.send(build()).await?;
        drop(snapshot);
        info!("{what} sent");
        Ok(())
    }

    pub async fn arm(&self) -> Result<(), CommandError> {
        self.try_send("ARM", || {
            MavContent::command(MAV_CMD_COMPONENT_ARM_DISARM, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
        })
        .await
    }

    pub async fn disarm(&self) -> Result<(), CommandError> {
        self.try_send("DISARM", || MavContent::command(MAV_CMD_COMPONENT_ARM_DISARM, [0.0; 7])).await
    }

    pub async fn set_mode(&self, mode: FlightMode) -> Result<(), CommandError> {
        let Some(custom_mode) = mode.custom_mode() else {
            return Err(CommandError::UnsupportedMode(mode));
        };
        self.try_send(&format!("MODE {mode} (custom_mode={custom_mode})"), || {
            MavContent::set_mode(custom_mode)
        })
        .await
    }

    #[allow(clippy::cast_possible_truncation)]
    pub async fn takeoff(&self, alt_m: f64) -> Result<(), CommandError> {
        self.try_send(&format!("TAKEOFF alt={alt_m}m"), || {
            MavContent::command(MAV_CMD_NAV_TAKEOFF, [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, alt_m as f32])
        })
        .await
    }

    pub async fn land(&self) -> Result<(), CommandError> {
        self.try_send("LAND", || MavContent::command(MAV_CMD_NAV_LAND, [0.0; 7])).await
    }

    /// Position target in the local NED frame.
    ///
    /// # Arguments
    /// * `north_m` - Metres north of launch.
    /// * `east_m` - Metres east of launch.
    /// * `alt_m` - Height above launch; sent as `z = -alt_m`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub async fn move_to(&self, north_m: f64, east_m: f64, alt_m: f64) -> Result<(), CommandError> {
        let time_boot_ms = (Utc::now() - self.started).num_milliseconds() as u32;
        self.try_send(&format!("SETPOS N={north_m} E={east_m} ALT={alt_m}"), || {
            MavContent::SetPositionTargetLocalNed(SetPositionTargetLocalNed {
                time_boot_ms,
                coordinate_frame: MAV_FRAME_LOCAL_NED,
                type_mask: POSITION_TARGET_POSITION_ONLY,
                x: north_m as f32,
                y: east_m as f32,
                z: -alt_m as f32,
            })
        })
        .await
    }

    /// Sends one GCS heartbeat if the link is usable. Returns whether it was sent.
    pub async fn send_heartbeat(&self) -> Result<bool, TransportError> {
        let snapshot = self.snapshot.lock().await;
        if !snapshot.can_send() {
            return Ok(false);
        }
        self.transport.send(MavContent::gcs_heartbeat()).await?;
        drop(snapshot);
        event!("heartbeat sent");
        Ok(true)
    }

    /// Waits at most `wait` for one inbound frame and caches it.
    /// Returns whether a frame was received.
    pub async fn poll_inbound(&self, wait: Duration) -> Result<bool, TransportError> {
        let Some(frame) = self.transport.recv_timeout(wait).await? else {
            return Ok(false);
        };
        let kind = frame.content.as_ref().map_or("EMPTY", MavContent::kind);
        if self.snapshot.lock().await.ingest(Utc::now(), &frame) {
            event!("rx {kind} from system {}", frame.system_id);
        } else {
            warn!("Ignoring unexpected {kind} from system {}", frame.system_id);
        }
        Ok(true)
    }

    /// Link watchdog step. Returns `true` on the check that latched the link as lost.
    pub async fn check_link(&self, now: DateTime<Utc>) -> bool {
        let edge = self.snapshot.lock().await.check_link(now, GCS_LINK_TIMEOUT);
        if edge == Some(LinkTransition::Lost) {
            link!(
                "link lost (>={}s without vehicle telemetry), TX stopped (no reconnect)",
                GCS_LINK_TIMEOUT.num_seconds()
            );
            return true;
        }
        false
    }

    pub async fn status(&self) -> SessionStatus { self.snapshot.lock().await.status() }

    pub async fn link_up(&self) -> bool { self.snapshot.lock().await.link().is_up() }

    pub async fn is_stopped(&self) -> bool { self.snapshot.lock().await.is_stopped() }

    pub async fn drain_events(&self, max: usize) -> Vec<RxEvent> {
        self.snapshot.lock().await.drain_events(max)
    }
}
