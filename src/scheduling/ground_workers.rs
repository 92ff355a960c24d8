use super::run_flag::RunFlag;
use crate::config::{
    GCS_INITIAL_HEARTBEAT_SPACING, GCS_INITIAL_HEARTBEATS, HEARTBEAT_PERIOD_STD, RX_POLL_TIMEOUT,
    WATCHDOG_PERIOD,
};
use crate::ground::GroundSession;
use crate::messaging::TransportError;
use crate::{error, event, info, log, warn};
use chrono::Utc;
use tokio::task::JoinHandle;

/// Heartbeats sent before the periodic worker starts, so the vehicle can finish its
/// handshake without waiting for the first worker tick.
pub async fn send_initial_heartbeats(session: &GroundSession) {
    for i in 1..=GCS_INITIAL_HEARTBEATS {
        match session.send_heartbeat().await {
            Ok(true) => info!("initial heartbeat {i}"),
            Ok(false) => warn!("initial heartbeat {i} skipped, link down"),
            Err(e) => error!("initial heartbeat {i} failed: {e:?}"),
        }
        tokio::time::sleep(GCS_INITIAL_HEARTBEAT_SPACING).await;
    }
}

/// Blocks on the transport for at most one poll interval at a time and feeds every
/// frame into the session. Read failures are skipped.
pub fn spawn_receiver(session: GroundSession, running: RunFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        while running.is_running() {
            match session.poll_inbound(RX_POLL_TIMEOUT).await {
                Ok(_) => {}
                Err(TransportError::Closed) => {
                    warn!("Receiver: link closed, stopping");
                    break;
                }
                Err(e) => event!("Receiver: skipping unreadable frame: {e:?}"),
            }
        }
        log!("Receiver stopped");
    })
}

/// Sends the GCS heartbeat every period while the link is usable, independent of input.
pub fn spawn_heartbeat(session: GroundSession, running: RunFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        while running.is_running() {
            if let Err(e) = session.send_heartbeat().await {
                error!("Heartbeat send failed: {e:?}");
            }
            if !running.pause(HEARTBEAT_PERIOD_STD).await {
                break;
            }
        }
        log!("Heartbeat worker stopped");
    })
}

/// Re-evaluates the ground link timeout every watchdog period.
pub fn spawn_link_watchdog(session: GroundSession, running: RunFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        while running.pause(WATCHDOG_PERIOD).await {
            session.check_link(Utc::now()).await;
        }
        log!("Link watchdog stopped");
    })
}

/// Starts receiver, heartbeat and watchdog. The handles are joined on shutdown.
pub fn spawn_ground_workers(session: &GroundSession, running: &RunFlag) -> Vec<JoinHandle<()>> {
    vec![
        spawn_receiver(session.clone(), running.clone()),
        spawn_heartbeat(session.clone(), running.clone()),
        spawn_link_watchdog(session.clone(), running.clone()),
    ]
}
