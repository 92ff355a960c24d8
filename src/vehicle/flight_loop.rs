use super::{error::VehicleError, vehicle_controller::VehicleController};
use crate::common::{Periodic, secs_f64};
use crate::config::{HEARTBEAT_PERIOD, TELEMETRY_PERIOD, UAV_HANDSHAKE_TIMEOUT, VEHICLE_LOOP_PERIOD};
use crate::messaging::{MavContent, Transport, TransportError};
use crate::scheduling::RunFlag;
use crate::{error, event, info, warn};
use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;

/// The vehicle's single control loop. Every iteration runs to completion before the
/// next one starts, so the controller never sees concurrent access.
pub struct FlightLoop {
    transport: Arc<dyn Transport>,
    controller: VehicleController,
    heartbeat: Periodic,
    telemetry: Periodic,
    boot: DateTime<Utc>,
    last_tick: DateTime<Utc>,
}

impl FlightLoop {
    /// Waits for the first frame from anyone, then builds the loop around it. The first
    /// frame is handled like every later one.
    ///
    /// # Arguments
    /// * `transport` - The link to the ground station.
    /// * `handshake` - Window measured from the call; unreadable datagrams do not extend it.
    ///
    /// # Returns
    /// The ready loop, or `VehicleError::HandshakeTimeout` once the window has passed
    /// without a decodable frame.
    pub async fn connect(
        transport: Arc<dyn Transport>,
        handshake: Duration,
    ) -> Result<FlightLoop, VehicleError> {
        let deadline = Instant::now() + handshake;
        let first = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(VehicleError::HandshakeTimeout);
            }
            match transport.recv_timeout(remaining).await {
                Ok(Some(frame)) => break frame,
                Ok(None) => return Err(VehicleError::HandshakeTimeout),
                Err(TransportError::Closed) => return Err(TransportError::Closed.into()),
                Err(e) => warn!("Discarding unreadable frame during handshake: {e:?}"),
            }
        };
        let now = Utc::now();
        info!(
            "Link active, first frame: {}",
            first.content.as_ref().map_or("EMPTY", MavContent::kind)
        );
        let mut controller = VehicleController::new(now);
        controller.handle_frame(now, &first);
        Ok(FlightLoop {
            transport,
            controller,
            heartbeat: Periodic::new(HEARTBEAT_PERIOD),
            telemetry: Periodic::new(TELEMETRY_PERIOD),
            boot: now,
            last_tick: now,
        })
    }

    pub fn controller(&self) -> &VehicleController { &self.controller }

    /// Runs iterations until `running` is cleared.
    pub async fn run(&mut self, running: &RunFlag) -> Result<(), VehicleError> {
        while running.is_running() {
            self.iterate(Utc::now()).await?;
            running.pause(VEHICLE_LOOP_PERIOD).await;
        }
        info!("Control loop stopped");
        Ok(())
    }

    /// One iteration: tick, drain at most one frame, periodic transmissions, flush answers.
    ///
    /// Only a closed in-memory link ends the loop; every other transport error is logged
    /// and skipped.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub async fn iterate(&mut self, now: DateTime<Utc>) -> Result<(), VehicleError> {
        let dt = secs_f64(now - self.last_tick);
        self.last_tick = now;
        self.controller.tick(now, dt);

        match self.transport.recv_timeout(Duration::ZERO).await {
            Ok(Some(frame)) => self.controller.handle_frame(now, &frame),
            Ok(None) => {}
            Err(TransportError::Closed) => return Err(TransportError::Closed.into()),
            Err(e) => warn!("Receive failed, continuing: {e:?}"),
        }

        if self.heartbeat.due(now) {
            self.transmit(MavContent::vehicle_heartbeat()).await?;
            event!("heartbeat sent");
        }
        if self.telemetry.due(now) {
            let boot_ms = (now - self.boot).num_milliseconds() as u32;
            let report = self.controller.position_report(boot_ms);
            self.transmit(report).await?;
        }
        for content in self.controller.drain_outbox() {
            self.transmit(content).await?;
        }
        Ok(())
    }

    async fn transmit(&self, content: MavContent) -> Result<(), VehicleError> {
        match self.transport.send(content).await {
            Ok(()) => Ok(()),
            Err(TransportError::Closed) => Err(TransportError::Closed.into()),
            Err(e) => {
                error!("Send failed: {e:?}");
                Ok(())
            }
        }
    }
}

/// Vehicle process body: handshake, then the control loop until shutdown.
pub async fn run_vehicle(transport: Arc<dyn Transport>, running: RunFlag) -> Result<(), VehicleError> {
    info!("Waiting up to {}s for the first frame", UAV_HANDSHAKE_TIMEOUT.as_secs());
    let mut flight_loop = FlightLoop::connect(transport, UAV_HANDSHAKE_TIMEOUT).await?;
    flight_loop.run(&running).await
}
