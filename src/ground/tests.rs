use super::*;
use crate::config::GCS_LINK_TIMEOUT;
use crate::messaging::{
    ChannelTransport, CommandAck, GlobalPositionInt, Identity, MAV_CMD_COMPONENT_ARM_DISARM,
    MAV_CMD_NAV_TAKEOFF, MAV_FRAME_LOCAL_NED, MavContent, MavFrame, MavResult, MavSeverity,
    POSITION_TARGET_POSITION_ONLY, Transport, TransportError,
};
use crate::vehicle::{FlightLoop, FlightMode};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

/// Transport double that records every transmission and replays queued inbound frames.
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<MavContent>>,
    inbound: Mutex<VecDeque<MavFrame>>,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<MavContent> { self.sent.lock().unwrap().clone() }

    fn push_inbound(&self, content: MavContent) {
        self.inbound.lock().unwrap().push_back(MavFrame::new(Identity::VEHICLE, content));
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, content: MavContent) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(content);
        Ok(())
    }

    async fn recv_timeout(&self, _wait: Duration) -> Result<Option<MavFrame>, TransportError> {
        Ok(self.inbound.lock().unwrap().pop_front())
    }
}

fn recording_session(now: DateTime<Utc>) -> (GroundSession, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    (GroundSession::new(transport.clone(), now), transport)
}

fn vehicle_frame(content: MavContent) -> MavFrame { MavFrame::new(Identity::VEHICLE, content) }

fn position(rel_alt_mm: i32) -> GlobalPositionInt {
    GlobalPositionInt {
        time_boot_ms: 500,
        lat: -232_000_000,
        lon: -459_000_000,
        alt: rel_alt_mm,
        relative_alt: rel_alt_mm,
    }
}

#[test]
fn test_ingest_caches_telemetry_but_not_heartbeats() {
    let t0 = Utc::now();
    let mut snapshot = GroundSnapshot::new(t0);
    let t1 = t0 + TimeDelta::seconds(20);
    assert!(snapshot.ingest(t1, &vehicle_frame(MavContent::vehicle_heartbeat())));
    assert_eq!(snapshot.link().last_contact(), t1);
    let status = snapshot.status();
    assert!(status.last_position.is_none() && status.last_ack.is_none());
    assert!(snapshot.drain_events(30).is_empty());

    snapshot.ingest(t1, &vehicle_frame(MavContent::GlobalPositionInt(position(10_000))));
    snapshot.ingest(t1, &vehicle_frame(MavContent::ack(MAV_CMD_NAV_TAKEOFF, MavResult::Denied)));
    snapshot.ingest(t1, &vehicle_frame(MavContent::status_text(MavSeverity::Warning, "Takeoff denied: not armed")));
    let status = snapshot.status();
    assert_eq!(status.last_position.map(|p| p.relative_alt_m()), Some(10.0));
    assert_eq!(status.last_ack.map(|a| a.result()), Some(MavResult::Denied));
    assert_eq!(status.last_status.map(|s| s.text), Some("Takeoff denied: not armed".to_string()));

    let events = snapshot.drain_events(30);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].to_string(), "COMMAND_ACK | command=22 result=DENIED");
    assert_eq!(events[1].to_string(), "STATUSTEXT | [WARNING] Takeoff denied: not armed");
}

#[test]
fn test_unexpected_frames_do_not_count_as_contact() {
    let t0 = Utc::now();
    let mut snapshot = GroundSnapshot::new(t0);
    let echoed = vehicle_frame(MavContent::set_mode(4));
    assert!(!snapshot.ingest(t0 + TimeDelta::seconds(25), &echoed));
    assert_eq!(snapshot.link().last_contact(), t0);
    let empty = MavFrame { system_id: 1, component_id: 1, content: None };
    assert!(!snapshot.ingest(t0 + TimeDelta::seconds(25), &empty));
}

#[test]
fn test_watchdog_latches_stopped_once() {
    let t0 = Utc::now();
    let mut snapshot = GroundSnapshot::new(t0);
    assert_eq!(snapshot.check_link(t0 + GCS_LINK_TIMEOUT, GCS_LINK_TIMEOUT), None);
    assert!(snapshot.can_send());

    let late = t0 + GCS_LINK_TIMEOUT + TimeDelta::milliseconds(1);
    assert_eq!(snapshot.check_link(late, GCS_LINK_TIMEOUT), Some(crate::link::LinkTransition::Lost));
    assert!(snapshot.is_stopped() && !snapshot.can_send());
    assert_eq!(snapshot.check_link(late + TimeDelta::seconds(5), GCS_LINK_TIMEOUT), None);

    // a stray frame still updates the cache but neither the link nor the latch
    assert!(snapshot.ingest(late, &vehicle_frame(MavContent::GlobalPositionInt(position(1)))));
    assert!(snapshot.status().last_position.is_some());
    assert!(!snapshot.link().is_up());
    assert!(snapshot.status().is_down());
    assert!(!snapshot.can_send());
}

#[test]
fn test_event_queue_is_bounded() {
    let t0 = Utc::now();
    let mut snapshot = GroundSnapshot::new(t0);
    for command in 0..250 {
        snapshot.ingest(t0, &vehicle_frame(MavContent::ack(command, MavResult::Accepted)));
    }
    let mut drained = Vec::new();
    loop {
        let batch = snapshot.drain_events(30);
        if batch.is_empty() {
            break;
        }
        assert!(batch.len() <= 30);
        drained.extend(batch);
    }
    assert_eq!(drained.len(), GroundSnapshot::MAX_EVENTS);
    assert_eq!(drained[0], RxEvent::Ack(CommandAck { command: 50, result: MavResult::Accepted.into() }));
}

#[tokio::test]
async fn test_commands_are_encoded_for_the_vehicle() {
    let (session, transport) = recording_session(Utc::now());
    session.arm().await.unwrap();
    session.disarm().await.unwrap();
    session.set_mode(FlightMode::Loiter).await.unwrap();
    session.takeoff(12.5).await.unwrap();
    session.land().await.unwrap();
    session.move_to(20.0, 10.0, 15.0).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 6);
    assert!(matches!(&sent[0], MavContent::CommandLong(c) if c.command == MAV_CMD_COMPONENT_ARM_DISARM && c.param1 == 1.0));
    assert!(matches!(&sent[1], MavContent::CommandLong(c) if c.command == MAV_CMD_COMPONENT_ARM_DISARM && c.param1 == 0.0));
    assert!(matches!(&sent[2], MavContent::SetMode(m) if m.custom_mode == 5));
    assert!(matches!(&sent[3], MavContent::CommandLong(c) if c.command == MAV_CMD_NAV_TAKEOFF && c.param7 == 12.5));
    let MavContent::SetPositionTargetLocalNed(target) = &sent[5] else {
        panic!("expected a position target, got {:?}", sent[5]);
    };
    assert_eq!((target.x, target.y, target.z), (20.0, 10.0, -15.0));
    assert_eq!(target.type_mask, POSITION_TARGET_POSITION_ONLY);
    assert_eq!(target.coordinate_frame, MAV_FRAME_LOCAL_NED);
}

#[tokio::test]
async fn test_unrequestable_mode_is_not_sent() {
    let (session, transport) = recording_session(Utc::now());
    assert!(matches!(
        session.set_mode(FlightMode::Rtl).await,
        Err(CommandError::UnsupportedMode(FlightMode::Rtl))
    ));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_nothing_is_sent_after_the_latch() {
    let t0 = Utc::now();
    let (session, transport) = recording_session(t0);
    assert!(session.send_heartbeat().await.unwrap());
    assert!(!session.check_link(t0 + TimeDelta::seconds(10)).await);
    assert!(session.check_link(t0 + TimeDelta::seconds(31)).await);
    assert!(!session.check_link(t0 + TimeDelta::seconds(32)).await);
    let before = transport.sent().len();

    // vehicle traffic resumes after the latch
    transport.push_inbound(MavContent::vehicle_heartbeat());
    transport.push_inbound(MavContent::GlobalPositionInt(position(3_000)));
    while session.poll_inbound(Duration::ZERO).await.unwrap() {}

    assert!(matches!(session.arm().await, Err(CommandError::LinkLost)));
    assert!(matches!(session.takeoff(10.0).await, Err(CommandError::LinkLost)));
    assert!(matches!(session.move_to(1.0, 1.0, 5.0).await, Err(CommandError::LinkLost)));
    assert!(!session.send_heartbeat().await.unwrap());
    assert_eq!(transport.sent().len(), before);
    assert!(session.is_stopped().await);
    assert!(!session.link_up().await);
    assert!(session.status().await.last_position.is_some());
}

#[test]
fn test_console_parsing() {
    let parse = |line: &str| line.parse::<ConsoleCommand>();
    assert_eq!(parse("help"), Ok(ConsoleCommand::Help));
    assert_eq!(parse("  ?  "), Ok(ConsoleCommand::Help));
    assert_eq!(parse("EXIT"), Ok(ConsoleCommand::Quit));
    assert_eq!(parse("arm"), Ok(ConsoleCommand::Arm));
    assert_eq!(parse("Mode GUIDED"), Ok(ConsoleCommand::Mode(FlightMode::Guided)));
    assert_eq!(parse("mode land"), Ok(ConsoleCommand::Mode(FlightMode::Land)));
    assert_eq!(parse("takeoff 10"), Ok(ConsoleCommand::Takeoff(10.0)));
    assert_eq!(parse("takeoff 7.5m"), Ok(ConsoleCommand::Takeoff(7.5)));
    assert_eq!(parse("takeoff 10M"), Ok(ConsoleCommand::Takeoff(10.0)));
    assert_eq!(
        parse("setpos 20 10 15"),
        Ok(ConsoleCommand::SetPos { north_m: 20.0, east_m: 10.0, alt_m: 15.0 })
    );
    assert_eq!(
        parse("setpos -5.5 3 2"),
        Ok(ConsoleCommand::SetPos { north_m: -5.5, east_m: 3.0, alt_m: 2.0 })
    );

    assert_eq!(parse(""), Err(ParseError::Empty));
    assert_eq!(parse("   "), Err(ParseError::Empty));
    assert_eq!(parse("fly"), Err(ParseError::Unknown("fly".to_string())));
    assert!(matches!(parse("mode rtl"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("mode standby"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("mode"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("takeoff"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("takeoff ten"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("takeoff 10mm"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("setpos 1 2"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("setpos a 2 3"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("setpos nan 2 3"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("setpos 1 inf 3"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("setpos 1 2 -infinity"), Err(ParseError::Usage(_))));
    assert!(matches!(parse("takeoff nan"), Err(ParseError::Usage(_))));
    assert!(matches!(parse(&format!("takeoff {}", "9".repeat(400))), Err(ParseError::Usage(_))));
    assert!(matches!(parse("arm now"), Err(ParseError::Usage("arm"))));
    assert_eq!(parse("fly").unwrap_err().to_string(), "unknown command 'fly', type: help");
}

#[test]
fn test_render_status() {
    let empty = SessionStatus {
        last_position: None,
        last_ack: None,
        last_status: None,
        link_up: true,
        stopped: false,
    };
    let text = render_status(&empty);
    assert!(!text.contains("link lost"));
    assert!(text.contains("last STATUSTEXT: (none)"));
    assert!(text.contains("last POS: (none)"));

    let lost = SessionStatus {
        last_position: Some(position(15_000)),
        last_ack: Some(CommandAck { command: 400, result: MavResult::Accepted.into() }),
        link_up: false,
        stopped: true,
        ..empty
    };
    let text = render_status(&lost);
    assert!(text.starts_with("link lost"));
    assert!(text.contains("last COMMAND_ACK: command=400 result=ACCEPTED"));
    assert!(text.contains("rel_alt=15.0m"));
}

#[tokio::test]
async fn test_console_execute_reports_link_loss() {
    let t0 = Utc::now();
    let (session, transport) = recording_session(t0);
    assert_eq!(execute(&session, ConsoleCommand::Arm).await, None);
    assert_eq!(
        execute(&session, ConsoleCommand::Pos).await.as_deref(),
        Some("no GLOBAL_POSITION_INT received yet")
    );
    session.check_link(t0 + TimeDelta::seconds(31)).await;
    let text = execute(&session, ConsoleCommand::Land).await.unwrap();
    assert!(text.contains("command NOT sent"));
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn test_ground_and_vehicle_exchange_over_memory_link() {
    let (gcs_end, uav_end) = ChannelTransport::pair(Identity::GCS, Identity::VEHICLE);
    let session = GroundSession::new(Arc::new(gcs_end), Utc::now());
    assert!(session.send_heartbeat().await.unwrap());
    let mut flight_loop = FlightLoop::connect(Arc::new(uav_end), Duration::from_secs(1)).await.unwrap();

    session.arm().await.unwrap();
    session.set_mode(FlightMode::Guided).await.unwrap();
    session.takeoff(10.0).await.unwrap();
    for _ in 0..3 {
        flight_loop.iterate(Utc::now()).await.unwrap();
    }
    let vehicle = flight_loop.controller().state();
    assert!(vehicle.armed && vehicle.flying);
    assert_eq!(vehicle.mode, FlightMode::Guided);

    while session.poll_inbound(Duration::from_millis(20)).await.unwrap() {}
    let status = session.status().await;
    assert!(status.link_up);
    assert!(status.last_position.is_some());
    let last_ack = status.last_ack.unwrap();
    assert_eq!((last_ack.command, last_ack.result()), (MAV_CMD_NAV_TAKEOFF, MavResult::Accepted));

    let texts: Vec<String> = session
        .drain_events(30)
        .await
        .into_iter()
        .filter_map(|event| match event {
            RxEvent::Status(st) => Some(st.text),
            RxEvent::Ack(_) => None,
        })
        .collect();
    assert_eq!(texts, vec!["Motors armed", "Mode change requested", "Taking off to 10.0m"]);
}
