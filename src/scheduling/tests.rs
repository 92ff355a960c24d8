use super::*;
use crate::ground::{GroundSession, RxEvent};
use crate::messaging::{ChannelTransport, Identity, MavContent, MavSeverity, Transport};
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;

fn linked_session() -> (GroundSession, ChannelTransport) {
    let (gcs, uav) = ChannelTransport::pair(Identity::GCS, Identity::VEHICLE);
    (GroundSession::new(Arc::new(gcs), Utc::now()), uav)
}

#[test]
fn test_run_flag_is_shared_between_clones() {
    let flag = RunFlag::new();
    let other = flag.clone();
    assert!(other.is_running());
    flag.stop();
    assert!(!other.is_running());
    other.stop();
    assert!(!flag.is_running());
}

#[tokio::test]
async fn test_pause_runs_out_while_running() {
    let flag = RunFlag::default();
    assert!(flag.pause(Duration::from_millis(10)).await);
}

#[tokio::test]
async fn test_stop_wakes_paused_loops() {
    let flag = RunFlag::new();
    let paused = flag.clone();
    let handle = tokio::spawn(async move { paused.pause(Duration::from_secs(60)).await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    flag.stop();
    let keep_running = timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    assert!(!keep_running);
    assert!(!flag.pause(Duration::from_secs(60)).await);
}

#[tokio::test]
async fn test_heartbeat_worker_sends_without_input() {
    let (session, uav) = linked_session();
    let running = RunFlag::new();
    let handle = spawn_heartbeat(session, running.clone());
    let frame = uav.recv_timeout(Duration::from_millis(500)).await.unwrap().unwrap();
    assert_eq!(frame.system_id, Identity::GCS.system_id);
    assert_eq!(frame.content, Some(MavContent::gcs_heartbeat()));
    running.stop();
    timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_receiver_feeds_session() {
    let (session, uav) = linked_session();
    let running = RunFlag::new();
    let handle = spawn_receiver(session.clone(), running.clone());
    uav.send(MavContent::status_text(MavSeverity::Info, "Motors armed")).await.unwrap();

    let mut events = Vec::new();
    for _ in 0..50 {
        events = session.drain_events(30).await;
        if !events.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], RxEvent::Status(st) if st.text == "Motors armed"));
    assert_eq!(session.status().await.last_status.map(|st| st.text), Some("Motors armed".into()));

    running.stop();
    timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_initial_heartbeats() {
    let (session, uav) = linked_session();
    send_initial_heartbeats(&session).await;
    let mut count = 0;
    while let Some(frame) = uav.recv_timeout(Duration::from_millis(20)).await.unwrap() {
        assert_eq!(frame.content, Some(MavContent::gcs_heartbeat()));
        count += 1;
    }
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_all_workers_exit_within_one_poll_interval() {
    let (session, _uav) = linked_session();
    let running = RunFlag::new();
    let handles = spawn_ground_workers(&session, &running);
    tokio::time::sleep(Duration::from_millis(50)).await;
    running.stop();
    let joined = timeout(Duration::from_secs(1), futures::future::join_all(handles)).await.unwrap();
    assert!(joined.iter().all(Result::is_ok));
    assert!(!session.is_stopped().await);
}
