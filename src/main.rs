#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod common;
mod config;
mod ground;
mod link;
mod logger;
mod messaging;
mod scheduling;
mod vehicle;

use crate::config::NetConfig;
use crate::ground::GroundSession;
use crate::messaging::{Identity, Transport, UdpTransport};
use crate::scheduling::RunFlag;
use crate::vehicle::VehicleError;
use chrono::Utc;
use std::{env, sync::Arc};

const USAGE: &str = "usage: uav-link <vehicle|gcs>";

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let role_arg = env::args().nth(1);
    match role_arg.as_deref() {
        Some("vehicle" | "uav") => run_vehicle_process().await,
        Some("gcs" | "ground") => run_ground_process().await,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

/// Clears `running` on Ctrl-C.
fn watch_ctrl_c(running: &RunFlag) {
    let running_local = running.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
        }
        running_local.stop();
    });
}

async fn bind(net: NetConfig, identity: Identity) -> Arc<dyn Transport> {
    match UdpTransport::bind(net.listen, net.peer, identity).await {
        Ok(transport) => {
            if let Ok(local) = transport.local_addr() {
                info!("Listening on {local}, sending to {}", net.peer);
            }
            Arc::new(transport)
        }
        Err(e) => fatal!("Could not bind {}: {e:?}", net.listen),
    }
}

async fn run_vehicle_process() {
    logger::set_origin("UAV");
    let net = NetConfig::vehicle_from_env().unwrap_or_else(|e| fatal!("Invalid address: {e}"));
    let transport = bind(net, Identity::VEHICLE).await;
    let running = RunFlag::new();
    watch_ctrl_c(&running);

    match vehicle::run_vehicle(transport, running).await {
        Ok(()) => info!("Vehicle stopped"),
        Err(VehicleError::HandshakeTimeout) => {
            error!("No frame received during the handshake window, aborting");
            std::process::exit(1);
        }
        Err(VehicleError::Transport(e)) => {
            error!("Link failed: {e:?}");
            std::process::exit(1);
        }
    }
}

async fn run_ground_process() {
    logger::set_origin("GCS");
    let net = NetConfig::ground_from_env().unwrap_or_else(|e| fatal!("Invalid address: {e}"));
    let transport = bind(net, Identity::GCS).await;
    let running = RunFlag::new();
    watch_ctrl_c(&running);

    let session = GroundSession::new(transport, Utc::now());
    scheduling::send_initial_heartbeats(&session).await;
    let workers = scheduling::spawn_ground_workers(&session, &running);

    ground::run_console(session, running.clone()).await;

    running.stop();
    for joined in futures::future::join_all(workers).await {
        if let Err(e) = joined {
            error!("Worker ended abnormally: {e}");
        }
    }
    info!("Ground station stopped");
}
