use super::{error::CommandError, ground_session::GroundSession, ground_snapshot::SessionStatus};
use crate::config::{GCS_LINK_TIMEOUT, RX_POLL_TIMEOUT};
use crate::messaging::GlobalPositionInt;
use crate::scheduling::RunFlag;
use crate::vehicle::FlightMode;
use crate::{info, link, warn};
use regex::Regex;
use std::{
    fmt,
    io::Write,
    str::FromStr,
    sync::LazyLock,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Events printed before each prompt, at most.
const MAX_EVENTS_PER_PROMPT: usize = 30;

const HELP: &str = "\
=== COMMANDS ===
help | ?                  this text
status                    last status text, ack and position
arm | disarm
mode guided|loiter|land
takeoff <alt>[m]          e.g. takeoff 10 or takeoff 10m
land
setpos <north> <east> <alt>
pos                       last GLOBAL_POSITION_INT
alt                       last altitude
quit | exit";

static TAKEOFF_ALT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([+-]?(?:\d+\.?\d*|\.\d+))m?$").unwrap());

/// One line of operator input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Help,
    Status,
    Arm,
    Disarm,
    Mode(FlightMode),
    Takeoff(f64),
    Land,
    SetPos { north_m: f64, east_m: f64, alt_m: f64 },
    Pos,
    Alt,
    Quit,
}

/// Input the console could not turn into a command. Never reaches the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    /// Known command with bad arguments; carries the usage line.
    Usage(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => Ok(()),
            ParseError::Unknown(cmd) => write!(f, "unknown command '{cmd}', type: help"),
            ParseError::Usage(usage) => write!(f, "usage: {usage}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl FromStr for ConsoleCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(ParseError::Empty);
        };
        let cmd = cmd.to_lowercase();
        let no_args = |command| {
            if args.is_empty() { Ok(command) } else { Err(ParseError::Usage(cmd_usage(&cmd))) }
        };
        match cmd.as_str() {
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" => Ok(ConsoleCommand::Quit),
            "status" => no_args(ConsoleCommand::Status),
            "arm" => no_args(ConsoleCommand::Arm),
            "disarm" => no_args(ConsoleCommand::Disarm),
            "land" => no_args(ConsoleCommand::Land),
            "pos" => no_args(ConsoleCommand::Pos),
            "alt" => no_args(ConsoleCommand::Alt),
            "mode" => match args {
                [name] => FlightMode::from_str(name)
                    .ok()
                    .filter(|mode| mode.custom_mode().is_some())
                    .map(ConsoleCommand::Mode)
                    .ok_or(ParseError::Usage(cmd_usage("mode"))),
                _ => Err(ParseError::Usage(cmd_usage("mode"))),
            },
            "takeoff" => match args {
                [alt] => TAKEOFF_ALT
                    .captures(alt)
                    .and_then(|caps| finite(&caps[1]))
                    .map(ConsoleCommand::Takeoff)
                    .ok_or(ParseError::Usage(cmd_usage("takeoff"))),
                _ => Err(ParseError::Usage(cmd_usage("takeoff"))),
            },
            "setpos" => match args {
                [north, east, alt] => match (finite(north), finite(east), finite(alt)) {
                    (Some(north_m), Some(east_m), Some(alt_m)) => {
                        Ok(ConsoleCommand::SetPos { north_m, east_m, alt_m })
                    }
                    _ => Err(ParseError::Usage(cmd_usage("setpos"))),
                },
                _ => Err(ParseError::Usage(cmd_usage("setpos"))),
            },
            _ => Err(ParseError::Unknown(cmd.clone())),
        }
    }
}

/// Parses a coordinate, refusing `nan` and `inf`.
fn finite(arg: &str) -> Option<f64> { arg.parse::<f64>().ok().filter(|v| v.is_finite()) }

fn cmd_usage(cmd: &str) -> &'static str {
    match cmd {
        "mode" => "mode guided | loiter | land",
        "takeoff" => "takeoff <alt_m>  (e.g. takeoff 10 | takeoff 10m)",
        "setpos" => "setpos <north_m> <east_m> <alt_m>",
        "status" => "status",
        "arm" => "arm",
        "disarm" => "disarm",
        "land" => "land",
        "pos" => "pos",
        "alt" => "alt",
        _ => "help",
    }
}

fn link_lost_notice() -> String {
    format!("link lost (>={}s without vehicle telemetry)", GCS_LINK_TIMEOUT.num_seconds())
}

fn render_outcome(result: Result<(), CommandError>) -> Option<String> {
    match result {
        Ok(()) => None,
        Err(CommandError::LinkLost) => Some(format!("{}, command NOT sent", link_lost_notice())),
        Err(CommandError::UnsupportedMode(mode)) => {
            Some(format!("mode {mode} cannot be requested, {}", cmd_usage("mode")))
        }
        Err(CommandError::Transport(e)) => Some(format!("send failed: {e:?}")),
    }
}

fn render_position(pos: &GlobalPositionInt) -> String {
    format!(
        "POS lat={:.7} lon={:.7} alt={:.1}m rel_alt={:.1}m",
        pos.lat_deg(),
        pos.lon_deg(),
        pos.alt_m(),
        pos.relative_alt_m()
    )
}

/// Renders the `status` command output.
pub fn render_status(status: &SessionStatus) -> String {
    let mut lines = Vec::new();
    if status.is_down() {
        lines.push(link_lost_notice());
    }
    lines.push("--- STATUS ---".to_string());
    lines.push(format!(
        "last STATUSTEXT: {}",
        status
            .last_status
            .as_ref()
            .map_or("(none)".to_string(), |st| format!("[{}] {}", st.severity().as_str_name(), st.text))
    ));
    lines.push(format!(
        "last COMMAND_ACK: {}",
        status.last_ack.map_or("(none)".to_string(), |ack| format!(
            "command={} result={}",
            ack.command,
            ack.result().as_str_name()
        ))
    ));
    lines.push(format!(
        "last {}",
        status.last_position.as_ref().map_or("POS: (none)".to_string(), render_position)
    ));
    lines.join("\n")
}

/// Runs one parsed command against the session. Returns the text to show, if any.
pub async fn execute(session: &GroundSession, command: ConsoleCommand) -> Option<String> {
    match command {
        ConsoleCommand::Help => Some(HELP.to_string()),
        ConsoleCommand::Quit => None,
        ConsoleCommand::Status => Some(render_status(&session.status().await)),
        ConsoleCommand::Arm => render_outcome(session.arm().await),
        ConsoleCommand::Disarm => render_outcome(session.disarm().await),
        ConsoleCommand::Mode(mode) => render_outcome(session.set_mode(mode).await),
        ConsoleCommand::Takeoff(alt_m) => render_outcome(session.takeoff(alt_m).await),
        ConsoleCommand::Land => render_outcome(session.land().await),
        ConsoleCommand::SetPos { north_m, east_m, alt_m } => {
            render_outcome(session.move_to(north_m, east_m, alt_m).await)
        }
        ConsoleCommand::Pos => Some(
            session
                .status()
                .await
                .last_position
                .as_ref()
                .map_or("no GLOBAL_POSITION_INT received yet".to_string(), render_position),
        ),
        ConsoleCommand::Alt => Some(session.status().await.last_position.map_or(
            "no GLOBAL_POSITION_INT received yet".to_string(),
            |pos| format!("ALT rel_alt={:.1}m (alt={:.1}m)", pos.relative_alt_m(), pos.alt_m()),
        )),
    }
}

fn prompt() {
    print!("[GCS] command> ");
    let _ = std::io::stdout().flush();
}

/// Interactive loop on stdin. Reads are bounded by the receive poll timeout so a
/// cleared `running` flag is noticed; `quit` and end of input clear it.
pub async fn run_console(session: GroundSession, running: RunFlag) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut lost_announced = false;
    let mut show_prompt = true;
    info!("Interactive console ready (type help)");

    while running.is_running() {
        if !lost_announced && session.is_stopped().await {
            link!("{}. TX stopped (no reconnect)", link_lost_notice());
            lost_announced = true;
        }
        let events = session.drain_events(MAX_EVENTS_PER_PROMPT).await;
        if !events.is_empty() {
            println!();
            show_prompt = true;
        }
        for rx in events {
            println!("[GCS] rx: {rx}");
        }
        if show_prompt {
            prompt();
            show_prompt = false;
        }

        let line = match tokio::time::timeout(RX_POLL_TIMEOUT, lines.next_line()).await {
            Err(_) => continue,
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => {
                info!("End of input, leaving");
                break;
            }
            Ok(Err(e)) => {
                warn!("Reading stdin failed: {e}");
                break;
            }
        };
        show_prompt = true;

        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => {
                info!("Leaving...");
                break;
            }
            Ok(command) => {
                if let Some(text) = execute(&session, command).await {
                    println!("{text}");
                }
            }
            Err(ParseError::Empty) => {}
            Err(e) => println!("{e}"),
        }
    }
    running.stop();
}
