use crate::config::{GCS_COMPONENT_ID, GCS_SYSTEM_ID, UAV_COMPONENT_ID, UAV_SYSTEM_ID};
use strum_macros::IntoStaticStr;

pub const MAV_CMD_NAV_LAND: u32 = 21;
pub const MAV_CMD_NAV_TAKEOFF: u32 = 22;
pub const MAV_CMD_COMPONENT_ARM_DISARM: u32 = 400;

pub const MAV_TYPE_QUADROTOR: u32 = 2;
pub const MAV_TYPE_GCS: u32 = 6;
pub const MAV_AUTOPILOT_ARDUPILOTMEGA: u32 = 3;
pub const MAV_AUTOPILOT_INVALID: u32 = 8;

pub const MAV_FRAME_LOCAL_NED: u32 = 1;
pub const MAV_MODE_FLAG_CUSTOM_MODE_ENABLED: u32 = 1;

/// Type mask bits that mark the x/y/z position fields as ignored.
pub const POSITION_TARGET_IGNORE_X: u32 = 1 << 0;
pub const POSITION_TARGET_IGNORE_Y: u32 = 1 << 1;
pub const POSITION_TARGET_IGNORE_Z: u32 = 1 << 2;
/// Position only: velocities, accelerations, yaw and yaw rate ignored.
pub const POSITION_TARGET_POSITION_ONLY: u32 = 0b0000_1111_1111_1000;

/// Maximum payload length of a status text in bytes.
pub const STATUS_TEXT_MAX_LEN: usize = 50;

/// Sender identity stamped into every outgoing frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub system_id: u32,
    pub component_id: u32,
}

impl Identity {
    pub const GCS: Identity = Identity { system_id: GCS_SYSTEM_ID, component_id: GCS_COMPONENT_ID };
    pub const VEHICLE: Identity = Identity { system_id: UAV_SYSTEM_ID, component_id: UAV_COMPONENT_ID };
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MavFrame {
    #[prost(uint32, tag = "1")]
    pub system_id: u32,
    #[prost(uint32, tag = "2")]
    pub component_id: u32,
    #[prost(oneof = "MavContent", tags = "3, 4, 5, 6, 7, 8, 9")]
    pub content: Option<MavContent>,
}

impl MavFrame {
    pub fn new(identity: Identity, content: MavContent) -> Self {
        Self {
            system_id: identity.system_id,
            component_id: identity.component_id,
            content: Some(content),
        }
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Heartbeat {
    #[prost(uint32, tag = "1")]
    pub mav_type: u32,
    #[prost(uint32, tag = "2")]
    pub autopilot: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct CommandLong {
    #[prost(uint32, tag = "1")]
    pub target_system: u32,
    #[prost(uint32, tag = "2")]
    pub command: u32,
    #[prost(float, tag = "3")]
    pub param1: f32,
    #[prost(float, tag = "4")]
    pub param2: f32,
    #[prost(float, tag = "5")]
    pub param3: f32,
    #[prost(float, tag = "6")]
    pub param4: f32,
    #[prost(float, tag = "7")]
    pub param5: f32,
    #[prost(float, tag = "8")]
    pub param6: f32,
    #[prost(float, tag = "9")]
    pub param7: f32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct CommandAck {
    #[prost(uint32, tag = "1")]
    pub command: u32,
    #[prost(enumeration = "MavResult", tag = "2")]
    pub result: i32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SetMode {
    #[prost(uint32, tag = "1")]
    pub target_system: u32,
    #[prost(uint32, tag = "2")]
    pub base_mode: u32,
    #[prost(uint32, tag = "3")]
    pub custom_mode: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SetPositionTargetLocalNed {
    #[prost(uint32, tag = "1")]
    pub time_boot_ms: u32,
    #[prost(uint32, tag = "2")]
    pub coordinate_frame: u32,
    #[prost(uint32, tag = "3")]
    pub type_mask: u32,
    #[prost(float, tag = "4")]
    pub x: f32,
    #[prost(float, tag = "5")]
    pub y: f32,
    #[prost(float, tag = "6")]
    pub z: f32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GlobalPositionInt {
    #[prost(uint32, tag = "1")]
    pub time_boot_ms: u32,
    /// Latitude in degrees * 1e7.
    #[prost(sint32, tag = "2")]
    pub lat: i32,
    /// Longitude in degrees * 1e7.
    #[prost(sint32, tag = "3")]
    pub lon: i32,
    /// Altitude in millimeters.
    #[prost(sint32, tag = "4")]
    pub alt: i32,
    /// Altitude above home in millimeters.
    #[prost(sint32, tag = "5")]
    pub relative_alt: i32,
}

impl GlobalPositionInt {
    pub fn lat_deg(&self) -> f64 { f64::from(self.lat) / 1e7 }
    pub fn lon_deg(&self) -> f64 { f64::from(self.lon) / 1e7 }
    pub fn alt_m(&self) -> f64 { f64::from(self.alt) / 1000.0 }
    pub fn relative_alt_m(&self) -> f64 { f64::from(self.relative_alt) / 1000.0 }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StatusText {
    #[prost(enumeration = "MavSeverity", tag = "1")]
    pub severity: i32,
    #[prost(string, tag = "2")]
    pub text: String,
}

#[derive(Clone, PartialEq, prost::Oneof, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MavContent {
    #[prost(message, tag = "3")]
    Heartbeat(Heartbeat),
    #[prost(message, tag = "4")]
    CommandLong(CommandLong),
    #[prost(message, tag = "5")]
    CommandAck(CommandAck),
    #[prost(message, tag = "6")]
    SetMode(SetMode),
    #[prost(message, tag = "7")]
    SetPositionTargetLocalNed(SetPositionTargetLocalNed),
    #[prost(message, tag = "8")]
    GlobalPositionInt(GlobalPositionInt),
    #[prost(message, tag = "9")]
    #[strum(serialize = "STATUSTEXT")]
    StatusText(StatusText),
}

impl MavContent {
    /// Message type name as used in logs and console output.
    pub fn kind(&self) -> &'static str { self.into() }

    pub fn gcs_heartbeat() -> Self {
        MavContent::Heartbeat(Heartbeat { mav_type: MAV_TYPE_GCS, autopilot: MAV_AUTOPILOT_INVALID })
    }

    pub fn vehicle_heartbeat() -> Self {
        MavContent::Heartbeat(Heartbeat {
            mav_type: MAV_TYPE_QUADROTOR,
            autopilot: MAV_AUTOPILOT_ARDUPILOTMEGA,
        })
    }

    /// A command addressed to the vehicle, with up to seven parameters.
    pub fn command(command: u32, params: [f32; 7]) -> Self {
        let [param1, param2, param3, param4, param5, param6, param7] = params;
        MavContent::CommandLong(CommandLong {
            target_system: UAV_SYSTEM_ID,
            command,
            param1,
            param2,
            param3,
            param4,
            param5,
            param6,
            param7,
        })
    }

    pub fn ack(command: u32, result: MavResult) -> Self {
        MavContent::CommandAck(CommandAck { command, result: result.into() })
    }

    pub fn set_mode(custom_mode: u32) -> Self {
        MavContent::SetMode(SetMode {
            target_system: UAV_SYSTEM_ID,
            base_mode: MAV_MODE_FLAG_CUSTOM_MODE_ENABLED,
            custom_mode,
        })
    }

    /// Status text, truncated to [`STATUS_TEXT_MAX_LEN`] bytes on a char boundary.
    pub fn status_text(severity: MavSeverity, text: &str) -> Self {
        MavContent::StatusText(StatusText {
            severity: severity.into(),
            text: truncate_utf8(text, STATUS_TEXT_MAX_LEN).to_string(),
        })
    }
}

/// Cuts `text` to at most `max_len` bytes without splitting a UTF-8 sequence.
pub fn truncate_utf8(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum MavResult {
    Accepted = 0,
    TemporarilyRejected = 1,
    Denied = 2,
    Unsupported = 3,
    Failed = 4,
}

impl MavResult {
    pub fn as_str_name(self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::TemporarilyRejected => "TEMPORARILY_REJECTED",
            Self::Denied => "DENIED",
            Self::Unsupported => "UNSUPPORTED",
            Self::Failed => "FAILED",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum MavSeverity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl MavSeverity {
    pub fn as_str_name(self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::Alert => "ALERT",
            Self::Critical => "CRITICAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Notice => "NOTICE",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}
