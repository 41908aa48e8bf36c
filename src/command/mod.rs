//! Attitude/throttle commands and their text wire format.
//!
//! A command travels as one UDP datagram holding four whitespace separated
//! decimals in the order `roll pitch yaw throttle`:
//! ```
//! use copter_link::ControlCommand;
//!
//! let cmd: ControlCommand = "0.0 0.5 0.0 0.6\n".parse().unwrap();
//! assert_eq!(cmd.pitch, 0.5);
//! assert_eq!(cmd.to_string(), "0.000000 0.500000 0.000000 0.600000");
//! ```

use core::fmt;
use core::num::ParseFloatError;
use core::str::FromStr;

mod channel;
pub use channel::{CommandChannel, CommandSource, Reception};

mod sender;
pub use sender::{CommandSender, SenderStats};

/// Limit of the roll, pitch and yaw efforts.
pub const MAX_ATTITUDE_EFFORT: f32 = 2.0;

/// Limit of the throttle, interpreted as a vertical velocity (in m/s).
pub const MAX_THROTTLE: f32 = 1.0;

/// Longest accepted datagram (in bytes).
pub const MAX_PACKET_LEN: usize = 128;

const FIELD_COUNT: usize = 4;

/// A setpoint received from the external command process.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlCommand {
    /// Roll effort in -2 ~ +2
    pub roll: f32,
    /// Pitch effort in -2 ~ +2
    pub pitch: f32,
    /// Yaw effort in -2 ~ +2
    pub yaw: f32,
    /// Vertical velocity in -1 ~ +1 m/s
    pub throttle: f32,
}

impl ControlCommand {
    pub const ZERO: Self = Self {
        roll: 0.,
        pitch: 0.,
        yaw: 0.,
        throttle: 0.,
    };

    /// Create a new command, clamping every field to its allowed range.
    pub fn new(roll: f32, pitch: f32, yaw: f32, throttle: f32) -> Self {
        Self {
            roll: roll.clamp(-MAX_ATTITUDE_EFFORT, MAX_ATTITUDE_EFFORT),
            pitch: pitch.clamp(-MAX_ATTITUDE_EFFORT, MAX_ATTITUDE_EFFORT),
            yaw: yaw.clamp(-MAX_ATTITUDE_EFFORT, MAX_ATTITUDE_EFFORT),
            throttle: throttle.clamp(-MAX_THROTTLE, MAX_THROTTLE),
        }
    }

    /// Decode a raw datagram payload.
    ///
    /// Payloads longer than [`MAX_PACKET_LEN`] are rejected whole.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() > MAX_PACKET_LEN {
            return Err(DecodeError::TooLong(payload.len()));
        }
        core::str::from_utf8(payload)
            .map_err(|_| DecodeError::NotText)?
            .parse()
    }
}

impl FromStr for ControlCommand {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.split_whitespace().count();
        if count != FIELD_COUNT {
            return Err(DecodeError::FieldCount(count));
        }

        let mut fields = [0f32; FIELD_COUNT];
        for (index, (field, token)) in fields.iter_mut().zip(s.split_whitespace()).enumerate() {
            let value: f32 = token
                .parse()
                .map_err(|source| DecodeError::InvalidField { index, source })?;
            if !value.is_finite() {
                return Err(DecodeError::NonFinite { index });
            }
            *field = value;
        }

        let [roll, pitch, yaw, throttle] = fields;
        Ok(Self::new(roll, pitch, yaw, throttle))
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} {:.6} {:.6} {:.6}",
            self.roll, self.pitch, self.yaw, self.throttle
        )
    }
}

/// The reason a datagram was discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is not valid UTF-8.
    NotText,
    /// The datagram held more than [`MAX_PACKET_LEN`] bytes.
    TooLong(usize),
    /// The payload did not hold exactly four fields.
    FieldCount(usize),
    InvalidField {
        index: usize,
        source: ParseFloatError,
    },
    /// A field parsed to NaN or infinity.
    NonFinite { index: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NotText => f.write_str("payload is not valid text"),
            DecodeError::TooLong(len) => {
                write!(f, "payload of {len} bytes exceeds {MAX_PACKET_LEN}")
            }
            DecodeError::FieldCount(count) => {
                write!(f, "expected {FIELD_COUNT} fields, found {count}")
            }
            DecodeError::InvalidField { index, source } => {
                write!(f, "field {index} is not a number: {source}")
            }
            DecodeError::NonFinite { index } => write!(f, "field {index} is not finite"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::InvalidField { source, .. } => Some(source),
            _ => None,
        }
    }
}
