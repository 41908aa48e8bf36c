//! Command freshness tracking and periodic status reporting.
//!
//! Nothing here changes how the vehicle is controlled: a stale command keeps
//! being applied and is only reported.

use crate::{command::Reception, copter::ControllerState, hal::SensorSnapshot, ControlCommand};
use core::fmt;
use embedded_time::duration::Milliseconds;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct Watchdog {
    /// Silence after which the last command is reported as stale
    pub stale_after: Milliseconds<u64>,
    /// Time between status reports
    pub status_interval: Milliseconds<u64>,
    /// Log every n-th accepted packet, 0 disables
    pub packet_log_interval: u64,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self {
            stale_after: Milliseconds(3_000),
            status_interval: Milliseconds(5_000),
            packet_log_interval: 100,
        }
    }
}

/// What the watchdog found on one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WatchdogReport {
    /// Time since the last packet if the command is stale
    pub stale_for: Option<Milliseconds<u64>>,
    pub status: Option<StatusReport>,
}

impl Watchdog {
    /// Update the packet statistics with the outcome of this tick's read.
    pub fn record(&self, state: &mut ControllerState, reception: &Reception, now: Milliseconds<u64>) {
        match reception {
            Reception::Command(cmd) => {
                state.accept(*cmd, now);
                if self.packet_log_interval > 0 && state.packet_count % self.packet_log_interval == 0 {
                    info!(packets = state.packet_count, latest = %cmd, "command packets received");
                }
            }
            Reception::Malformed(err) => {
                state.parse_failures += 1;
                debug!(parse_failures = state.parse_failures, %err, "command packet discarded");
            }
            Reception::NoPacket => {}
        }
    }

    /// Time since the last packet if it exceeds the stale threshold.
    ///
    /// A controller that never received a packet is not reported as stale.
    pub fn stale_for(&self, state: &ControllerState, now: Milliseconds<u64>) -> Option<Milliseconds<u64>> {
        state
            .since_last_command(now)
            .filter(|since| since.0 > self.stale_after.0)
    }

    pub fn inspect(
        &self,
        state: &mut ControllerState,
        sensors: &SensorSnapshot,
        now: Milliseconds<u64>,
    ) -> WatchdogReport {
        let status = if now.0.saturating_sub(state.last_log_at.0) >= self.status_interval.0 {
            state.last_log_at = now;

            let report = StatusReport::new(state, sensors, now);
            info!("{report}");
            Some(report)
        } else {
            None
        };

        let stale_for = self.stale_for(state, now);
        if let Some(since) = stale_for {
            warn!(
                "no command packets received in {:.1} s, holding {}",
                since.0 as f32 / 1000.,
                state.last_command
            );
        }

        WatchdogReport { stale_for, status }
    }
}

/// A human readable snapshot of the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusReport {
    pub altitude: f32,
    pub target_altitude: f32,
    pub roll_degrees: f32,
    pub pitch_degrees: f32,
    pub command: ControlCommand,
    pub packets: u64,
    pub parse_failures: u64,
    pub since_last_packet: Option<Milliseconds<u64>>,
}

impl StatusReport {
    pub fn new(state: &ControllerState, sensors: &SensorSnapshot, now: Milliseconds<u64>) -> Self {
        Self {
            altitude: sensors.altitude,
            target_altitude: state.target_altitude,
            roll_degrees: sensors.roll.to_degrees(),
            pitch_degrees: sensors.pitch.to_degrees(),
            command: state.last_command,
            packets: state.packet_count,
            parse_failures: state.parse_failures,
            since_last_packet: state.since_last_command(now),
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "altitude {:.2} m (target {:.2} m) | roll {:.2}° pitch {:.2}° | command r={:.2} p={:.2} y={:.2} t={:.2} | packets {} ({} malformed)",
            self.altitude,
            self.target_altitude,
            self.roll_degrees,
            self.pitch_degrees,
            self.command.roll,
            self.command.pitch,
            self.command.yaw,
            self.command.throttle,
            self.packets,
            self.parse_failures,
        )?;

        match self.since_last_packet {
            Some(since) => write!(f, ", last {:.1} s ago", since.0 as f32 / 1000.),
            None => f.write_str(", none yet"),
        }
    }
}
