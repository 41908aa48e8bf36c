use crate::ControlCommand;
use embedded_time::duration::Milliseconds;

/// Everything the control loop carries from one tick to the next.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerState {
    /// Altitude setpoint integrated from the throttle (in meters)
    pub target_altitude: f32,
    /// The most recently accepted command, reused until a new one arrives
    pub last_command: ControlCommand,
    pub last_command_at: Milliseconds<u64>,
    /// Number of accepted packets
    pub packet_count: u64,
    /// Number of discarded packets
    pub parse_failures: u64,
    pub last_log_at: Milliseconds<u64>,
    /// Time of the latest tick
    pub now: Milliseconds<u64>,
}

impl ControllerState {
    pub fn new(target_altitude: f32, started_at: Milliseconds<u64>) -> Self {
        Self {
            target_altitude,
            last_command: ControlCommand::ZERO,
            last_command_at: started_at,
            packet_count: 0,
            parse_failures: 0,
            last_log_at: started_at,
            now: started_at,
        }
    }

    /// Adopt a freshly received command.
    pub fn accept(&mut self, cmd: ControlCommand, now: Milliseconds<u64>) {
        self.last_command = cmd;
        self.last_command_at = now;
        self.packet_count += 1;
    }

    /// Time since the last accepted command, `None` before the first one.
    pub fn since_last_command(&self, now: Milliseconds<u64>) -> Option<Milliseconds<u64>> {
        (self.packet_count > 0).then(|| Milliseconds(now.0.saturating_sub(self.last_command_at.0)))
    }
}
