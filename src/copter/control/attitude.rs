use crate::{hal::SensorSnapshot, ControlCommand};

/// Roll, pitch and yaw control.
///
/// Roll and pitch combine a proportional term on the clamped angle, the measured
/// rate as damping, and the external command fed straight through. Yaw is the
/// external command alone.
#[derive(Clone, Debug, PartialEq)]
pub struct AttitudeController {
    pub kp_roll: f32,
    pub kp_pitch: f32,
    /// Limit of the measured angles (in radians)
    pub angle_limit: f32,
}

impl Default for AttitudeController {
    fn default() -> Self {
        Self {
            kp_roll: 50.,
            kp_pitch: 30.,
            angle_limit: 1.,
        }
    }
}

impl AttitudeController {
    pub fn roll(&self, sensors: &SensorSnapshot, cmd: &ControlCommand) -> f32 {
        self.kp_roll * sensors.roll.clamp(-self.angle_limit, self.angle_limit)
            + sensors.roll_rate
            + cmd.roll
    }

    pub fn pitch(&self, sensors: &SensorSnapshot, cmd: &ControlCommand) -> f32 {
        self.kp_pitch * sensors.pitch.clamp(-self.angle_limit, self.angle_limit)
            + sensors.pitch_rate
            + cmd.pitch
    }

    pub fn yaw(&self, cmd: &ControlCommand) -> f32 {
        cmd.yaw
    }
}
