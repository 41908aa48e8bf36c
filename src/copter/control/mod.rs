//! The per-tick stabilization law.

mod altitude;
pub use altitude::AltitudeController;

mod attitude;
pub use attitude::AttitudeController;

use super::ControllerState;
use crate::hal::SensorSnapshot;
use nalgebra::Vector4;

/// Tunable constants of the stabilization loop.
#[derive(Clone, Debug, PartialEq)]
pub struct Gains {
    pub kp_roll: f32,
    pub kp_pitch: f32,
    pub kp_vertical: f32,
    /// Bias added to the altitude error (in meters)
    pub vertical_offset: f32,
    /// Nominal motor velocity for level hover with zero control input
    pub thrust_bias: f32,
    /// Limit of the measured roll and pitch angles (in radians)
    pub angle_limit: f32,
    /// Limit of the biased altitude error (in meters)
    pub altitude_error_limit: f32,
    /// Highest allowed target altitude (in meters)
    pub ceiling: f32,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            kp_roll: 50.,
            kp_pitch: 30.,
            kp_vertical: 3.,
            vertical_offset: 0.6,
            thrust_bias: 68.5,
            angle_limit: 1.,
            altitude_error_limit: 1.,
            ceiling: 100.,
        }
    }
}

/// The four axis outputs of one tick, before motor mixing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisOutput {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub vertical: f32,
}

impl AxisOutput {
    /// The outputs as `[vertical, roll, pitch, yaw]`, the order of the mixer factors.
    pub fn to_vector(&self) -> Vector4<f32> {
        Vector4::new(self.vertical, self.roll, self.pitch, self.yaw)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Controller {
    pub attitude: AttitudeController,
    pub altitude: AltitudeController,
    pub thrust_bias: f32,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(&Gains::default())
    }
}

impl Controller {
    pub fn new(gains: &Gains) -> Self {
        Self {
            attitude: AttitudeController {
                kp_roll: gains.kp_roll,
                kp_pitch: gains.kp_pitch,
                angle_limit: gains.angle_limit,
            },
            altitude: AltitudeController {
                kp: gains.kp_vertical,
                offset: gains.vertical_offset,
                error_limit: gains.altitude_error_limit,
                ceiling: gains.ceiling,
            },
            thrust_bias: gains.thrust_bias,
        }
    }

    /// Advance the altitude target by one timestep and compute the axis outputs
    /// from the latest command.
    pub fn update(
        &self,
        state: &mut ControllerState,
        sensors: &SensorSnapshot,
        dt: f32,
    ) -> AxisOutput {
        let cmd = state.last_command;
        state.target_altitude = self
            .altitude
            .integrate(state.target_altitude, cmd.throttle, dt);

        AxisOutput {
            roll: self.attitude.roll(sensors, &cmd),
            pitch: self.attitude.pitch(sensors, &cmd),
            yaw: self.attitude.yaw(&cmd),
            vertical: self
                .altitude
                .output(state.target_altitude, sensors.altitude),
        }
    }
}
