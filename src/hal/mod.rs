//! Interfaces to the vehicle's sensing and actuation.

pub mod esc;
pub use esc::PwmMotor;

/// Vehicle state read once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorSnapshot {
    /// Roll angle (in radians)
    pub roll: f32,
    /// Pitch angle (in radians)
    pub pitch: f32,
    /// Roll rate (in radians/second)
    pub roll_rate: f32,
    /// Pitch rate (in radians/second)
    pub pitch_rate: f32,
    /// Altitude (in meters)
    pub altitude: f32,
}

pub trait Sensors {
    /// Read the current vehicle state.
    ///
    /// Readings are not validated by the controller.
    fn snapshot(&mut self) -> SensorSnapshot;
}

impl<T: Sensors + ?Sized> Sensors for &mut T {
    fn snapshot(&mut self) -> SensorSnapshot {
        (**self).snapshot()
    }
}

pub trait Actuator {
    /// Output a signed motor velocity.
    fn output(&mut self, velocity: f32);
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    fn output(&mut self, velocity: f32) {
        (**self).output(velocity)
    }
}
