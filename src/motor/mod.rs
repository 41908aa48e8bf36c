//! Allocation of the axis outputs to individual motors.

pub mod motor_matrix;
pub use motor_matrix::{mix, MotorMatrix};

use nalgebra::Vector4;

/// Sign applied to a motor's velocity command, matching its rotor's spin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinDirection {
    Normal,
    Reversed,
}

impl SpinDirection {
    pub fn apply(self, velocity: f32) -> f32 {
        match self {
            SpinDirection::Normal => velocity,
            SpinDirection::Reversed => -velocity,
        }
    }
}

pub struct Motor<A> {
    pub actuator: A,
    /// Allocation of `[vertical, roll, pitch, yaw]` to this motor
    pub factor: Vector4<f32>,
    pub direction: SpinDirection,
}

impl<A> Motor<A> {
    pub fn new(actuator: A, factor: Vector4<f32>, direction: SpinDirection) -> Self {
        Self {
            actuator,
            factor,
            direction,
        }
    }

    /// Create a motor with unit vertical allocation and the given roll, pitch and yaw factors.
    pub fn from_factors(
        actuator: A,
        roll: f32,
        pitch: f32,
        yaw: f32,
        direction: SpinDirection,
    ) -> Self {
        Self::new(actuator, Vector4::new(1., roll, pitch, yaw), direction)
    }

    /// Calculate this motor's velocity from the axis outputs and thrust bias.
    pub fn thrust(&self, axes: &Vector4<f32>, thrust_bias: f32) -> f32 {
        thrust_bias + self.factor.dot(axes)
    }
}
