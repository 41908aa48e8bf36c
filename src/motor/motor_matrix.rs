use super::{Motor, SpinDirection};
use crate::{copter::control::AxisOutput, hal::Actuator};
use nalgebra::Vector4;

/// Allocation of `[vertical, roll, pitch, yaw]` for an X quad, in the order
/// front-left, front-right, rear-left, rear-right.
pub const QUAD_X_FACTORS: [[f32; 4]; 4] = [
    [1., -1., 1., -1.],
    [1., 1., 1., 1.],
    [1., -1., -1., 1.],
    [1., 1., -1., -1.],
];

/// Spin of each X quad motor, front-right and rear-left are driven in reverse.
pub const QUAD_X_DIRECTIONS: [SpinDirection; 4] = [
    SpinDirection::Normal,
    SpinDirection::Reversed,
    SpinDirection::Reversed,
    SpinDirection::Normal,
];

/// Mix the axis outputs into X quad motor velocities `[m1, m2, m3, m4]`.
///
/// ```
/// use copter_link::{copter::control::AxisOutput, motor::mix};
///
/// let axes = AxisOutput { roll: 1., ..Default::default() };
/// assert_eq!(mix(&axes, 68.5), [67.5, 69.5, 67.5, 69.5]);
/// ```
pub fn mix(axes: &AxisOutput, thrust_bias: f32) -> [f32; 4] {
    let axes = axes.to_vector();
    QUAD_X_FACTORS.map(|factor| thrust_bias + Vector4::from(factor).dot(&axes))
}

/// A set of motors sharing one allocation.
///
/// Outputs are not clamped.
pub struct MotorMatrix<A, const N: usize> {
    pub motors: [Motor<A>; N],
}

impl<A> MotorMatrix<A, 4> {
    /// Create a new `MotorMatrix` for an X quad from the front-left, front-right,
    /// rear-left and rear-right actuators.
    pub fn quad(a: A, b: A, c: A, d: A) -> Self {
        let mut i = 0;
        Self::from_motors([a, b, c, d].map(|actuator| {
            let [_, roll, pitch, yaw] = QUAD_X_FACTORS[i];
            let motor = Motor::from_factors(actuator, roll, pitch, yaw, QUAD_X_DIRECTIONS[i]);
            i += 1;
            motor
        }))
    }
}

impl<A, const N: usize> MotorMatrix<A, N> {
    pub fn from_motors(motors: [Motor<A>; N]) -> Self {
        Self { motors }
    }

    /// Calculate the velocity of every motor without applying spin direction.
    pub fn mix(&self, axes: &AxisOutput, thrust_bias: f32) -> [f32; N] {
        let axes = axes.to_vector();
        let mut velocities = [0.; N];
        for (velocity, motor) in velocities.iter_mut().zip(&self.motors) {
            *velocity = motor.thrust(&axes, thrust_bias);
        }
        velocities
    }

    /// Mix the axis outputs and command each actuator with its signed velocity.
    pub fn output(&mut self, axes: &AxisOutput, thrust_bias: f32) -> [f32; N]
    where
        A: Actuator,
    {
        let velocities = self.mix(axes, thrust_bias);
        for (motor, velocity) in self.motors.iter_mut().zip(velocities) {
            motor.actuator.output(motor.direction.apply(velocity));
        }
        velocities
    }
}
