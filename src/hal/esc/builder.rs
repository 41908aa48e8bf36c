use embedded_hal::PwmPin;
use num_traits::Num;

use super::PwmMotor;

pub struct Builder<T> {
    arm: Option<T>,
    min: T,
    max: Option<T>,
    max_velocity: f32,
}

impl<T: Default> Default for Builder<T> {
    fn default() -> Self {
        Self {
            arm: None,
            min: T::default(),
            max: None,
            max_velocity: 100.,
        }
    }
}

impl<T> Builder<T> {
    /// Duty to output when armed, defaults to the middle of the duty range.
    pub fn arm(mut self, arm: T) -> Self {
        self.arm = Some(arm);
        self
    }

    pub fn min(mut self, min: T) -> Self {
        self.min = min;
        self
    }

    /// Maximum duty, defaults to the pin's maximum duty.
    pub fn max(mut self, max: T) -> Self {
        self.max = Some(max);
        self
    }

    /// Velocity mapped onto the maximum duty.
    pub fn max_velocity(mut self, max_velocity: f32) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    pub fn build<P>(self, pin: P) -> PwmMotor<P>
    where
        P: PwmPin<Duty = T>,
        T: Num + Copy,
    {
        let min = self.min;
        let max = self.max.unwrap_or_else(|| pin.get_max_duty());
        let arm = self
            .arm
            .unwrap_or_else(|| min + (max - min) / (T::one() + T::one()));

        PwmMotor::new(arm, min, max, self.max_velocity, pin)
    }
}
