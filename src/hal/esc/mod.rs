mod builder;
pub use builder::Builder;

use super::Actuator;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::PwmPin;
use num_traits::{NumCast, ToPrimitive};

/// A PWM driven motor controller accepting signed velocities.
///
/// Velocities in `[-max_velocity, max_velocity]` map linearly onto `[min, max]` duty.
pub struct PwmMotor<P: PwmPin> {
    arm: P::Duty,
    min: P::Duty,
    max: P::Duty,
    max_velocity: f32,
    pin: P,
}

impl<P> PwmMotor<P>
where
    P: PwmPin,
    P::Duty: Copy,
{
    pub fn new(arm: P::Duty, min: P::Duty, max: P::Duty, max_velocity: f32, pin: P) -> Self {
        Self {
            arm,
            min,
            max,
            max_velocity,
            pin,
        }
    }

    pub fn builder() -> Builder<P::Duty>
    where
        P::Duty: Default,
    {
        Builder::default()
    }

    /// Output the arming (neutral) duty.
    pub fn arm(&mut self) {
        self.pin.set_duty(self.arm)
    }

    /// Sweep the full duty range so the ESC learns its endpoints, then arm.
    pub fn calibrate<D>(&mut self, delay: &mut D)
    where
        D: DelayMs<u16>,
    {
        self.pin.set_duty(self.max);
        delay.delay_ms(2000);

        self.pin.set_duty(self.min);
        delay.delay_ms(2000);

        self.arm();
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P> Actuator for PwmMotor<P>
where
    P: PwmPin,
    P::Duty: NumCast + ToPrimitive + Copy,
{
    fn output(&mut self, velocity: f32) {
        let (Some(min), Some(max)) = (self.min.to_f32(), self.max.to_f32()) else {
            return;
        };

        let normalized = (velocity / self.max_velocity).clamp(-1., 1.);
        let duty = (normalized + 1.) * (max - min) / 2. + min;

        // NaN velocities leave the previous duty in place
        if let Some(duty) = <P::Duty as NumCast>::from(duty.round()) {
            self.pin.set_duty(duty);
        }
    }
}
