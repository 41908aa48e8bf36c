/// Vertical axis control around an integrated altitude target.
#[derive(Clone, Debug, PartialEq)]
pub struct AltitudeController {
    pub kp: f32,
    /// Bias added to the altitude error (in meters)
    pub offset: f32,
    /// Limit of the biased altitude error (in meters)
    pub error_limit: f32,
    /// Highest allowed target altitude (in meters)
    pub ceiling: f32,
}

impl Default for AltitudeController {
    fn default() -> Self {
        Self {
            kp: 3.,
            offset: 0.6,
            error_limit: 1.,
            ceiling: 100.,
        }
    }
}

impl AltitudeController {
    /// Integrate the commanded vertical velocity (in m/s) into the target altitude.
    pub fn integrate(&self, target: f32, throttle: f32, dt: f32) -> f32 {
        (target + throttle * dt).clamp(0., self.ceiling)
    }

    /// Calculate the vertical output for the current altitude.
    ///
    /// The response is cubic in the clamped error.
    pub fn output(&self, target: f32, altitude: f32) -> f32 {
        let error = (target - altitude + self.offset).clamp(-self.error_limit, self.error_limit);
        self.kp * error.powi(3)
    }
}
