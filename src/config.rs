use crate::{copter::control::Gains, watchdog::Watchdog, Error};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Well known port of the command channel.
pub const DEFAULT_PORT: u16 = 9000;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Address the command channel binds to
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Fixed tick duration (in seconds)
    pub timestep: f32,
    /// Target altitude at start (in meters)
    pub initial_altitude: f32,
    pub gains: Gains,
    pub watchdog: Watchdog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            timestep: 0.032,
            initial_altitude: 1.,
            gains: Gains::default(),
            watchdog: Watchdog::default(),
        }
    }
}

impl Config {
    pub fn command_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.timestep.is_finite() && self.timestep > 0.) {
            return Err(Error::InvalidConfig("timestep must be positive"));
        }
        if !(self.gains.ceiling.is_finite() && self.gains.ceiling > 0.) {
            return Err(Error::InvalidConfig("altitude ceiling must be positive"));
        }
        if !(0. ..=self.gains.ceiling).contains(&self.initial_altitude) {
            return Err(Error::InvalidConfig(
                "initial altitude must be between zero and the ceiling",
            ));
        }
        if self.watchdog.stale_after.0 == 0 {
            return Err(Error::InvalidConfig("stale threshold must be positive"));
        }
        if self.watchdog.status_interval.0 == 0 {
            return Err(Error::InvalidConfig("status interval must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::Error;
    use embedded_time::duration::Milliseconds;

    #[test]
    fn it_defaults_to_the_reference_setup() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.command_addr().port(), 9000);
        assert_eq!(config.gains.thrust_bias, 68.5);
        assert_eq!(config.watchdog.stale_after, Milliseconds(3_000u64));
    }

    #[test]
    fn it_rejects_bad_timesteps() {
        for timestep in [0., -0.01, f32::NAN, f32::INFINITY] {
            let config = Config {
                timestep,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn it_rejects_an_initial_altitude_above_the_ceiling() {
        let config = Config {
            initial_altitude: 101.,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn it_rejects_a_zero_stale_threshold() {
        let mut config = Config::default();
        config.watchdog.stale_after = Milliseconds(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
