use super::{millis_since_epoch, Controller, ControllerState, Copter, QuadMotors};
use crate::{Config, Error};
use embedded_time::Clock;
use tracing::info;

pub struct Builder<Src, S, A, C> {
    source: Option<Src>,
    sensors: Option<S>,
    motors: Option<QuadMotors<A>>,
    clock: Option<C>,
    config: Config,
}

impl<Src, S, A, C> Default for Builder<Src, S, A, C> {
    fn default() -> Self {
        Self {
            source: None,
            sensors: None,
            motors: None,
            clock: None,
            config: Config::default(),
        }
    }
}

impl<Src, S, A, C> Builder<Src, S, A, C>
where
    C: Clock<T = u64>,
{
    pub fn source(mut self, source: Src) -> Self {
        self.source = Some(source);
        self
    }

    pub fn sensors(mut self, sensors: S) -> Self {
        self.sensors = Some(sensors);
        self
    }

    pub fn motors(mut self, motors: QuadMotors<A>) -> Self {
        self.motors = Some(motors);
        self
    }

    pub fn clock(mut self, clock: C) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Copter<Src, S, A, C>, Error> {
        self.config.validate()?;

        let source = self.source.ok_or(Error::Incomplete("command source"))?;
        let sensors = self.sensors.ok_or(Error::Incomplete("sensors"))?;
        let motors = self.motors.ok_or(Error::Incomplete("motors"))?;
        let clock = self.clock.ok_or(Error::Incomplete("clock"))?;

        let started_at = millis_since_epoch(&clock)?;
        let state = ControllerState::new(self.config.initial_altitude, started_at);
        info!(target_altitude = state.target_altitude, "controller started");

        Ok(Copter {
            controller: Controller::new(&self.config.gains),
            motors,
            watchdog: self.config.watchdog,
            source,
            sensors,
            clock,
            state,
        })
    }
}
