//! The fixed-timestep stabilization loop.
//!
//! Every [`Copter::tick`] reads at most one command, reads the sensors, runs the
//! [`Controller`], mixes and outputs the motor velocities, then updates the
//! [`Watchdog`]. A tick never blocks and never fails.

pub mod control;
pub use control::{AxisOutput, Controller, Gains};

mod builder;
pub use builder::Builder;

mod state;
pub use state::ControllerState;

use crate::{
    command::{CommandSource, Reception},
    hal::{Actuator, Sensors},
    motor::MotorMatrix,
    watchdog::{Watchdog, WatchdogReport},
    Error,
};
use embedded_time::{duration::Milliseconds, Clock};
use tracing::{info, warn};

pub type QuadMotors<A> = MotorMatrix<A, 4>;

/// The result of one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub reception: Reception,
    pub axes: AxisOutput,
    /// Motor velocities before spin direction is applied
    pub motors: [f32; 4],
    pub watchdog: WatchdogReport,
}

pub struct Copter<Src, S, A, C> {
    pub controller: Controller,
    pub motors: QuadMotors<A>,
    pub watchdog: Watchdog,
    source: Src,
    sensors: S,
    clock: C,
    state: ControllerState,
}

impl<Src, S, A, C> Copter<Src, S, A, C>
where
    Src: CommandSource,
    S: Sensors,
    A: Actuator,
    C: Clock<T = u64>,
{
    pub fn builder() -> Builder<Src, S, A, C> {
        Builder::default()
    }

    /// Run one control cycle of `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let now = self.now();
        self.state.now = now;

        let reception = self.source.try_receive();
        self.watchdog.record(&mut self.state, &reception, now);

        let sensors = self.sensors.snapshot();
        let axes = self.controller.update(&mut self.state, &sensors, dt);
        let motors = self.motors.output(&axes, self.controller.thrust_bias);

        let watchdog = self.watchdog.inspect(&mut self.state, &sensors, now);

        TickReport {
            reception,
            axes,
            motors,
            watchdog,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    /// Stop the controller, releasing the command source.
    pub fn shutdown(self) -> ControllerState {
        info!(
            packets = self.state.packet_count,
            parse_failures = self.state.parse_failures,
            target_altitude = self.state.target_altitude,
            "controller stopped"
        );
        self.state
    }

    fn now(&self) -> Milliseconds<u64> {
        match millis_since_epoch(&self.clock) {
            Ok(now) => now,
            Err(err) => {
                warn!(%err, "clock read failed, reusing the previous tick time");
                self.state.now
            }
        }
    }
}

pub(crate) fn millis_since_epoch<C: Clock<T = u64>>(clock: &C) -> Result<Milliseconds<u64>, Error> {
    let instant = clock.try_now()?;
    Milliseconds::try_from(instant.duration_since_epoch()).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::Copter;
    use crate::{
        clock::ManualClock,
        command::{CommandSource, DecodeError, Reception},
        hal::{Actuator, SensorSnapshot, Sensors},
        motor::MotorMatrix,
        Config, ControlCommand, Error,
    };
    use approx::assert_relative_eq;
    use embedded_time::duration::Milliseconds;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Queue(VecDeque<Reception>);

    impl CommandSource for Queue {
        fn try_receive(&mut self) -> Reception {
            self.0.pop_front().unwrap_or(Reception::NoPacket)
        }
    }

    struct Fixed(SensorSnapshot);

    impl Sensors for Fixed {
        fn snapshot(&mut self) -> SensorSnapshot {
            self.0
        }
    }

    #[derive(Default)]
    struct Recorder(f32);

    impl Actuator for Recorder {
        fn output(&mut self, velocity: f32) {
            self.0 = velocity;
        }
    }

    const DT: f32 = 0.032;

    fn copter(
        sensors: SensorSnapshot,
        clock: ManualClock,
    ) -> Copter<Queue, Fixed, Recorder, ManualClock> {
        Copter::builder()
            .source(Queue::default())
            .sensors(Fixed(sensors))
            .motors(MotorMatrix::quad(
                Recorder::default(),
                Recorder::default(),
                Recorder::default(),
                Recorder::default(),
            ))
            .clock(clock)
            .build()
            .unwrap()
    }

    fn hovering() -> SensorSnapshot {
        SensorSnapshot {
            altitude: 1.,
            ..Default::default()
        }
    }

    #[test]
    fn it_starts_at_the_initial_altitude_with_a_zero_command() {
        let copter = copter(hovering(), ManualClock::default());
        assert_eq!(copter.state().target_altitude, 1.);
        assert_eq!(copter.state().last_command, ControlCommand::ZERO);
        assert_eq!(copter.state().packet_count, 0);
    }

    #[test]
    fn it_refuses_to_build_without_parts() {
        let result = Copter::<Queue, Fixed, Recorder, ManualClock>::builder()
            .clock(ManualClock::default())
            .build();
        assert!(matches!(result, Err(Error::Incomplete(_))));
    }

    #[test]
    fn it_refuses_an_invalid_config() {
        let result = Copter::<Queue, Fixed, Recorder, ManualClock>::builder()
            .config(Config {
                timestep: 0.,
                ..Default::default()
            })
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn it_adopts_a_command_and_holds_it() {
        let clock = ManualClock::default();
        let mut copter = copter(hovering(), clock.clone());
        let cmd = ControlCommand::new(0.5, -0.25, 1., 0.);
        copter.source.0.push_back(Reception::Command(cmd));

        clock.advance(DT);
        let report = copter.tick(DT);
        assert_eq!(report.reception, Reception::Command(cmd));
        assert_eq!(copter.state().last_command, cmd);
        assert_eq!(copter.state().last_command_at, Milliseconds(32u64));

        for _ in 0..100 {
            clock.advance(DT);
            let report = copter.tick(DT);
            assert_eq!(report.reception, Reception::NoPacket);
            assert_relative_eq!(report.axes.roll, 0.5);
            assert_eq!(report.axes.yaw, 1.);
        }
        assert_eq!(copter.state().last_command, cmd);
        assert_eq!(copter.state().packet_count, 1);
    }

    #[test]
    fn it_ignores_malformed_packets() {
        let clock = ManualClock::default();
        let mut copter = copter(hovering(), clock.clone());
        let cmd = ControlCommand::new(0., 0., 0., 0.5);
        copter.source.0.push_back(Reception::Command(cmd));
        copter.tick(DT);
        let before = copter.state().clone();

        copter
            .source
            .0
            .push_back(Reception::Malformed(DecodeError::FieldCount(2)));
        copter.tick(DT);

        assert_eq!(copter.state().last_command, before.last_command);
        assert_eq!(copter.state().packet_count, before.packet_count);
        assert_eq!(copter.state().parse_failures, 1);
    }

    #[test]
    fn it_reads_one_packet_per_tick() {
        let mut copter = copter(hovering(), ManualClock::default());
        let first = ControlCommand::new(0., 0., 0., 0.1);
        let second = ControlCommand::new(0., 0., 0., 0.2);
        copter.source.0.extend([Reception::Command(first), Reception::Command(second)]);

        copter.tick(DT);
        assert_eq!(copter.state().last_command, first);
        copter.tick(DT);
        assert_eq!(copter.state().last_command, second);
    }

    #[test]
    fn it_commands_signed_motor_velocities() {
        let mut copter = copter(hovering(), ManualClock::default());
        let report = copter.tick(DT);

        let hover = 68.5 + 3. * 0.6f32.powi(3);
        assert_eq!(report.motors, [hover; 4]);

        let outputs: Vec<f32> = copter.motors.motors.iter().map(|m| m.actuator.0).collect();
        assert_eq!(outputs, vec![hover, -hover, -hover, hover]);
    }

    #[test]
    fn it_keeps_flying_while_stale() {
        let clock = ManualClock::default();
        let mut copter = copter(hovering(), clock.clone());
        let cmd = ControlCommand::new(0.2, 0., 0., 0.);
        copter.source.0.push_back(Reception::Command(cmd));
        copter.tick(DT);

        clock.advance(3.5);
        let report = copter.tick(DT);
        assert_eq!(report.watchdog.stale_for, Some(Milliseconds(3_500u64)));
        assert_eq!(copter.state().last_command, cmd);
        assert_relative_eq!(report.axes.roll, 0.2);
    }

    #[test]
    fn it_returns_the_final_state_on_shutdown() {
        let mut copter = copter(hovering(), ManualClock::default());
        copter
            .source
            .0
            .push_back(Reception::Command(ControlCommand::new(0., 0., 0., 1.)));
        copter.tick(0.5);

        let state = copter.shutdown();
        assert_eq!(state.packet_count, 1);
        assert_relative_eq!(state.target_altitude, 1.5);
    }
}
