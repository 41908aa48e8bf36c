//! # copter-link
//! A multirotor stabilization loop commanded over UDP.
//!
//! An external process streams attitude/throttle setpoints as text datagrams.
//! Every fixed timestep the [`Copter`] reads at most one of them, fuses it with
//! the vehicle's sensors and outputs four motor velocities. The loop keeps the
//! vehicle stable when the command source is silent, late or sends garbage.
//!
//! # Components
//! [`command`] contains the [`ControlCommand`] wire format, the non-blocking
//! [`CommandChannel`] and the [`CommandSender`] client.
//!
//! [`hal`] contains the [`Sensors`] and [`Actuator`] interfaces to the vehicle.
//!
//! [`copter::control`] contains the stabilization law and [`motor`] the X quad mixer.
//!
//! [`watchdog`] tracks command freshness and reports status.
//!
//! [`scheduler`] steps the loop at a fixed rate and [`sim`] provides a loopback vehicle.
//!
//! ```
//! use copter_link::{clock::ManualClock, sim::{Body, SimulatedVehicle}, Copter, CommandSource, MotorMatrix, Reception};
//!
//! struct Silent;
//!
//! impl CommandSource for Silent {
//!     fn try_receive(&mut self) -> Reception {
//!         Reception::NoPacket
//!     }
//! }
//!
//! let vehicle = SimulatedVehicle::new(Default::default(), Body::at_altitude(1.));
//! let [a, b, c, d] = vehicle.motors();
//!
//! let mut copter = Copter::builder()
//!     .source(Silent)
//!     .sensors(vehicle.sensors())
//!     .motors(MotorMatrix::quad(a, b, c, d))
//!     .clock(ManualClock::default())
//!     .build()?;
//!
//! let report = copter.tick(0.032);
//! vehicle.step(0.032);
//! assert_eq!(report.motors[0], report.motors[3]);
//! # Ok::<(), copter_link::Error>(())
//! ```

pub mod clock;

pub mod command;
pub use command::{CommandChannel, CommandSender, CommandSource, ControlCommand, Reception};

mod config;
pub use config::{Config, DEFAULT_PORT};

pub mod copter;
pub use copter::{Copter, TickReport};

mod error;
pub use error::Error;

pub mod hal;
pub use hal::{Actuator, SensorSnapshot, Sensors};

pub mod motor;
pub use motor::MotorMatrix;

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod sim;

pub mod watchdog;
pub use watchdog::Watchdog;
