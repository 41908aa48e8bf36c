//! A minimal quad model to fly the controller without external hardware.
//!
//! Rotor thrust grows with the square of rotor speed, normalized so four rotors at
//! the hover speed exactly balance gravity. Roll and pitch respond to differential
//! thrust between the left/right and front/rear rotor pairs. Yaw is not modeled.

use crate::{
    copter::control::Gains,
    hal::{Actuator, SensorSnapshot, Sensors},
};
use nalgebra::Vector2;
use std::{cell::Cell, rc::Rc};

#[derive(Clone, Debug, PartialEq)]
pub struct SimParams {
    /// Rotor speed at which four rotors hold the vehicle in the air
    pub hover_speed: f32,
    pub gravity: f32,
    /// Linear vertical drag (in 1/s)
    pub drag: f32,
    /// Angular acceleration per unit of normalized differential thrust
    pub torque_gain: f32,
    /// Angular rate damping (in 1/s)
    pub angular_damping: f32,
}

impl SimParams {
    /// Parameters whose hover speed matches the controller's output at the target altitude.
    pub fn trimmed_for(gains: &Gains) -> Self {
        Self {
            hover_speed: gains.thrust_bias + gains.kp_vertical * gains.vertical_offset.powi(3),
            gravity: 9.81,
            drag: 0.5,
            torque_gain: 10.,
            angular_damping: 4.,
        }
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self::trimmed_for(&Gains::default())
    }
}

/// The simulated rigid body state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
    /// Roll and pitch (in radians)
    pub attitude: Vector2<f32>,
    /// Roll and pitch rates (in radians/second)
    pub rates: Vector2<f32>,
    /// Altitude above ground (in meters)
    pub altitude: f32,
    /// Vertical velocity (in m/s)
    pub climb_rate: f32,
}

impl Body {
    pub fn at_altitude(altitude: f32) -> Self {
        Self {
            altitude,
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            roll: self.attitude.x,
            pitch: self.attitude.y,
            roll_rate: self.rates.x,
            pitch_rate: self.rates.y,
            altitude: self.altitude,
        }
    }
}

pub struct SimulatedVehicle {
    body: Rc<Cell<Body>>,
    rotors: [Rc<Cell<f32>>; 4],
    params: SimParams,
}

impl SimulatedVehicle {
    pub fn new(params: SimParams, body: Body) -> Self {
        Self {
            body: Rc::new(Cell::new(body)),
            rotors: Default::default(),
            params,
        }
    }

    pub fn body(&self) -> Body {
        self.body.get()
    }

    pub fn set_body(&self, body: Body) {
        self.body.set(body);
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// A sensor handle reading this vehicle.
    pub fn sensors(&self) -> SimSensors {
        SimSensors {
            body: self.body.clone(),
        }
    }

    /// Actuator handles for the front-left, front-right, rear-left and rear-right rotors.
    pub fn motors(&self) -> [SimMotor; 4] {
        self.rotors.clone().map(|speed| SimMotor { speed })
    }

    /// Latest commanded rotor speeds.
    pub fn rotor_speeds(&self) -> [f32; 4] {
        [0, 1, 2, 3].map(|i| self.rotors[i].get())
    }

    /// Integrate the body over `dt` seconds with the current rotor speeds.
    pub fn step(&self, dt: f32) {
        let params = &self.params;
        let hover_sq = params.hover_speed * params.hover_speed;
        let [fl, fr, rl, rr] = self.rotor_speeds().map(|speed| speed * speed / hover_sq);

        let mut body = self.body.get();

        let torque = Vector2::new((fr + rr) - (fl + rl), (fl + fr) - (rl + rr));
        let angular_acceleration =
            -params.torque_gain * torque - params.angular_damping * body.rates;
        body.rates += angular_acceleration * dt;
        body.attitude += body.rates * dt;

        let lift = (fl + fr + rl + rr) / 4. * body.attitude.x.cos() * body.attitude.y.cos();
        let acceleration = params.gravity * (lift - 1.) - params.drag * body.climb_rate;
        body.climb_rate += acceleration * dt;
        body.altitude += body.climb_rate * dt;

        if body.altitude <= 0. {
            body.altitude = 0.;
            body.climb_rate = body.climb_rate.max(0.);
        }

        self.body.set(body);
    }
}

pub struct SimSensors {
    body: Rc<Cell<Body>>,
}

impl Sensors for SimSensors {
    fn snapshot(&mut self) -> SensorSnapshot {
        self.body.get().snapshot()
    }
}

pub struct SimMotor {
    speed: Rc<Cell<f32>>,
}

impl Actuator for SimMotor {
    fn output(&mut self, velocity: f32) {
        self.speed.set(velocity);
    }
}
