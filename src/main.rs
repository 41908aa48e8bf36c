//! copter-link - UDP commanded multirotor stabilization loop

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use copter_link::{
    clock::StdClock,
    sim::{Body, SimParams, SimulatedVehicle},
    CommandChannel, CommandSender, Config, ControlCommand, Copter, MotorMatrix, Scheduler,
    DEFAULT_PORT,
};
use embedded_time::duration::Milliseconds;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "copter-link")]
#[command(about = "Multirotor stabilization loop driven by UDP attitude/throttle commands")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the controller on the loopback vehicle
    Run(RunArgs),
    /// Stream a command to a running controller
    Send(SendArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Address to receive commands on
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Tick duration in seconds
    #[arg(long, default_value_t = 0.032)]
    timestep: f32,

    /// Initial target altitude in meters
    #[arg(long, default_value_t = 1.0)]
    initial_altitude: f32,

    /// Seconds without packets before warning
    #[arg(long, default_value_t = 3.0)]
    stale_after: f32,

    /// Seconds between status reports
    #[arg(long, default_value_t = 5.0)]
    status_interval: f32,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    duration: Option<f32>,

    /// Altitude the loopback vehicle starts at
    #[arg(long, default_value_t = 0.0)]
    start_altitude: f32,
}

impl RunArgs {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = Config {
            bind_addr: self.bind,
            port: self.port,
            timestep: self.timestep,
            initial_altitude: self.initial_altitude,
            ..Default::default()
        };
        config.watchdog.stale_after = millis("stale-after", self.stale_after)?;
        config.watchdog.status_interval = millis("status-interval", self.status_interval)?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args)]
struct SendArgs {
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    host: IpAddr,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Packets per second, limited to 20 ~ 50
    #[arg(long, default_value_t = 30.0)]
    rate: f32,

    /// Seconds to stream for
    #[arg(long, default_value_t = 5.0)]
    duration: f32,

    #[arg(allow_hyphen_values = true)]
    roll: f32,

    #[arg(allow_hyphen_values = true)]
    pitch: f32,

    #[arg(allow_hyphen_values = true)]
    yaw: f32,

    #[arg(allow_hyphen_values = true)]
    throttle: f32,
}

fn millis(name: &str, seconds: f32) -> anyhow::Result<Milliseconds<u64>> {
    if !(seconds.is_finite() && seconds > 0.) {
        bail!("--{name} must be a positive number of seconds");
    }
    Ok(Milliseconds((seconds * 1000.).round() as u64))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Send(args) => send(args).await,
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.config()?;

    let addr = config.command_addr();
    let channel = CommandChannel::bind(addr)
        .with_context(|| format!("cannot start the controller on {addr}"))?;

    let vehicle = SimulatedVehicle::new(
        SimParams::trimmed_for(&config.gains),
        Body::at_altitude(args.start_altitude.max(0.)),
    );
    let [a, b, c, d] = vehicle.motors();

    let mut copter = Copter::builder()
        .source(channel)
        .sensors(vehicle.sensors())
        .motors(MotorMatrix::quad(a, b, c, d))
        .clock(StdClock::default())
        .config(config.clone())
        .build()?;

    let mut scheduler = Scheduler::new(config.timestep)?;
    if let Some(duration) = args.duration {
        if !(duration.is_finite() && duration >= 0.) {
            bail!("--duration must not be negative");
        }
        scheduler = scheduler.with_max_ticks((duration / config.timestep).ceil() as u64);
    }

    let stats = scheduler
        .run(
            |dt| {
                copter.tick(dt);
                vehicle.step(dt);
            },
            shutdown_signal(),
        )
        .await;
    info!(
        ticks = stats.ticks,
        overruns = stats.overruns,
        "control loop stopped"
    );

    let state = copter.shutdown();
    info!(
        altitude = vehicle.body().altitude,
        target_altitude = state.target_altitude,
        "shut down"
    );
    Ok(())
}

async fn send(args: SendArgs) -> anyhow::Result<()> {
    if !(args.duration.is_finite() && args.duration >= 0.) {
        bail!("--duration must not be negative");
    }

    let target = SocketAddr::new(args.host, args.port);
    let cmd = ControlCommand::new(args.roll, args.pitch, args.yaw, args.throttle);
    let mut sender = CommandSender::connect(target, args.rate)
        .await
        .context("failed to open the sending socket")?;

    info!(%target, command = %cmd, period_ms = sender.period().as_millis() as u64, "streaming command");
    let stats = sender
        .stream(cmd, Duration::from_secs_f32(args.duration))
        .await;
    info!(sent = stats.sent, failed = stats.failed, "done");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "cannot listen for Ctrl-C, running until the duration elapses");
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received");
}
