use super::ControlCommand;
use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    time::Duration,
};
use tokio::{
    net::UdpSocket,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

const MIN_RATE_HZ: f32 = 20.;
const MAX_RATE_HZ: f32 = 50.;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SenderStats {
    pub sent: u64,
    pub failed: u64,
}

/// Streams commands to a controller at a fixed rate.
pub struct CommandSender {
    socket: UdpSocket,
    target: SocketAddr,
    period: Duration,
    stats: SenderStats,
}

impl CommandSender {
    /// Create a sender for `target` streaming at `rate_hz`, clamped to 20 ~ 50 hz.
    pub async fn connect(target: SocketAddr, rate_hz: f32) -> io::Result<Self> {
        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        let rate_hz = if rate_hz.is_nan() {
            MIN_RATE_HZ
        } else {
            rate_hz.clamp(MIN_RATE_HZ, MAX_RATE_HZ)
        };

        Ok(Self {
            socket,
            target,
            period: Duration::from_secs_f32(1. / rate_hz),
            stats: SenderStats::default(),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn stats(&self) -> SenderStats {
        self.stats
    }

    /// Send a single command packet.
    pub async fn send(&mut self, cmd: &ControlCommand) -> io::Result<()> {
        let packet = cmd.to_string();
        match self.socket.send_to(packet.as_bytes(), self.target).await {
            Ok(_) => {
                self.stats.sent += 1;
                if self.stats.sent % 100 == 0 {
                    debug!(sent = self.stats.sent, "command packets sent");
                }
                Ok(())
            }
            Err(err) => {
                self.stats.failed += 1;
                if self.stats.failed % 50 == 1 {
                    warn!(failed = self.stats.failed, %err, "command packet send failed");
                }
                Err(err)
            }
        }
    }

    /// Repeat `cmd` every period for `duration`.
    ///
    /// Send failures are counted and do not end the stream.
    pub async fn stream(&mut self, cmd: ControlCommand, duration: Duration) -> SenderStats {
        let deadline = Instant::now() + duration;
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if interval.tick().await >= deadline {
                break;
            }
            let _ = self.send(&cmd).await;
        }

        self.stats
    }
}
