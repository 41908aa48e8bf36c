use super::{ControlCommand, DecodeError, MAX_PACKET_LEN};
use crate::Error;
use std::{
    io::ErrorKind,
    net::{SocketAddr, UdpSocket},
};
use tracing::{debug, info, warn};

/// The outcome of one non-blocking read of the command channel.
#[derive(Clone, Debug, PartialEq)]
pub enum Reception {
    Command(ControlCommand),
    /// Nothing was waiting to be read.
    NoPacket,
    /// A datagram arrived but was discarded.
    Malformed(DecodeError),
}

/// A source of commands that never blocks the caller.
pub trait CommandSource {
    /// Read at most one pending command.
    fn try_receive(&mut self) -> Reception;
}

impl<T: CommandSource + ?Sized> CommandSource for &mut T {
    fn try_receive(&mut self) -> Reception {
        (**self).try_receive()
    }
}

/// A UDP socket in non-blocking mode that decodes one command per datagram.
///
/// The socket is released when the channel is dropped.
#[derive(Debug)]
pub struct CommandChannel {
    socket: UdpSocket,
    local_addr: SocketAddr,
    /// One spare byte marks a datagram as oversized
    buf: [u8; MAX_PACKET_LEN + 1],
}

impl CommandChannel {
    pub fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let socket = UdpSocket::bind(addr).map_err(|source| Error::Bind { addr, source })?;
        socket.set_nonblocking(true)?;
        let local_addr = socket.local_addr()?;

        info!(%local_addr, "command channel listening");

        Ok(Self {
            socket,
            local_addr,
            buf: [0; MAX_PACKET_LEN + 1],
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl CommandSource for CommandChannel {
    fn try_receive(&mut self) -> Reception {
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, from)) => match ControlCommand::decode(&self.buf[..len]) {
                Ok(cmd) => Reception::Command(cmd),
                Err(err) => {
                    debug!(%from, len, %err, "discarding malformed command packet");
                    Reception::Malformed(err)
                }
            },
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                Reception::NoPacket
            }
            Err(err) => {
                warn!(%err, "command socket receive failed");
                Reception::NoPacket
            }
        }
    }
}

impl Drop for CommandChannel {
    fn drop(&mut self) {
        debug!(local_addr = %self.local_addr, "command channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandChannel, CommandSource, Reception};
    use crate::{
        command::{DecodeError, MAX_PACKET_LEN},
        ControlCommand,
    };
    use std::{
        net::{Ipv4Addr, SocketAddr, UdpSocket},
        thread,
        time::{Duration, Instant},
    };

    fn loopback_channel() -> CommandChannel {
        CommandChannel::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap()
    }

    fn receive_within(channel: &mut CommandChannel, timeout: Duration) -> Reception {
        let start = Instant::now();
        loop {
            match channel.try_receive() {
                Reception::NoPacket if start.elapsed() < timeout => {
                    thread::sleep(Duration::from_millis(1))
                }
                reception => return reception,
            }
        }
    }

    #[test]
    fn it_returns_immediately_without_packets() {
        let mut channel = loopback_channel();
        let start = Instant::now();
        assert_eq!(channel.try_receive(), Reception::NoPacket);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn it_receives_one_packet_per_call() {
        let mut channel = loopback_channel();
        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        sender
            .send_to(b"0.1 0.2 0.3 0.4\n", channel.local_addr())
            .unwrap();
        sender
            .send_to(b"0.5 0.6 0.7 0.8", channel.local_addr())
            .unwrap();

        let first = receive_within(&mut channel, Duration::from_secs(1));
        let second = receive_within(&mut channel, Duration::from_secs(1));
        assert_eq!(
            first,
            Reception::Command(ControlCommand::new(0.1, 0.2, 0.3, 0.4))
        );
        assert_eq!(
            second,
            Reception::Command(ControlCommand::new(0.5, 0.6, 0.7, 0.8))
        );
        assert_eq!(channel.try_receive(), Reception::NoPacket);
    }

    #[test]
    fn it_reports_malformed_packets() {
        let mut channel = loopback_channel();
        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        sender.send_to(b"garbage data", channel.local_addr()).unwrap();

        assert_eq!(
            receive_within(&mut channel, Duration::from_secs(1)),
            Reception::Malformed(DecodeError::FieldCount(2))
        );
    }

    #[test]
    fn it_discards_oversized_datagrams() {
        let mut channel = loopback_channel();
        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();

        // Five fields, the last one past the buffer
        let mut padded = b"0 0 0 0.5".to_vec();
        padded.resize(MAX_PACKET_LEN + 11, b' ');
        padded.push(b'9');
        sender.send_to(&padded, channel.local_addr()).unwrap();

        // Four fields, the last one cut mid-token at the buffer
        let mut long_number = b"0 0 0 0.".to_vec();
        long_number.resize(MAX_PACKET_LEN - 1, b'0');
        long_number.extend_from_slice(b"1e120");
        sender.send_to(&long_number, channel.local_addr()).unwrap();

        sender.send_to(b"0 0 0 0.25", channel.local_addr()).unwrap();

        assert_eq!(
            receive_within(&mut channel, Duration::from_secs(1)),
            Reception::Malformed(DecodeError::TooLong(MAX_PACKET_LEN + 1))
        );
        assert_eq!(
            receive_within(&mut channel, Duration::from_secs(1)),
            Reception::Malformed(DecodeError::TooLong(MAX_PACKET_LEN + 1))
        );
        assert_eq!(
            receive_within(&mut channel, Duration::from_secs(1)),
            Reception::Command(ControlCommand::new(0., 0., 0., 0.25))
        );
    }

    #[test]
    fn it_accepts_datagrams_filling_the_buffer() {
        let mut channel = loopback_channel();
        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();

        let mut payload = b"0.5 0 0 0".to_vec();
        payload.resize(MAX_PACKET_LEN, b' ');
        sender.send_to(&payload, channel.local_addr()).unwrap();

        assert_eq!(
            receive_within(&mut channel, Duration::from_secs(1)),
            Reception::Command(ControlCommand::new(0.5, 0., 0., 0.))
        );
    }

    #[test]
    fn it_releases_the_port_on_drop() {
        let channel = loopback_channel();
        let addr = channel.local_addr();
        drop(channel);
        assert!(CommandChannel::bind(addr).is_ok());
    }
}
