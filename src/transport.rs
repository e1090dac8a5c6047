//! The byte-stream abstraction the exchange engine sends and receives framed messages over.
//!
//! TLS session setup (certificate/key material, handshake, timeouts) is explicitly out of scope
//! for this crate: callers bring their own connected, already-secured stream and hand this crate
//! a [`Transport`] over it.
use std::fmt::Debug;

/// A connected, ordered, reliable byte stream to a KMIP server.
///
/// Implementations are expected to be blocking: `send`/`recv` only return once the requested
/// bytes have actually been written/read (or an error occurs), the same contract
/// `std::io::Write::write_all` / `std::io::Read::read_exact` provide over a `TcpStream`.
pub trait Transport: Debug {
    /// Establishes the underlying connection. A no-op for transports that are already connected
    /// at construction time.
    fn connect(&mut self) -> std::io::Result<()>;

    /// Closes the underlying connection.
    fn close(&mut self) -> std::io::Result<()>;

    /// Whether the transport currently believes itself connected.
    fn is_connected(&self) -> bool;

    /// Writes `data` in full.
    fn send(&mut self, data: &[u8]) -> std::io::Result<()>;

    /// Fills `buf` in full.
    fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<()>;
}

/// A [`Transport`] over any type that is both [`std::io::Read`] and [`std::io::Write`], such as
/// `std::net::TcpStream`. `connect`/`close`/`is_connected` are no-ops reporting "always
/// connected", since a stream handed to this adapter is already open.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
}

impl<S> StreamTransport<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: std::io::Read + std::io::Write + Debug> Transport for StreamTransport<S> {
    fn connect(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn send(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        self.stream.read_exact(buf)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::Transport;
    use std::collections::VecDeque;

    /// An in-memory [`Transport`] test double: `recv` drains bytes queued with `preloaded`/
    /// `push_inbound`, `send` appends to `outbound` so tests can assert on what was written.
    #[derive(Debug, Default)]
    pub(crate) struct ChannelTransport {
        inbound: VecDeque<u8>,
        pub(crate) outbound: Vec<u8>,
        connected: bool,
    }

    impl ChannelTransport {
        pub(crate) fn preloaded(bytes: Vec<u8>) -> Self {
            Self {
                inbound: bytes.into(),
                outbound: Vec::new(),
                connected: true,
            }
        }

        pub(crate) fn push_inbound(&mut self, bytes: &[u8]) {
            self.inbound.extend(bytes.iter().copied());
        }
    }

    impl Transport for ChannelTransport {
        fn connect(&mut self) -> std::io::Result<()> {
            self.connected = true;
            Ok(())
        }

        fn close(&mut self) -> std::io::Result<()> {
            self.connected = false;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn send(&mut self, data: &[u8]) -> std::io::Result<()> {
            self.outbound.extend_from_slice(data);
            Ok(())
        }

        fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
            if self.inbound.len() < buf.len() {
                return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
            }
            for slot in buf.iter_mut() {
                *slot = self.inbound.pop_front().unwrap();
            }
            Ok(())
        }
    }
}
