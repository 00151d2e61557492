//! Report delivery over a connected Unix datagram socket.
//!
//! The consumer exposes a datagram endpoint at `<connection-dir>/interrupt`;
//! every report is one 5-byte datagram. Failures here are transport errors,
//! not protocol errors, and the bridge treats them as fatal.

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::Path;

use crate::report::{MouseReport, REPORT_LEN};

/// Sink for outgoing reports. The seam exists so scheduler tests can capture
/// reports instead of opening sockets.
pub trait ReportSink {
    fn send(&mut self, report: &MouseReport) -> io::Result<()>;
}

/// Connected datagram channel to the consumer's interrupt endpoint.
pub struct ReportLink {
    socket: UnixDatagram,
}

impl ReportLink {
    /// Connect to `<dir>/interrupt`. The socket is closed on drop.
    pub fn connect(connection_dir: &Path) -> io::Result<Self> {
        let socket = UnixDatagram::unbound()?;
        socket.connect(connection_dir.join("interrupt"))?;
        Ok(Self { socket })
    }
}

impl ReportSink for ReportLink {
    fn send(&mut self, report: &MouseReport) -> io::Result<()> {
        let payload = report.encode();
        let sent = self.socket.send(&payload)?;
        if sent != REPORT_LEN {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "short datagram write",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_delivers_encoded_payload() {
        let (tx, rx) = UnixDatagram::pair().unwrap();
        let mut link = ReportLink { socket: tx };

        let report = MouseReport {
            buttons: [true, false, false],
            dx: 3,
            dy: -2,
        };
        link.send(&report).unwrap();

        let mut buf = [0u8; 16];
        let received = rx.recv(&mut buf).unwrap();
        assert_eq!(&buf[..received], &report.encode());
    }

    #[test]
    fn test_send_fails_when_peer_is_gone() {
        let (tx, rx) = UnixDatagram::pair().unwrap();
        drop(rx);
        let mut link = ReportLink { socket: tx };
        assert!(link.send(&MouseReport::default()).is_err());
    }
}
