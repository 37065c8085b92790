//! Byte channels the driver talks through.
//!
//! The driver only needs three things from a connection: write a buffer,
//! read an exact number of bytes, and throw away whatever is pending. Any
//! blocking `Read + Write` stream can be wrapped in an [`IoChannel`]; real
//! hardware goes through [`SerialChannel`].

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::{DriverError, DriverResult};

/// Upper bound on the time spent draining stale input.
const DISCARD_WINDOW: Duration = Duration::from_millis(200);

/// Upper bound on the number of reads spent draining stale input.
const DISCARD_MAX_READS: usize = 64;

/// Byte transport to the module.
///
/// Timeouts belong to the channel. A read that cannot complete within the
/// channel's timeout fails with [`DriverError::Timeout`].
pub trait Channel {
    /// Write all of `data`.
    fn write_all(&mut self, data: &[u8]) -> DriverResult<()>;

    /// Read exactly `len` bytes.
    fn read_exact(&mut self, len: usize) -> DriverResult<Vec<u8>>;

    /// Drop any bytes already received but not yet read.
    fn discard_buffered(&mut self) -> DriverResult<()>;
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn write_all(&mut self, data: &[u8]) -> DriverResult<()> {
        (**self).write_all(data)
    }

    fn read_exact(&mut self, len: usize) -> DriverResult<Vec<u8>> {
        (**self).read_exact(len)
    }

    fn discard_buffered(&mut self) -> DriverResult<()> {
        (**self).discard_buffered()
    }
}

/// [`Channel`] over a blocking stream.
#[derive(Debug)]
pub struct IoChannel<T> {
    inner: T,
}

impl<T: Read + Write> IoChannel<T> {
    /// Wrap `inner`.
    pub fn new(inner: T) -> Self {
        IoChannel { inner }
    }

    /// Borrow the wrapped stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the wrapped stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Write> Channel for IoChannel<T> {
    fn write_all(&mut self, data: &[u8]) -> DriverResult<()> {
        write_stream(&mut self.inner, data)
    }

    fn read_exact(&mut self, len: usize) -> DriverResult<Vec<u8>> {
        read_stream(&mut self.inner, len)
    }

    fn discard_buffered(&mut self) -> DriverResult<()> {
        drain_stream(&mut self.inner)
    }
}

fn write_stream<W: Write + ?Sized>(stream: &mut W, data: &[u8]) -> DriverResult<()> {
    trace!("tx {} bytes: {:02X?}", data.len(), data);
    stream.write_all(data)?;
    stream.flush()?;
    Ok(())
}

fn read_stream<R: Read + ?Sized>(stream: &mut R, len: usize) -> DriverResult<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;

    while filled < len {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(DriverError::ShortRead {
                    expected: len,
                    actual: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) if e.kind() == ErrorKind::TimedOut => return Err(DriverError::Timeout),
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Err(DriverError::Timeout),
            Err(e) => return Err(e.into()),
        }
    }

    trace!("rx {} bytes: {:02X?}", len, buf);
    Ok(buf)
}

fn drain_stream<R: Read + ?Sized>(stream: &mut R) -> DriverResult<()> {
    let mut buf = [0u8; 256];
    let start = Instant::now();
    let mut discarded = 0usize;

    for _ in 0..DISCARD_MAX_READS {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => discarded += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) if e.kind() == ErrorKind::WouldBlock => break,
            Err(e) if e.kind() == ErrorKind::TimedOut => break,
            Err(e) => return Err(e.into()),
        }

        if start.elapsed() > DISCARD_WINDOW {
            break;
        }
    }

    trace!("discarded {} pending bytes", discarded);
    Ok(())
}

#[cfg(feature = "serial")]
pub use serial::SerialChannel;

#[cfg(feature = "serial")]
mod serial {
    use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};
    use tracing::debug;

    use super::*;
    use crate::config::DriverConfig;

    /// [`Channel`] over a serial port, 8N1.
    pub struct SerialChannel {
        port: Box<dyn SerialPort>,
    }

    impl SerialChannel {
        /// Open the port named in `config`.
        pub fn open(config: &DriverConfig) -> DriverResult<Self> {
            config.validate()?;

            let port = serialport::new(&config.port, config.baud_rate)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .timeout(config.read_timeout())
                .open()
                .map_err(std::io::Error::from)?;

            debug!(
                "opened {} at {} baud, timeout {} ms",
                config.port, config.baud_rate, config.read_timeout_ms
            );
            Ok(SerialChannel { port })
        }

        /// Change the line speed, e.g. after writing the module's `BaudRate`
        /// parameter and saving.
        pub fn set_baud_rate(&mut self, baud_rate: u32) -> DriverResult<()> {
            self.port
                .set_baud_rate(baud_rate)
                .map_err(std::io::Error::from)?;
            Ok(())
        }
    }

    impl std::fmt::Debug for SerialChannel {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("SerialChannel")
                .field("port", &self.port.name())
                .finish()
        }
    }

    impl Channel for SerialChannel {
        fn write_all(&mut self, data: &[u8]) -> DriverResult<()> {
            write_stream(&mut self.port, data)
        }

        fn read_exact(&mut self, len: usize) -> DriverResult<Vec<u8>> {
            read_stream(&mut self.port, len)
        }

        fn discard_buffered(&mut self) -> DriverResult<()> {
            self.port
                .clear(ClearBuffer::Input)
                .map_err(std::io::Error::from)?;
            Ok(())
        }
    }
}
