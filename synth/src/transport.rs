use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::config::Config;
use crate::error::Result;

/// Byte stream to the synth.
///
/// Requests and responses strictly alternate; implementations never need to
/// buffer more than one response.
pub trait Transport {
    /// Drops whatever is pending on the input side.
    fn clear_input(&mut self) -> io::Result<()>;

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Blocks until at least one byte is available, then returns as many as
    /// fit in `buf`. Never returns more than `buf.len()`.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Reads exactly `buf.len()` bytes, accumulating partial chunks.
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let mut received = 0;
        self.fill(buf, &mut received)
    }

    /// Same as [`Transport::read_exact`], with `received` tracking how far
    /// the buffer got when an error cuts the read short. A read of zero bytes
    /// means the link is gone and ends in `UnexpectedEof`.
    fn fill(&mut self, buf: &mut [u8], received: &mut usize) -> io::Result<()> {
        while *received < buf.len() {
            let n = self.read_available(&mut buf[*received..])?;
            if n == 0 {
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
            *received += n;
        }
        Ok(())
    }
}

/// [`Transport`] over a serial port, 8N1.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    response_timeout: Option<Duration>,
}

impl SerialTransport {
    pub fn open(config: &Config) -> Result<Self> {
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(config.poll_interval_ms))
            .open()?;

        tracing::info!("opened {} at {} baud", config.port, config.baud_rate);

        Ok(Self {
            port,
            response_timeout: config.response_timeout_ms.map(Duration::from_millis),
        })
    }
}

impl Transport for SerialTransport {
    fn clear_input(&mut self) -> io::Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        tracing::trace!("tx {bytes:02X?}");
        self.port.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.port)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let started = Instant::now();
        loop {
            // Each read waits at most one poll interval.
            match self.port.read(buf) {
                Ok(0) => {}
                Ok(n) => {
                    tracing::trace!("rx {} bytes", n);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) => return Err(e),
            }

            if let Some(timeout) = self.response_timeout {
                if started.elapsed() >= timeout {
                    return Err(io::ErrorKind::TimedOut.into());
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::io;

    use super::Transport;

    /// Scripted transport: replays queued response chunks and records
    /// every request.
    #[derive(Default)]
    pub struct MockTransport {
        /// One entry per `write_all` call.
        pub requests: Vec<Vec<u8>>,
        pub clears: usize,
        pub flushes: usize,
        pub reads: usize,
        /// Once the queue is empty, report end of stream instead of a stall.
        pub eof: bool,
        chunks: VecDeque<Vec<u8>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues one chunk; a read may consume it across several calls.
        pub fn respond(&mut self, chunk: &[u8]) -> &mut Self {
            self.chunks.push_back(chunk.to_vec());
            self
        }

        /// Queues a full 512-byte dump split into chunks of the given sizes.
        pub fn respond_dump(&mut self, image: &[u8], chunk_sizes: &[usize]) -> &mut Self {
            let mut start = 0;
            for size in chunk_sizes {
                self.respond(&image[start..start + size]);
                start += size;
            }
            assert_eq!(start, image.len(), "chunks must cover the image");
            self
        }

        pub fn pending(&self) -> usize {
            self.chunks.iter().map(Vec::len).sum()
        }

        /// Total number of calls that touched the wire.
        pub fn io_count(&self) -> usize {
            self.requests.len() + self.reads + self.clears + self.flushes
        }

        pub fn reset_log(&mut self) {
            self.requests.clear();
            self.clears = 0;
            self.flushes = 0;
            self.reads = 0;
        }
    }

    impl Transport for MockTransport {
        fn clear_input(&mut self) -> io::Result<()> {
            self.clears += 1;
            Ok(())
        }

        fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
            self.requests.push(bytes.to_vec());
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }

        fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let Some(mut chunk) = self.chunks.pop_front() else {
                if self.eof {
                    return Ok(0);
                }
                // real hardware would stall here
                return Err(io::ErrorKind::TimedOut.into());
            };

            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push_front(chunk.split_off(n));
            }
            Ok(n)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Transport;
    use super::mock::MockTransport;

    #[test]
    fn read_exact_accumulates_chunks() {
        let mut t = MockTransport::new();
        t.respond(&[1, 2]).respond(&[3]).respond(&[4, 5, 6]);

        let mut buf = [0_u8; 5];
        t.read_exact(&mut buf).unwrap();

        assert_eq!(buf, [1, 2, 3, 4, 5]);
        // the extra byte stays queued
        assert_eq!(t.pending(), 1);
    }

    #[test]
    fn read_available_never_overruns_buffer() {
        let mut t = MockTransport::new();
        t.respond(&[9; 10]);

        let mut buf = [0_u8; 4];
        assert_eq!(t.read_available(&mut buf).unwrap(), 4);
        assert_eq!(t.pending(), 6);
    }

    #[test]
    fn zero_byte_read_is_end_of_stream() {
        let mut t = MockTransport::new();
        t.eof = true;
        t.respond(&[1, 2]);

        let mut buf = [0_u8; 4];
        let mut received = 0;
        let err = t.fill(&mut buf, &mut received).unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
        assert_eq!(received, 2);
    }

    #[test]
    fn starved_read_times_out() {
        let mut t = MockTransport::new();
        let mut buf = [0_u8; 1];
        let err = t.read_exact(&mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    }
}
