//! Byte-stream transport for the simulator
//!
//! [`serve`] drives a [`Simulator`] from any async byte stream: each read is
//! routed as one chunk, and any reply is written back and flushed before the
//! next read. With the `rtu` feature, [`open_serial`] opens a real (or
//! virtual) serial port to serve on.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "rtu")]
//! # async fn run() -> rtu_slave_sim::SimResult<()> {
//! use rtu_slave_sim::{snapshot, transport, SerialConfig};
//! use std::path::Path;
//!
//! let mut simulator = snapshot::load_dir(Path::new("dados"))?;
//! let config = SerialConfig::new("/dev/ttyUSB0");
//! let mut port = transport::open_serial(&config)?;
//!
//! let shutdown = async {
//!     let _ = tokio::signal::ctrl_c().await;
//! };
//! let stats = transport::serve(&mut port, &mut simulator, config.read_buffer, shutdown).await?;
//! println!("answered {} requests", stats.responses_sent);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::SimResult;
use crate::simulator::Simulator;

#[cfg(feature = "rtu")]
use crate::config::{Parity, SerialConfig, StopBits};

/// Counters for one [`serve`] run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServeStats {
    /// Reads that returned data
    pub chunks_received: u64,
    /// Total bytes read
    pub bytes_received: u64,
    /// Replies written
    pub responses_sent: u64,
    /// Total bytes written
    pub bytes_sent: u64,
}

/// Format raw bytes as hex for packet logging
fn format_hex_packet(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serve `simulator` on `stream` until EOF or until `shutdown` completes.
///
/// The simulator is borrowed exclusively for the whole run, so snapshot
/// saves can only happen before or after it, never during a request.
pub async fn serve<S, F>(
    stream: &mut S,
    simulator: &mut Simulator,
    read_buffer: usize,
    shutdown: F,
) -> SimResult<ServeStats>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut buf = vec![0u8; read_buffer.max(1)];
    let mut stats = ServeStats::default();

    loop {
        let n = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping transport");
                break;
            }
            read = stream.read(&mut buf) => read?,
        };

        if n == 0 {
            info!("Transport closed by peer");
            break;
        }

        let chunk = &buf[..n];
        stats.chunks_received += 1;
        stats.bytes_received += n as u64;
        debug!("[RTU] recv {}", format_hex_packet(chunk));

        if let Some(response) = simulator.deliver_chunk(chunk) {
            debug!("[RTU] send {}", format_hex_packet(&response));
            stream.write_all(&response).await?;
            stream.flush().await?;
            stats.responses_sent += 1;
            stats.bytes_sent += response.len() as u64;
        }
    }

    info!(
        "Transport stopped: {} chunk(s) / {} byte(s) in, {} response(s) / {} byte(s) out",
        stats.chunks_received, stats.bytes_received, stats.responses_sent, stats.bytes_sent
    );
    Ok(stats)
}

/// Open the serial port described by `config`
#[cfg(feature = "rtu")]
pub fn open_serial(config: &SerialConfig) -> SimResult<tokio_serial::SerialStream> {
    config.validate()?;

    let data_bits = match config.data_bits {
        7 => tokio_serial::DataBits::Seven,
        _ => tokio_serial::DataBits::Eight,
    };
    let parity = match config.parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Odd => tokio_serial::Parity::Odd,
        Parity::Even => tokio_serial::Parity::Even,
    };
    let stop_bits = match config.stop_bits {
        StopBits::One => tokio_serial::StopBits::One,
        StopBits::Two => tokio_serial::StopBits::Two,
    };

    let builder = tokio_serial::new(&config.port, config.baud_rate)
        .data_bits(data_bits)
        .parity(parity)
        .stop_bits(stop_bits);
    let port = tokio_serial::SerialStream::open(&builder)?;

    info!(
        "Opened serial port {} at {} baud ({}{}{})",
        config.port,
        config.baud_rate,
        config.data_bits,
        match config.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        },
        match config.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    );
    Ok(port)
}

/// Names of the serial ports present on this machine, sorted
#[cfg(feature = "rtu")]
pub fn available_ports() -> SimResult<Vec<String>> {
    let mut names: Vec<String> = tokio_serial::available_ports()?
        .into_iter()
        .map(|p| p.port_name)
        .collect();
    names.sort();
    Ok(names)
}
