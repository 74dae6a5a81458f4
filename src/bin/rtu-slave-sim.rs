//! RTU Slave Sim
//!
//! Loads device snapshots from a data directory, opens a serial port and
//! answers Modbus RTU requests until Ctrl-C.
//!
//! Usage: rtu-slave-sim --port /dev/ttyUSB0 [--baud 9600] [--data-dir dados] [--save-on-exit]
//!        rtu-slave-sim --list-ports

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use rtu_slave_sim::config::{DEFAULT_BAUD_RATE, DEFAULT_DATA_DIR, DEFAULT_READ_BUFFER};
use rtu_slave_sim::logging::{self, DEFAULT_LOG_LEVEL};
use rtu_slave_sim::{snapshot, transport, SimResult, SimulatorConfig};

/// Modbus RTU slave simulator
#[derive(Debug, Parser)]
#[command(name = "rtu-slave-sim", version, about)]
struct Cli {
    /// Serial port to serve on
    #[arg(short, long, env = "RTU_SIM_PORT", required_unless_present = "list_ports")]
    port: Option<String>,

    /// Baud rate (9600, 19200, 38400, 57600, 115200)
    #[arg(short, long, env = "RTU_SIM_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Directory with one JSON snapshot per device
    #[arg(short, long, env = "RTU_SIM_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Save device memory back to the data directory on exit
    #[arg(long)]
    save_on_exit: bool,

    /// Print available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

impl Cli {
    fn simulator_config(&self) -> SimulatorConfig {
        let mut config = SimulatorConfig::new(self.port.clone().unwrap_or_default())
            .with_data_dir(self.data_dir.clone())
            .with_save_on_exit(self.save_on_exit);
        config.serial = config
            .serial
            .with_baud_rate(self.baud)
            .with_read_buffer(DEFAULT_READ_BUFFER);
        config
    }
}

async fn run(config: SimulatorConfig) -> SimResult<()> {
    config.validate()?;

    let mut simulator = snapshot::load_dir(&config.data_dir)?;
    if simulator.is_empty() {
        warn!("No devices in {}, nothing will answer", config.data_dir.display());
    }
    for (name, slave) in simulator.iter() {
        info!("Device '{}' at address {}", name, slave.address());
    }

    let mut port = transport::open_serial(&config.serial)?;
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    transport::serve(&mut port, &mut simulator, config.serial.read_buffer, shutdown).await?;

    if config.save_on_exit {
        snapshot::save_dir(&config.data_dir, &simulator)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_level) {
        eprintln!("Failed to initialise logging: {}", e);
    }
    info!("{}", rtu_slave_sim::info());

    if cli.list_ports {
        return match transport::available_ports() {
            Ok(ports) => {
                for port in ports {
                    println!("{}", port);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    match run(cli.simulator_config()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
