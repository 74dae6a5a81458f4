//! # Device Snapshots
//!
//! JSON persistence of device memory, one file per device:
//!
//! ```json
//! {
//!   "ID_Slave": 1,
//!   "Registros": [0, 0, 42],
//!   "Entradas": [false, true],
//!   "Saidas": [true]
//! }
//! ```
//!
//! Loading copies as many values as fit and leaves the rest at zero/false;
//! missing or `null` arrays are treated as empty. Saving always writes the
//! full fixed-size arrays. The file stem is the device name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::device::{SlaveDevice, SlaveId};
use crate::error::{SimError, SimResult};
use crate::simulator::Simulator;
use crate::slave::ModbusSlave;

/// Snapshot file extension
pub const SNAPSHOT_EXTENSION: &str = "json";

/// On-disk form of one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Slave address
    #[serde(rename = "ID_Slave")]
    pub slave_id: SlaveId,
    /// Holding registers
    #[serde(rename = "Registros", default)]
    pub registers: Option<Vec<u16>>,
    /// Discrete inputs
    #[serde(rename = "Entradas", default)]
    pub discrete_inputs: Option<Vec<bool>>,
    /// Coils
    #[serde(rename = "Saidas", default)]
    pub coils: Option<Vec<bool>>,
}

impl SlaveDevice {
    /// Build device memory from a snapshot
    pub fn from_snapshot(snapshot: &DeviceSnapshot) -> Self {
        let mut device = SlaveDevice::new(snapshot.slave_id);
        if let Some(registers) = &snapshot.registers {
            device.load_registers(registers);
        }
        if let Some(inputs) = &snapshot.discrete_inputs {
            device.load_discrete_inputs(inputs);
        }
        if let Some(coils) = &snapshot.coils {
            device.load_coils(coils);
        }
        device
    }

    /// Snapshot of the current memory, with full-size arrays
    pub fn to_snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            slave_id: self.address(),
            registers: Some(self.registers().to_vec()),
            discrete_inputs: Some(self.discrete_inputs().to_vec()),
            coils: Some(self.coils().to_vec()),
        }
    }
}

/// Read one snapshot file
pub fn load_file(path: &Path) -> SimResult<SlaveDevice> {
    let content = fs::read_to_string(path)?;
    let snapshot: DeviceSnapshot = serde_json::from_str(&content)?;
    Ok(SlaveDevice::from_snapshot(&snapshot))
}

/// Write one snapshot file, pretty-printed
pub fn save_file(path: &Path, device: &SlaveDevice) -> SimResult<()> {
    let json = serde_json::to_string_pretty(&device.to_snapshot())?;
    fs::write(path, json)?;
    Ok(())
}

/// Load every `*.json` file in `dir` as a device named after its file stem.
///
/// Files that cannot be read or parsed are logged and skipped.
pub fn load_dir(dir: &Path) -> SimResult<Simulator> {
    if !dir.is_dir() {
        return Err(SimError::DataDirMissing {
            path: dir.to_path_buf(),
        });
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == SNAPSHOT_EXTENSION))
        .collect();
    paths.sort();

    let mut simulator = Simulator::new();
    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("Skipping snapshot with non-UTF-8 name: {}", path.display());
            continue;
        };

        match load_file(&path) {
            Ok(device) => {
                debug!("Loaded device '{}' at address {}", name, device.address());
                simulator.insert(name, ModbusSlave::with_device(device));
            }
            Err(e) => warn!("Failed to load device '{}': {}", name, e),
        }
    }

    info!("Loaded {} device(s) from {}", simulator.len(), dir.display());
    Ok(simulator)
}

/// Write `<name>.json` for every device in `simulator`.
///
/// All devices are attempted; the first failure is returned afterwards.
/// Returns the number of files written.
pub fn save_dir(dir: &Path, simulator: &Simulator) -> SimResult<usize> {
    fs::create_dir_all(dir)?;

    let mut written = 0;
    let mut first_error = None;
    for (name, slave) in simulator.iter() {
        let path = dir.join(format!("{}.{}", name, SNAPSHOT_EXTENSION));
        match save_file(&path, slave.device()) {
            Ok(()) => written += 1,
            Err(e) => {
                warn!("Failed to save device '{}' to {}: {}", name, path.display(), e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            info!("Saved {} device(s) to {}", written, dir.display());
            Ok(written)
        }
    }
}
