//! # Simulator
//!
//! A set of named slaves sharing one bus, with address-based routing.
//!
//! ## Routing
//!
//! An incoming chunk is handed, whole, to the slave whose address equals the
//! chunk's first byte. A chunk is assumed to carry bytes for one address
//! only: if a single read returns the tail of a frame for slave 1 followed by
//! a frame for slave 2, all of it lands in slave 1's buffer and slave 2's
//! request goes unanswered. This mirrors the emulated bus and is kept as is;
//! whether chunks should be split per address is an open question for
//! multi-device setups.

use std::collections::BTreeMap;

use bytes::Bytes;
use tracing::{trace, warn};

use crate::device::SlaveId;
use crate::slave::ModbusSlave;

/// Named slaves, iterated in name order.
#[derive(Debug, Default)]
pub struct Simulator {
    slaves: BTreeMap<String, ModbusSlave>,
}

impl Simulator {
    /// Create an empty simulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a slave under `name`, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, slave: ModbusSlave) -> Option<ModbusSlave> {
        let name = name.into();
        if let Some((other, _)) = self
            .slaves
            .iter()
            .find(|(n, s)| **n != name && s.address() == slave.address())
        {
            warn!(
                "Device '{}' shares address {} with '{}'; only the first in name order answers",
                name,
                slave.address(),
                other
            );
        }
        self.slaves.insert(name, slave)
    }

    /// Remove a slave by name
    pub fn remove(&mut self, name: &str) -> Option<ModbusSlave> {
        self.slaves.remove(name)
    }

    /// Look up a slave by name
    pub fn get(&self, name: &str) -> Option<&ModbusSlave> {
        self.slaves.get(name)
    }

    /// Look up a slave by name, mutably
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ModbusSlave> {
        self.slaves.get_mut(name)
    }

    /// First slave (in name order) answering to `address`
    pub fn find_by_address(&mut self, address: SlaveId) -> Option<&mut ModbusSlave> {
        self.slaves.values_mut().find(|s| s.address() == address)
    }

    /// Device names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slaves.keys().map(String::as_str)
    }

    /// All slaves with their names
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModbusSlave)> {
        self.slaves.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Number of slaves
    pub fn len(&self) -> usize {
        self.slaves.len()
    }

    /// True if no slaves are configured
    pub fn is_empty(&self) -> bool {
        self.slaves.is_empty()
    }

    /// Route `chunk` to the slave at `address_hint` and return its reply bytes.
    ///
    /// Unknown addresses drop the chunk.
    pub fn deliver(&mut self, address_hint: SlaveId, chunk: &[u8]) -> Option<Bytes> {
        let Some(slave) = self.find_by_address(address_hint) else {
            trace!(
                "No device at address {}, dropped {} byte(s)",
                address_hint,
                chunk.len()
            );
            return None;
        };
        slave.process(chunk).into_option()
    }

    /// Route `chunk` by its first byte
    pub fn deliver_chunk(&mut self, chunk: &[u8]) -> Option<Bytes> {
        let &hint = chunk.first()?;
        self.deliver(hint, chunk)
    }
}

impl FromIterator<(String, ModbusSlave)> for Simulator {
    fn from_iter<I: IntoIterator<Item = (String, ModbusSlave)>>(iter: I) -> Self {
        let mut sim = Simulator::new();
        for (name, slave) in iter {
            sim.insert(name, slave);
        }
        sim
    }
}
