// NfSim: 5G Core Network Simulator written in Rust
// Copyright (C) 2022-2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Snapshot import and export
//!
//! A [`NetSnapshot`] captures the persisted entity state of a network: the five entity lists,
//! tagged with a schema version and the simulated time it was taken at. Runtime-only state
//! (queued events, pending timer handles, recorded auto-connection outcomes) is stripped; a
//! restored network starts with an empty queue.

use serde::{Deserialize, Serialize};

use crate::{
    bus::{Bus, BusConnection},
    connection::Connection,
    event::EventQueue,
    network::Network,
    nf::NetworkFunction,
    subscriber::Subscriber,
    types::{NetworkError, SimTime},
};

/// The schema version written by [`Network::snapshot`].
pub const SCHEMA_VERSION: u32 = 1;

/// A versioned, serializable capture of the persisted entity state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetSnapshot {
    /// Schema version of the snapshot.
    pub schema_version: u32,
    /// Simulated time the snapshot was taken at.
    pub taken_at: SimTime,
    /// All NFs, ordered by id.
    pub nfs: Vec<NetworkFunction>,
    /// All connections, ordered by id.
    pub connections: Vec<Connection>,
    /// All buses, ordered by id.
    pub buses: Vec<Bus>,
    /// All bus memberships, ordered by id.
    pub bus_connections: Vec<BusConnection>,
    /// All subscriber records, ordered by SUPI.
    pub subscribers: Vec<Subscriber>,
}

impl NetSnapshot {
    /// Serialize the snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String, NetworkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<Q: EventQueue> Network<Q> {
    /// Capture the persisted entity state of the network.
    pub fn snapshot(&self) -> NetSnapshot {
        NetSnapshot {
            schema_version: SCHEMA_VERSION,
            taken_at: self.sim_time(),
            nfs: self.store.nfs().cloned().collect(),
            connections: self.store.connections().cloned().collect(),
            buses: self.store.buses().cloned().collect(),
            bus_connections: self.store.bus_connections().cloned().collect(),
            subscribers: self.store.subscribers().cloned().collect(),
        }
    }

    /// Rebuild a network from a snapshot, using the given (empty) queue. Restoration emits no
    /// change events and schedules no events; id counters continue above the restored ids.
    pub fn from_snapshot(snapshot: NetSnapshot, queue: Q) -> Result<Self, NetworkError> {
        if snapshot.schema_version != SCHEMA_VERSION {
            return Err(NetworkError::UnsupportedSnapshot(snapshot.schema_version));
        }
        let mut net = Self::new(queue);
        for nf in snapshot.nfs {
            net.store.restore_nf(nf);
        }
        for conn in snapshot.connections {
            net.store.restore_connection(conn)?;
        }
        for bus in snapshot.buses {
            net.store.restore_bus(bus);
        }
        for bc in snapshot.bus_connections {
            net.store.restore_bus_connection(bc);
        }
        for sub in snapshot.subscribers {
            net.store.insert_subscriber(sub);
        }
        Ok(net)
    }
}
