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

//! Module defining buses, the rendezvous entities of the topology. Two NFs sharing a bus are
//! treated as connected without a direct connection record.

use serde::{Deserialize, Serialize};

use crate::{
    event::EventQueue,
    network::Network,
    types::{BusConnectionId, BusId, NetworkError, NfId},
};

/// A rendezvous entity. Membership is kept in separate [`BusConnection`] records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    /// Id of the bus.
    id: BusId,
    /// Display name.
    name: String,
    /// Canvas position. Opaque display data.
    position: Option<(f64, f64)>,
}

impl Bus {
    /// Return the id of the bus.
    pub fn id(&self) -> BusId {
        self.id
    }

    /// Return the display name of the bus.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Return the canvas position of the bus, if one was set.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }
}

/// A membership record of an NF on a bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusConnection {
    /// Id of the membership record.
    id: BusConnectionId,
    /// The member NF.
    pub(crate) nf: NfId,
    /// The bus.
    pub(crate) bus: BusId,
}

impl BusConnection {
    /// Return the id of the membership record.
    pub fn id(&self) -> BusConnectionId {
        self.id
    }

    /// Return the member NF.
    pub fn nf(&self) -> NfId {
        self.nf
    }

    /// Return the bus.
    pub fn bus(&self) -> BusId {
        self.bus
    }
}

impl<Q: EventQueue> Network<Q> {
    /// Add a new bus with the given display name.
    pub fn add_bus(&mut self, name: impl Into<String>, position: Option<(f64, f64)>) -> BusId {
        let id = self.store.next_bus_id();
        self.store.insert_bus(Bus {
            id,
            name: name.into(),
            position,
        });
        id
    }

    /// Join the NF onto the bus. Joining a bus the NF is already on returns the existing
    /// membership record.
    pub fn join_bus(&mut self, nf: NfId, bus: BusId) -> Result<BusConnectionId, NetworkError> {
        self.store.nf_or_err(nf)?;
        self.store.bus_or_err(bus)?;
        if let Some(existing) = self.store.find_bus_connection(nf, bus) {
            return Ok(existing);
        }
        let id = self.store.next_bus_connection_id();
        self.store.insert_bus_connection(BusConnection { id, nf, bus });
        Ok(id)
    }

    /// Take the NF off the bus. A no-op if the NF was not a member.
    pub fn leave_bus(&mut self, nf: NfId, bus: BusId) -> Result<(), NetworkError> {
        self.store.nf_or_err(nf)?;
        self.store.bus_or_err(bus)?;
        if let Some(id) = self.store.find_bus_connection(nf, bus) {
            self.store.remove_bus_connection(id);
        }
        Ok(())
    }
}
