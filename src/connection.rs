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

//! # Connection Validator
//!
//! Creation and removal of connections between NFs. Validity is undirected (a connection blocks
//! the unordered pair), display is directed (source and target are kept as given). The
//! validation order is fixed and the first failure wins.

use log::debug;

use crate::{
    event::EventQueue,
    network::Network,
    nf::TunnelPool,
    rules,
    types::{same_subnet, ConnectionId, NetworkError, NfId, NfKind, SimTime},
};

use serde::{Deserialize, Serialize};

/// A direct link between two NFs, labelled with its resolved reference-point name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Id of the connection.
    id: ConnectionId,
    /// Source endpoint, as given at creation.
    pub(crate) source: NfId,
    /// Target endpoint, as given at creation.
    pub(crate) target: NfId,
    /// The reference-point name, resolved once at creation and never recomputed.
    interface: String,
    /// Protocol version tag, taken from the source NF.
    protocol: String,
    /// Whether the connection was requested by explicit command. Auto-connections are
    /// manual-equivalent in every other respect.
    manual: bool,
    /// Simulated time of creation.
    created: SimTime,
    /// Whether the connection is shown on the canvas.
    pub(crate) visible: bool,
}

impl Connection {
    /// Return the id of the connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Return the source endpoint.
    pub fn source(&self) -> NfId {
        self.source
    }

    /// Return the target endpoint.
    pub fn target(&self) -> NfId {
        self.target
    }

    /// Return the resolved reference-point name.
    pub fn interface(&self) -> &str {
        self.interface.as_ref()
    }

    /// Return the protocol version tag.
    pub fn protocol(&self) -> &str {
        self.protocol.as_ref()
    }

    /// Whether the connection was requested by explicit command.
    pub fn manual(&self) -> bool {
        self.manual
    }

    /// Return the simulated time of creation.
    pub fn created(&self) -> SimTime {
        self.created
    }

    /// Whether the connection is shown on the canvas.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Return the endpoint opposite to the given one, if the given one is an endpoint at all.
    pub fn other(&self, nf: NfId) -> Option<NfId> {
        if nf == self.source {
            Some(self.target)
        } else if nf == self.target {
            Some(self.source)
        } else {
            None
        }
    }
}

impl<Q: EventQueue> Network<Q> {
    /// Connect two NFs.
    ///
    /// The validation order is fixed, and the first failure wins: identical endpoints
    /// ([`NetworkError::SelfConnection`]), missing endpoints ([`NetworkError::NfNotFound`]), an
    /// existing connection between the unordered pair ([`NetworkError::DuplicateConnection`]),
    /// differing subnets ([`NetworkError::SubnetMismatch`]), and finally the type-adjacency rule
    /// ([`NetworkError::InvalidAdjacency`]). On success, the reference-point name is resolved
    /// from the type-pair table (with the `"P2P"` fallback) and stored on the connection.
    ///
    /// Connecting a UPF to its DN lazily constructs the UPF's tunnel pool if absent.
    pub fn add_connection(
        &mut self,
        source: NfId,
        target: NfId,
        manual: bool,
    ) -> Result<ConnectionId, NetworkError> {
        if source == target {
            return Err(NetworkError::SelfConnection(source));
        }
        let src = self.store.nf_or_err(source)?;
        let dst = self.store.nf_or_err(target)?;
        if self.store.find_connection(source, target).is_some() {
            return Err(NetworkError::DuplicateConnection(source, target));
        }
        if !same_subnet(src.addr(), dst.addr()) {
            return Err(NetworkError::SubnetMismatch(source, target));
        }
        if !rules::adjacent(src.kind(), dst.kind()) {
            return Err(NetworkError::InvalidAdjacency(src.kind(), dst.kind()));
        }

        let interface = rules::interface_name(src.kind(), dst.kind());
        let protocol = src.protocol().to_string();
        let kinds = (src.kind(), dst.kind());

        let id = self.store.next_connection_id();
        debug!("connect {} -> {} over {}", source, target, interface);
        self.store.insert_connection(Connection {
            id,
            source,
            target,
            interface: interface.to_string(),
            protocol,
            manual,
            created: self.sim_time(),
            visible: true,
        })?;

        // the data-path link brings the UPF's tunnel pool to life.
        match kinds {
            (NfKind::Upf, NfKind::Dn) => self.ensure_tunnel_pool(source),
            (NfKind::Dn, NfKind::Upf) => self.ensure_tunnel_pool(target),
            _ => {}
        }

        Ok(id)
    }

    /// Remove the connection with the given id.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Result<(), NetworkError> {
        self.store.connection_or_err(id)?;
        self.store.remove_connection(id);
        Ok(())
    }

    /// Check whether the two NFs can reach each other: either a direct connection exists, or
    /// they share at least one bus. Deterministic; no probabilistic reachability.
    pub fn are_connected(&self, a: NfId, b: NfId) -> bool {
        self.store.find_connection(a, b).is_some() || self.store.shares_bus(a, b)
    }

    /// Construct the UPF's tunnel pool if it does not exist yet. A no-op on any other kind.
    pub(crate) fn ensure_tunnel_pool(&mut self, upf: NfId) {
        let Ok(nf) = self.store.nf_mut_or_err(upf) else { return };
        if let crate::nf::NfPayload::Upf { pool } = &mut nf.payload {
            if pool.is_none() {
                *pool = Some(TunnelPool::default());
                self.store.notify_updated(upf);
            }
        }
    }
}
