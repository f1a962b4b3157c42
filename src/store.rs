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

//! # Entity Store
//!
//! The authoritative registry of NFs, connections, buses, bus-connections and subscribers. The
//! store is pure CRUD plus change notification: it enforces no business rules, and it is owned
//! by the [`crate::network::Network`] and passed by reference to the components that need it —
//! there is no ambient global.
//!
//! The NF adjacency lives on a petgraph [`StableUnGraph`] whose edge weights are connection
//! ids. Since stable node indices are recycled after removal, NF ids are kept apart from the
//! graph: an [`NfId`] is a monotonic counter that is never reused, and `node_of` maps it to the
//! current graph node.

use std::{
    collections::{HashMap, VecDeque},
    net::Ipv4Addr,
};

use itertools::Itertools;
use petgraph::stable_graph::{NodeIndex, StableUnGraph};

use crate::{
    bus::{Bus, BusConnection},
    connection::Connection,
    nf::NetworkFunction,
    subscriber::Subscriber,
    types::{BusConnectionId, BusId, ConnectionId, NetworkError, NfId, NfKind, NfStatus},
};

/// Change notification emitted by the store on every mutation. Consumed by external observers
/// (the canvas, the narration log) via [`crate::network::Network::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// An NF was added. Carries the entity as persisted.
    NfAdded(NetworkFunction),
    /// An NF was mutated. Carries the entity after the mutation.
    NfUpdated(NetworkFunction),
    /// An NF is about to be removed (pre-removal notification, before any cascade).
    NfRemoving(NfId),
    /// An NF was removed. Carries the entity as it was last persisted.
    NfRemoved(NetworkFunction),
    /// A connection was added.
    ConnectionAdded(Connection),
    /// A connection was removed.
    ConnectionRemoved(Connection),
}

/// The entity registry. See the [module documentation](self) for details.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    graph: StableUnGraph<NfId, ConnectionId>,
    node_of: HashMap<NfId, NodeIndex>,
    nfs: HashMap<NfId, NetworkFunction>,
    connections: HashMap<ConnectionId, Connection>,
    buses: HashMap<BusId, Bus>,
    bus_connections: HashMap<BusConnectionId, BusConnection>,
    subscribers: HashMap<String, Subscriber>,
    next_nf: u64,
    next_connection: u64,
    next_bus: u64,
    next_bus_connection: u64,
    events: VecDeque<ChangeEvent>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn push_event(&mut self, event: ChangeEvent) {
        self.events.push_back(event);
    }

    /// Drain all pending change events, in emission order.
    pub fn take_events(&mut self) -> Vec<ChangeEvent> {
        self.events.drain(..).collect()
    }

    // ********************
    // * Network function *
    // ********************

    /// Reserve the next NF id. Ids are monotonic and never reused.
    pub(crate) fn next_nf_id(&mut self) -> NfId {
        let id = NfId(self.next_nf);
        self.next_nf += 1;
        id
    }

    /// Persist a new NF and emit [`ChangeEvent::NfAdded`].
    pub(crate) fn insert_nf(&mut self, nf: NetworkFunction) {
        let id = nf.id();
        let node = self.graph.add_node(id);
        self.node_of.insert(id, node);
        self.push_event(ChangeEvent::NfAdded(nf.clone()));
        self.nfs.insert(id, nf);
    }

    /// Persist an NF from a snapshot, without emitting an event.
    pub(crate) fn restore_nf(&mut self, nf: NetworkFunction) {
        let id = nf.id();
        self.next_nf = self.next_nf.max(id.0 + 1);
        let node = self.graph.add_node(id);
        self.node_of.insert(id, node);
        self.nfs.insert(id, nf);
    }

    /// Get a reference to the NF, if it exists.
    pub fn nf(&self, id: NfId) -> Option<&NetworkFunction> {
        self.nfs.get(&id)
    }

    /// Get a reference to the NF, or `NfNotFound`.
    pub fn nf_or_err(&self, id: NfId) -> Result<&NetworkFunction, NetworkError> {
        self.nfs.get(&id).ok_or(NetworkError::NfNotFound(id))
    }

    /// Get a mutable reference to the NF, or `NfNotFound`. The caller is responsible for
    /// calling [`EntityStore::notify_updated`] after the mutation.
    pub(crate) fn nf_mut_or_err(&mut self, id: NfId) -> Result<&mut NetworkFunction, NetworkError> {
        self.nfs.get_mut(&id).ok_or(NetworkError::NfNotFound(id))
    }

    /// Iterate over all live NFs, ordered by id.
    pub fn nfs(&self) -> impl Iterator<Item = &NetworkFunction> {
        self.nfs.values().sorted_by_key(|nf| nf.id())
    }

    /// All live NFs of the given kind, ordered by id.
    pub fn nfs_of_kind(&self, kind: NfKind) -> Vec<&NetworkFunction> {
        self.nfs()
            .filter(|nf| nf.kind() == kind)
            .collect()
    }

    /// The number of live NFs of the given kind.
    pub fn count_of_kind(&self, kind: NfKind) -> usize {
        self.nfs.values().filter(|nf| nf.kind() == kind).count()
    }

    /// The number of live NFs.
    pub fn num_nfs(&self) -> usize {
        self.nfs.len()
    }

    /// Emit [`ChangeEvent::NfUpdated`] carrying the current state of the NF.
    pub(crate) fn notify_updated(&mut self, id: NfId) {
        if let Some(nf) = self.nfs.get(&id) {
            let nf = nf.clone();
            self.push_event(ChangeEvent::NfUpdated(nf));
        }
    }

    /// Emit the pre-removal notification [`ChangeEvent::NfRemoving`].
    pub(crate) fn notify_removing(&mut self, id: NfId) {
        self.push_event(ChangeEvent::NfRemoving(id));
    }

    /// Remove the NF and emit [`ChangeEvent::NfRemoved`] with the entity marked `Removed`. All
    /// connections referencing the NF must have been removed before.
    pub(crate) fn remove_nf(&mut self, id: NfId) -> Option<NetworkFunction> {
        let mut nf = self.nfs.remove(&id)?;
        if let Some(node) = self.node_of.remove(&id) {
            self.graph.remove_node(node);
        }
        nf.status = NfStatus::Removed;
        self.push_event(ChangeEvent::NfRemoved(nf.clone()));
        Some(nf)
    }

    /// Check whether the address is held by a live NF.
    pub fn addr_in_use(&self, addr: Ipv4Addr) -> bool {
        self.nfs.values().any(|nf| nf.addr() == addr)
    }

    /// Check whether the port is held by a live NF.
    pub fn port_in_use(&self, port: u16) -> bool {
        self.nfs.values().any(|nf| nf.port() == port)
    }

    // **************
    // * Connection *
    // **************

    /// Reserve the next connection id.
    pub(crate) fn next_connection_id(&mut self) -> ConnectionId {
        let id = ConnectionId(self.next_connection);
        self.next_connection += 1;
        id
    }

    /// Persist a new connection, wire the graph edge, and emit
    /// [`ChangeEvent::ConnectionAdded`]. Both endpoints must exist.
    pub(crate) fn insert_connection(&mut self, conn: Connection) -> Result<(), NetworkError> {
        let a = *self
            .node_of
            .get(&conn.source)
            .ok_or(NetworkError::NfNotFound(conn.source))?;
        let b = *self
            .node_of
            .get(&conn.target)
            .ok_or(NetworkError::NfNotFound(conn.target))?;
        self.graph.add_edge(a, b, conn.id());
        self.push_event(ChangeEvent::ConnectionAdded(conn.clone()));
        self.connections.insert(conn.id(), conn);
        Ok(())
    }

    /// Persist a connection from a snapshot: wire the graph edge, bump the id counter, and emit
    /// no event.
    pub(crate) fn restore_connection(&mut self, conn: Connection) -> Result<(), NetworkError> {
        let a = *self
            .node_of
            .get(&conn.source)
            .ok_or(NetworkError::NfNotFound(conn.source))?;
        let b = *self
            .node_of
            .get(&conn.target)
            .ok_or(NetworkError::NfNotFound(conn.target))?;
        self.next_connection = self.next_connection.max(conn.id().0 + 1);
        self.graph.add_edge(a, b, conn.id());
        self.connections.insert(conn.id(), conn);
        Ok(())
    }

    /// Get a reference to the connection, if it exists.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Get a reference to the connection, or `ConnectionNotFound`.
    pub fn connection_or_err(&self, id: ConnectionId) -> Result<&Connection, NetworkError> {
        self.connections
            .get(&id)
            .ok_or(NetworkError::ConnectionNotFound(id))
    }

    /// Iterate over all connections, ordered by id.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values().sorted_by_key(|c| c.id())
    }

    /// The number of connections.
    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    /// Find the connection between the unordered pair, if one exists.
    pub fn find_connection(&self, a: NfId, b: NfId) -> Option<ConnectionId> {
        let a = *self.node_of.get(&a)?;
        let b = *self.node_of.get(&b)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).copied()
    }

    /// All connections referencing the NF, ordered by id.
    pub fn connections_of(&self, id: NfId) -> Vec<ConnectionId> {
        match self.node_of.get(&id) {
            Some(node) => self
                .graph
                .edges(*node)
                .map(|e| *e.weight())
                .sorted()
                .collect(),
            None => Vec::new(),
        }
    }

    /// All NFs with a direct connection to the given NF, ordered by id.
    pub fn neighbors(&self, id: NfId) -> Vec<NfId> {
        match self.node_of.get(&id) {
            Some(node) => self
                .graph
                .neighbors(*node)
                .map(|n| self.graph[n])
                .sorted()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Remove the connection, drop the graph edge, and emit
    /// [`ChangeEvent::ConnectionRemoved`].
    pub(crate) fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let conn = self.connections.remove(&id)?;
        if let (Some(a), Some(b)) = (self.node_of.get(&conn.source), self.node_of.get(&conn.target))
        {
            if let Some(edge) = self.graph.find_edge(*a, *b) {
                self.graph.remove_edge(edge);
            }
        }
        self.push_event(ChangeEvent::ConnectionRemoved(conn.clone()));
        Some(conn)
    }

    // *******
    // * Bus *
    // *******

    /// Reserve the next bus id.
    pub(crate) fn next_bus_id(&mut self) -> BusId {
        let id = BusId(self.next_bus);
        self.next_bus += 1;
        id
    }

    /// Persist a new bus.
    pub(crate) fn insert_bus(&mut self, bus: Bus) {
        self.buses.insert(bus.id(), bus);
    }

    /// Persist a bus from a snapshot, bumping the id counter.
    pub(crate) fn restore_bus(&mut self, bus: Bus) {
        self.next_bus = self.next_bus.max(bus.id().0 + 1);
        self.buses.insert(bus.id(), bus);
    }

    /// Get a reference to the bus, if it exists.
    pub fn bus(&self, id: BusId) -> Option<&Bus> {
        self.buses.get(&id)
    }

    /// Get a reference to the bus, or `BusNotFound`.
    pub fn bus_or_err(&self, id: BusId) -> Result<&Bus, NetworkError> {
        self.buses.get(&id).ok_or(NetworkError::BusNotFound(id))
    }

    /// Iterate over all buses, ordered by id.
    pub fn buses(&self) -> impl Iterator<Item = &Bus> {
        self.buses.values().sorted_by_key(|b| b.id())
    }

    /// Reserve the next bus-connection id.
    pub(crate) fn next_bus_connection_id(&mut self) -> BusConnectionId {
        let id = BusConnectionId(self.next_bus_connection);
        self.next_bus_connection += 1;
        id
    }

    /// Persist a new bus-connection.
    pub(crate) fn insert_bus_connection(&mut self, bc: BusConnection) {
        self.bus_connections.insert(bc.id(), bc);
    }

    /// Persist a bus-connection from a snapshot, bumping the id counter.
    pub(crate) fn restore_bus_connection(&mut self, bc: BusConnection) {
        self.next_bus_connection = self.next_bus_connection.max(bc.id().0 + 1);
        self.bus_connections.insert(bc.id(), bc);
    }

    /// Iterate over all bus-connections, ordered by id.
    pub fn bus_connections(&self) -> impl Iterator<Item = &BusConnection> {
        self.bus_connections.values().sorted_by_key(|bc| bc.id())
    }

    /// Find the membership record of the NF on the bus, if one exists.
    pub fn find_bus_connection(&self, nf: NfId, bus: BusId) -> Option<BusConnectionId> {
        self.bus_connections
            .values()
            .find(|bc| bc.nf == nf && bc.bus == bus)
            .map(|bc| bc.id())
    }

    /// All bus memberships of the NF.
    pub fn bus_connections_of(&self, nf: NfId) -> Vec<BusConnectionId> {
        self.bus_connections
            .values()
            .filter(|bc| bc.nf == nf)
            .map(|bc| bc.id())
            .sorted()
            .collect()
    }

    /// Check whether the two NFs share at least one bus.
    pub fn shares_bus(&self, a: NfId, b: NfId) -> bool {
        self.bus_connections
            .values()
            .filter(|bc| bc.nf == a)
            .any(|on_a| {
                self.bus_connections
                    .values()
                    .any(|bc| bc.nf == b && bc.bus == on_a.bus)
            })
    }

    /// Remove a bus membership.
    pub(crate) fn remove_bus_connection(&mut self, id: BusConnectionId) -> Option<BusConnection> {
        self.bus_connections.remove(&id)
    }

    // **************
    // * Subscriber *
    // **************

    /// Persist a subscriber, keyed by its SUPI. Returns the replaced record, if any.
    pub(crate) fn insert_subscriber(&mut self, sub: Subscriber) -> Option<Subscriber> {
        self.subscribers.insert(sub.supi.clone(), sub)
    }

    /// Look up a subscriber by SUPI.
    pub fn subscriber(&self, supi: &str) -> Option<&Subscriber> {
        self.subscribers.get(supi)
    }

    /// Remove a subscriber by SUPI.
    pub(crate) fn remove_subscriber(&mut self, supi: &str) -> Option<Subscriber> {
        self.subscribers.remove(supi)
    }

    /// Iterate over all subscribers, ordered by SUPI.
    pub fn subscribers(&self) -> impl Iterator<Item = &Subscriber> {
        self.subscribers.values().sorted_by_key(|s| s.supi.clone())
    }

    /// Check whether the subscriber directory holds at least one record.
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }
}
