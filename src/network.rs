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

//! # Top-level Network module
//!
//! This module holds the network topology and drives the simulation. The [`Network`] owns the
//! entity store and the event queue; all mutations go through its command surface and all
//! scheduled behavior is executed by popping events from the queue.

use std::collections::HashMap;

use log::trace;

use crate::{
    autoconnect::AutoConnectOutcome,
    event::{BasicEventQueue, Event, EventHandle, EventQueue},
    nf::NetworkFunction,
    store::{ChangeEvent, EntityStore},
    types::{NetworkError, NfId, SimTime},
};

static DEFAULT_STOP_AFTER: usize = 1_000_000;

/// # Network struct
/// The struct contains the entity store (all NFs, connections, buses and subscribers), the
/// event queue driving lifecycle promotion, auto-connection and registration, and the recorded
/// auto-connection outcomes.
///
/// ```rust
/// use nfsim::prelude::*;
///
/// fn main() -> Result<(), NetworkError> {
///     // create an empty network with the deterministic FIFO queue.
///     let mut net = Network::default();
///
///     let nrf = net.add_nf(NfKind::Nrf, None)?;
///     let amf = net.add_nf(NfKind::Amf, None)?;
///
///     // both NFs stabilized, and the AMF auto-connected to the NRF.
///     assert_eq!(net.nf(amf).unwrap().status(), NfStatus::Stable);
///     assert!(net.are_connected(amf, nrf));
///     Ok(())
/// }
/// ```
///
/// ## Type arguments
///
/// The [`Network`] accepts one type attribute: the kind of [`EventQueue`] used. The queue
/// determines when scheduled events fire. The default [`BasicEventQueue`] is a deterministic
/// FIFO; [`crate::event::TimingQueue`] adds a simulated clock with randomized setup latencies.
///
/// ## Execution model
///
/// Execution is single-threaded and cooperative: every event handler runs to completion, and
/// the only suspension points are the scheduled events themselves. Handlers re-validate that
/// the entities they reference still exist, because an earlier event (or a user-initiated
/// delete) may have invalidated them; a handler whose precondition no longer holds degrades to
/// a silent no-op.
#[derive(Debug, Clone)]
pub struct Network<Q = BasicEventQueue> {
    pub(crate) store: EntityStore,
    pub(crate) queue: Q,
    /// Pending event handles per NF, cancelled eagerly on removal.
    pub(crate) pending: HashMap<NfId, Vec<EventHandle>>,
    /// Recorded outcome of the last auto-connection run per NF.
    pub(crate) outcomes: HashMap<NfId, AutoConnectOutcome>,
    pub(crate) stop_after: Option<usize>,
    pub(crate) skip_queue: bool,
}

impl Default for Network<BasicEventQueue> {
    fn default() -> Self {
        Self::new(BasicEventQueue::new())
    }
}

impl<Q> Network<Q> {
    /// Generate an empty Network
    pub fn new(queue: Q) -> Self {
        Self {
            store: EntityStore::new(),
            queue,
            pending: HashMap::new(),
            outcomes: HashMap::new(),
            stop_after: Some(DEFAULT_STOP_AFTER),
            skip_queue: false,
        }
    }

    // ********************
    // * Helper Functions *
    // ********************

    /// Returns a reference to the entity store.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Returns the number of live NFs in the topology.
    pub fn num_nfs(&self) -> usize {
        self.store.num_nfs()
    }

    /// Returns a reference to the NF, if it exists.
    pub fn nf(&self, id: NfId) -> Option<&NetworkFunction> {
        self.store.nf(id)
    }

    /// Get the NfId with the given display name. If multiple NFs share the name, the one with
    /// the lowest id is returned. If the name was not found, an error is returned.
    pub fn get_nf_id(&self, name: impl AsRef<str>) -> Result<NfId, NetworkError> {
        self.store
            .nfs()
            .filter(|nf| nf.name() == name.as_ref())
            .map(|nf| nf.id())
            .next()
            .ok_or_else(|| NetworkError::NfNameNotFound(name.as_ref().to_string()))
    }

    /// Returns the display name of the NF, if the id was found.
    pub fn get_nf_name(&self, id: NfId) -> Result<&str, NetworkError> {
        self.store.nf_or_err(id).map(|nf| nf.name())
    }

    /// Drain all pending change events, in emission order.
    pub fn take_events(&mut self) -> Vec<ChangeEvent> {
        self.store.take_events()
    }

    /// The recorded outcome of the last auto-connection run of the NF, if one happened.
    pub fn auto_connect_outcome(&self, id: NfId) -> Option<&AutoConnectOutcome> {
        self.outcomes.get(&id)
    }

    /// Configure the network to pause the queue and return an error after the given number of
    /// events have been executed. If set to `None`, the queue runs until drained.
    pub fn set_event_limit(&mut self, stop_after: Option<usize>) {
        self.stop_after = stop_after;
    }
}

impl<Q: EventQueue> Network<Q> {
    /// The current simulated time. Zero for untimed queues.
    pub fn sim_time(&self) -> SimTime {
        self.queue.get_time().unwrap_or(0)
    }

    // *******************
    // * Local Functions *
    // *******************

    /// Enqueue the event and remember its handle so it can be cancelled when the target NF is
    /// removed.
    pub(crate) fn schedule(&mut self, event: Event<Q::Priority>) {
        let nf = event.nf();
        let handle = self.queue.push(event);
        self.pending.entry(nf).or_default().push(handle);
    }

    /// Cancel all pending events targeting the NF. Handlers still re-check existence; this only
    /// avoids useless queue churn.
    pub(crate) fn cancel_pending(&mut self, nf: NfId) {
        for handle in self.pending.remove(&nf).unwrap_or_default() {
            self.queue.cancel(handle);
        }
    }

    /// Execute a single event. Handlers never raise: a no-longer-valid precondition degrades to
    /// a logged no-op, since no caller is waiting on a scheduled event. Handles of fired events
    /// stay in the pending map until the NF is removed; cancelling a fired handle is a no-op.
    pub(crate) fn handle_event(&mut self, event: Event<Q::Priority>) {
        trace!("{}", event.fmt());
        match event {
            Event::Stabilize(_, nf) => self.handle_stabilize(nf),
            Event::AutoConnect(_, nf) => self.handle_auto_connect(nf),
            Event::Register(_, nf, attempt) => self.handle_register(nf, attempt),
        }
    }

    /// Run the event queue unless the network is in manual simulation mode.
    pub(crate) fn do_queue_maybe_skip(&mut self) -> Result<(), NetworkError> {
        if self.skip_queue {
            return Ok(());
        }
        crate::interactive::InteractiveNetwork::simulate(self)
    }
}
