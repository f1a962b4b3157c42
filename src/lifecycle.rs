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

//! # Lifecycle Manager
//!
//! Creation, promotion, stop/start and removal of network functions. The states are
//! `Creating -> Starting -> Stable`, with the side transitions `Stable | Starting -> Stopped`
//! and any state `-> Removed` (removal deletes the entity, so `Removed` never appears on a
//! stored NF).

use std::net::Ipv4Addr;

use log::debug;

use crate::{
    alloc,
    event::{Event, EventQueue},
    network::Network,
    nf::NetworkFunction,
    rules,
    types::{NetworkError, NfId, NfKind, NfStatus},
};

/// A partial update applied to an NF by [`Network::update_nf_config`]. Fields left as `None`
/// are untouched. The identity fields only apply to UEs and are silently ignored on any other
/// kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NfPatch {
    /// New display name.
    pub name: Option<String>,
    /// New canvas position.
    pub position: Option<(f64, f64)>,
    /// New subscription permanent identifier (UE only).
    pub supi: Option<String>,
    /// New shared secret (UE only).
    pub key: Option<String>,
    /// New slice/service type (UE only).
    pub sst: Option<u8>,
    /// New slice differentiator (UE only).
    pub sd: Option<Option<String>>,
    /// New data network name (UE only).
    pub dnn: Option<String>,
}

impl NfPatch {
    fn touches_identity(&self) -> bool {
        self.supi.is_some()
            || self.key.is_some()
            || self.sst.is_some()
            || self.sd.is_some()
            || self.dnn.is_some()
    }
}

impl<Q: EventQueue> Network<Q> {
    /// Add a new NF of the given kind to the topology.
    ///
    /// The call checks the instance cap of the kind (one for every kind except UE, which allows
    /// two), allocates a fresh address and port, persists the NF in `Starting` state, and
    /// schedules its promotion to `Stable`. Kinds with a companion (UDR and UPF) also get their
    /// companion created in the same subnet. Returns the id of the new NF.
    pub fn add_nf(
        &mut self,
        kind: NfKind,
        position: Option<(f64, f64)>,
    ) -> Result<NfId, NetworkError> {
        let cap = kind.instance_cap();
        if self.store.count_of_kind(kind) >= cap {
            return Err(if cap > 1 {
                NetworkError::CapacityExceeded(kind)
            } else {
                NetworkError::SingletonViolation(kind)
            });
        }

        let addr = alloc::allocate_address(&self.store);
        let id = self.spawn_nf(kind, addr, position);

        if let Some(companion) = rules::companion_kind(kind) {
            if self.store.count_of_kind(companion) < companion.instance_cap() {
                let subnet = self.store.nf_or_err(id)?.subnet();
                let companion_addr = alloc::allocate_address_in_subnet(&self.store, subnet);
                self.spawn_nf(companion, companion_addr, None);
            }
        }

        self.do_queue_maybe_skip()?;
        Ok(id)
    }

    /// Persist a single NF with the given address and schedule its promotion.
    fn spawn_nf(&mut self, kind: NfKind, addr: Ipv4Addr, position: Option<(f64, f64)>) -> NfId {
        let id = self.store.next_nf_id();
        let port = alloc::allocate_port(&self.store);
        let mut nf = NetworkFunction::new(id, kind, addr, port);
        nf.position = position;
        nf.set_status(NfStatus::Starting, self.sim_time());
        debug!("add {} ({}) at {}:{}", nf.name(), id, addr, port);
        self.store.insert_nf(nf);
        self.schedule(Event::Stabilize(Q::Priority::default(), id));
        id
    }

    /// Remove the NF from the topology.
    ///
    /// Emits the pre-removal notification, cancels the NF's pending events, deletes all
    /// connections and bus memberships referencing it, and deletes the NF itself. Removing a UDR
    /// cascades to its DB companion, removing a UPF cascades to its DN companion and tears down
    /// every PDU session served by it.
    pub fn remove_nf(&mut self, id: NfId) -> Result<(), NetworkError> {
        self.store.nf_or_err(id)?;
        self.remove_nf_cascading(id);
        Ok(())
    }

    fn remove_nf_cascading(&mut self, id: NfId) {
        let Some(nf) = self.store.nf(id) else { return };
        let kind = nf.kind();
        let subnet = nf.subnet();
        let session_upf = nf.ue().and_then(|cfg| cfg.session.as_ref()).map(|s| s.upf);
        debug!("remove {} ({})", nf.name(), id);

        self.store.notify_removing(id);
        self.cancel_pending(id);

        for conn in self.store.connections_of(id) {
            self.store.remove_connection(conn);
        }
        for bc in self.store.bus_connections_of(id) {
            self.store.remove_bus_connection(bc);
        }

        // a departing UE hands its tunnel binding back to the serving UPF.
        if let Some(upf) = session_upf {
            if let Ok(upf_nf) = self.store.nf_mut_or_err(upf) {
                if let Some(pool) = upf_nf.tunnel_pool_mut() {
                    pool.release(id);
                }
                self.store.notify_updated(upf);
            }
        }

        // a dying UPF takes the sessions it serves with it.
        if kind == NfKind::Upf {
            let ues: Vec<NfId> = self
                .store
                .nfs_of_kind(NfKind::Ue)
                .iter()
                .filter(|ue| ue.ue().and_then(|c| c.session.as_ref()).map(|s| s.upf) == Some(id))
                .map(|ue| ue.id())
                .collect();
            for ue in ues {
                if let Ok(nf) = self.store.nf_mut_or_err(ue) {
                    if let Some(cfg) = nf.ue_mut() {
                        cfg.session = None;
                    }
                }
                self.store.notify_updated(ue);
            }
        }

        self.store.remove_nf(id);
        self.outcomes.remove(&id);

        if let Some(companion) = rules::companion_kind(kind) {
            let victim = self
                .store
                .nfs_of_kind(companion)
                .iter()
                .find(|nf| nf.subnet() == subnet)
                .map(|nf| nf.id());
            if let Some(victim) = victim {
                self.remove_nf_cascading(victim);
            }
        }
    }

    /// Stop the NF: `Stable | Starting -> Stopped`. Pending events of the NF are cancelled. Any
    /// other current status makes the call a no-op.
    pub fn stop_nf(&mut self, id: NfId) -> Result<(), NetworkError> {
        let now = self.sim_time();
        let nf = self.store.nf_mut_or_err(id)?;
        match nf.status() {
            NfStatus::Stable | NfStatus::Starting => {
                nf.set_status(NfStatus::Stopped, now);
                self.cancel_pending(id);
                self.store.notify_updated(id);
            }
            status => debug!("cannot stop {} in status {}", id, status),
        }
        Ok(())
    }

    /// Start a stopped NF: `Stopped -> Starting`, re-scheduling the stability timer. Any other
    /// current status makes the call a no-op.
    pub fn start_nf(&mut self, id: NfId) -> Result<(), NetworkError> {
        let now = self.sim_time();
        let nf = self.store.nf_mut_or_err(id)?;
        match nf.status() {
            NfStatus::Stopped => {
                nf.set_status(NfStatus::Starting, now);
                self.store.notify_updated(id);
                self.schedule(Event::Stabilize(Q::Priority::default(), id));
                self.do_queue_maybe_skip()?;
            }
            status => debug!("cannot start {} in status {}", id, status),
        }
        Ok(())
    }

    /// Apply a partial configuration update to the NF and emit the update notification. Changing
    /// any identity field of a UE resets its `registered` flag, since the new identity has not
    /// been validated yet.
    pub fn update_nf_config(&mut self, id: NfId, patch: NfPatch) -> Result<(), NetworkError> {
        let touches_identity = patch.touches_identity();
        let nf = self.store.nf_mut_or_err(id)?;
        if let Some(name) = patch.name {
            nf.name = name;
        }
        if let Some(position) = patch.position {
            nf.position = Some(position);
        }
        if let Some(cfg) = nf.ue_mut() {
            if let Some(supi) = patch.supi {
                cfg.supi = supi;
            }
            if let Some(key) = patch.key {
                cfg.key = key;
            }
            if let Some(sst) = patch.sst {
                cfg.sst = sst;
            }
            if let Some(sd) = patch.sd {
                cfg.sd = sd;
            }
            if let Some(dnn) = patch.dnn {
                cfg.dnn = dnn;
            }
            if touches_identity {
                cfg.registered = false;
            }
        }
        self.store.notify_updated(id);
        Ok(())
    }

    /// Promote the NF from `Starting` to `Stable`. Fired by the stability timer; a missing NF or
    /// one that is no longer `Starting` degrades to a no-op.
    pub(crate) fn handle_stabilize(&mut self, id: NfId) {
        let now = self.sim_time();
        let Ok(nf) = self.store.nf_mut_or_err(id) else {
            debug!("skip stabilize: {} no longer exists", id);
            return;
        };
        if nf.status() != NfStatus::Starting {
            debug!("skip stabilize: {} is {}", id, nf.status());
            return;
        }
        let kind = nf.kind();
        nf.set_status(NfStatus::Stable, now);
        self.store.notify_updated(id);

        if rules::auto_connect_allowed(kind) {
            self.schedule(Event::AutoConnect(Q::Priority::default(), id));
        }
        if kind == NfKind::Ue {
            self.schedule(Event::Register(Q::Priority::default(), id, 0));
        }
    }
}
