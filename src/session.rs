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

//! # Session and Tunnel Allocator
//!
//! Issues tunnel addresses from UPF pools and establishes PDU sessions for identity-validated
//! UEs. Registration is also driven asynchronously: a UE schedules a registration attempt at
//! promotion, and retries with increasing backoff while the subscriber directory is still
//! unpopulated.

use std::net::Ipv4Addr;

use log::{debug, warn};

use crate::{
    event::{Event, EventQueue},
    network::Network,
    nf::PduSession,
    types::{NetworkError, NfId, NfKind, NfStatus},
};

/// The number of scheduled registration attempts before a UE gives up on the subscriber
/// directory ever being populated.
pub const MAX_REGISTER_ATTEMPTS: u8 = 4;

impl<Q: EventQueue> Network<Q> {
    /// Issue a tunnel address from the UPF's pool to the consumer.
    ///
    /// If the consumer already holds a binding, the identical address is returned again. The
    /// pool is constructed lazily if absent. Pool exhaustion is a terminal
    /// [`NetworkError::ResourceExhausted`] with no fallback.
    pub fn assign_tunnel_address(
        &mut self,
        upf: NfId,
        consumer: NfId,
    ) -> Result<Ipv4Addr, NetworkError> {
        self.store.nf_or_err(upf)?;
        self.ensure_tunnel_pool(upf);
        let nf = self.store.nf_mut_or_err(upf)?;
        let Some(pool) = nf.tunnel_pool_mut() else {
            return Err(NetworkError::UpfNotFound(consumer));
        };
        let addr = pool.assign(consumer)?;
        self.store.notify_updated(upf);
        Ok(addr)
    }

    /// Establish a PDU session for the UE.
    ///
    /// Requires the UE's configured identity to match a subscriber record, including the slice
    /// and data-network attributes. If no UPF is given, the same-subnet stable UPF with the
    /// lowest id is selected; none available is [`NetworkError::UpfNotFound`]. Re-invocation on
    /// a UE that already holds a session is a no-op success returning the existing session.
    pub fn establish_pdu_session(
        &mut self,
        ue: NfId,
        upf: Option<NfId>,
    ) -> Result<PduSession, NetworkError> {
        let nf = self.store.nf_or_err(ue)?;
        let Some(cfg) = nf.ue() else {
            return Err(NetworkError::NfNotFound(ue));
        };
        if let Some(session) = &cfg.session {
            return Ok(session.clone());
        }
        let subnet = nf.subnet();

        self.validate_identity(ue)?;

        let upf = match upf {
            Some(upf) => {
                let nf = self.store.nf_or_err(upf)?;
                if nf.kind() != NfKind::Upf {
                    return Err(NetworkError::UpfNotFound(ue));
                }
                upf
            }
            None => self
                .store
                .nfs_of_kind(NfKind::Upf)
                .iter()
                .find(|nf| nf.status() == NfStatus::Stable && nf.subnet() == subnet)
                .map(|nf| nf.id())
                .ok_or(NetworkError::UpfNotFound(ue))?,
        };

        let addr = self.assign_tunnel_address(upf, ue)?;
        let session = PduSession {
            upf,
            addr,
            established: self.sim_time(),
        };

        let nf = self.store.nf_mut_or_err(ue)?;
        if let Some(cfg) = nf.ue_mut() {
            cfg.session = Some(session.clone());
        }
        self.store.notify_updated(ue);
        debug!("established PDU session for {} on {} ({})", ue, upf, addr);
        Ok(session)
    }

    /// Attempt a scheduled registration of the UE. Fired at promotion and on every backoff
    /// retry. A missing, non-stable, or already-registered UE degrades to a no-op; an
    /// unpopulated subscriber directory re-schedules the attempt until the attempt budget is
    /// spent.
    pub(crate) fn handle_register(&mut self, id: NfId, attempt: u8) {
        let Some(nf) = self.store.nf(id) else {
            debug!("skip register: {} no longer exists", id);
            return;
        };
        if nf.status() != NfStatus::Stable {
            debug!("skip register: {} is {}", id, nf.status());
            return;
        }
        if nf.ue().map(|cfg| cfg.session.is_some()).unwrap_or(true) {
            return;
        }

        match self.establish_pdu_session(id, None) {
            Ok(session) => debug!("{} registered with tunnel address {}", id, session.addr),
            Err(NetworkError::AllocationRace) => {
                if attempt + 1 < MAX_REGISTER_ATTEMPTS {
                    self.schedule(Event::Register(Q::Priority::default(), id, attempt + 1));
                } else {
                    warn!("{} gave up registering: subscriber directory stayed empty", id);
                }
            }
            Err(e) => debug!("registration of {} failed: {}", id, e),
        }
    }
}
