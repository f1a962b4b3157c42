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

//! # Auto-Connection Scheduler
//!
//! Runs once per NF promotion, for allow-listed kinds only, after a randomized secondary delay.
//! For each kind in the NF's ordered target list, the first stable same-subnet peer of that kind
//! not already connected gets a connection. UE and UPF are pure consumers: they seek exactly one
//! target kind (gNB and DN respectively) and nothing else.

use log::debug;

use crate::{
    event::EventQueue,
    network::Network,
    rules,
    types::{NfId, NfKind, NfStatus},
};

/// The recorded result of an auto-connection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoConnectOutcome {
    /// The run created this many connections.
    Connected(usize),
    /// No connection was made, and at least one wanted kind has peers only in other subnets.
    BlockedBySubnet,
    /// No connection was made, and no wanted kind was blocked by subnet locality. Covers both a
    /// missing peer and a same-subnet peer that is already connected or not yet stable.
    NoPeer,
}

impl<Q: EventQueue> Network<Q> {
    /// Let the NF seek automatic connections. Fired once after promotion; a missing or
    /// no-longer-stable NF degrades to a no-op.
    pub(crate) fn handle_auto_connect(&mut self, id: NfId) {
        let Some(nf) = self.store.nf(id) else {
            debug!("skip auto-connect: {} no longer exists", id);
            return;
        };
        if nf.status() != NfStatus::Stable {
            debug!("skip auto-connect: {} is {}", id, nf.status());
            return;
        }
        let kind = nf.kind();
        let subnet = nf.subnet();

        let targets: Vec<NfKind> = match rules::sole_target(kind) {
            Some(target) => vec![target],
            None => rules::auto_targets(kind).to_vec(),
        };

        let mut connected = 0;
        let mut blocked = false;
        for target in targets {
            let (candidate, target_blocked) = {
                let peers = self.store.nfs_of_kind(target);
                let candidate = peers
                    .iter()
                    .find(|peer| {
                        peer.status() == NfStatus::Stable
                            && peer.subnet() == subnet
                            && self.store.find_connection(id, peer.id()).is_none()
                    })
                    .map(|peer| peer.id());
                // a target kind is subnet-blocked only if all of its peers live elsewhere.
                let target_blocked = candidate.is_none()
                    && !peers.is_empty()
                    && peers.iter().all(|peer| peer.subnet() != subnet);
                (candidate, target_blocked)
            };
            blocked |= target_blocked;
            let Some(peer) = candidate else { continue };
            match self.add_connection(id, peer, false) {
                Ok(conn) => {
                    debug!("auto-connect {} -> {} ({})", id, peer, conn);
                    connected += 1;
                }
                Err(e) => debug!("auto-connect {} -> {} failed: {}", id, peer, e),
            }
        }

        let outcome = if connected > 0 {
            AutoConnectOutcome::Connected(connected)
        } else if blocked {
            AutoConnectOutcome::BlockedBySubnet
        } else {
            AutoConnectOutcome::NoPeer
        };
        self.outcomes.insert(id, outcome);
    }
}
