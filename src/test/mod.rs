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

//! Module for testing the engine.

use crate::{
    event::EventQueue,
    network::Network,
    nf::NetworkFunction,
    types::{NfId, NfKind, NfStatus},
};

/// Insert an already-stable NF with a hand-picked address, bypassing the lifecycle. Used to
/// place NFs into specific subnets, which the allocator would only do after exhausting the
/// earlier candidate subnets.
fn insert_stable<Q: EventQueue>(net: &mut Network<Q>, kind: NfKind, addr: &str) -> NfId {
    let id = net.store.next_nf_id();
    let port = crate::alloc::allocate_port(&net.store);
    let mut nf = NetworkFunction::new(id, kind, addr.parse().unwrap(), port);
    nf.set_status(NfStatus::Stable, 0);
    net.store.insert_nf(nf);
    id
}

mod test_alloc;
mod test_autoconnect;
mod test_connection;
mod test_save_restore;
mod test_session;
