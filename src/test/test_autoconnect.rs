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

//! Test the auto-connection scheduler.

use pretty_assertions::assert_eq;

use super::insert_stable;
use crate::{
    autoconnect::AutoConnectOutcome,
    network::Network,
    types::NfKind,
};

#[test]
fn amf_auto_connects_to_nrf() {
    let mut net = Network::default();
    let nrf = net.add_nf(NfKind::Nrf, None).unwrap();
    let amf = net.add_nf(NfKind::Amf, None).unwrap();
    assert!(net.are_connected(amf, nrf));
    let conn = net.store().find_connection(amf, nrf).unwrap();
    let conn = net.store().connection(conn).unwrap();
    assert_eq!(conn.interface(), "Nnrf");
    assert!(!conn.manual());
    assert_eq!(
        net.auto_connect_outcome(amf),
        Some(&AutoConnectOutcome::Connected(1))
    );
}

#[test]
fn no_peer_outcome() {
    let mut net = Network::default();
    let amf = net.add_nf(NfKind::Amf, None).unwrap();
    assert_eq!(net.auto_connect_outcome(amf), Some(&AutoConnectOutcome::NoPeer));
}

#[test]
fn blocked_by_subnet_outcome() {
    let mut net = Network::default();
    // the only NRF lives in a subnet the allocator has not reached yet.
    let nrf = insert_stable(&mut net, NfKind::Nrf, "10.10.2.11");
    let amf = net.add_nf(NfKind::Amf, None).unwrap();
    assert!(!net.are_connected(amf, nrf));
    assert_eq!(
        net.auto_connect_outcome(amf),
        Some(&AutoConnectOutcome::BlockedBySubnet)
    );
}

#[test]
fn rerun_next_to_connected_peer_is_not_blocked() {
    let mut net = Network::default();
    let nrf = net.add_nf(NfKind::Nrf, None).unwrap();
    let amf = net.add_nf(NfKind::Amf, None).unwrap();
    assert!(net.are_connected(amf, nrf));
    // restarting the AMF runs auto-connection again; the only NRF is same-subnet and already
    // connected, which is not a subnet-locality problem.
    net.stop_nf(amf).unwrap();
    net.start_nf(amf).unwrap();
    assert!(net.are_connected(amf, nrf));
    assert_eq!(net.auto_connect_outcome(amf), Some(&AutoConnectOutcome::NoPeer));
}

#[test]
fn nrf_never_initiates() {
    let mut net = Network::default();
    let amf = net.add_nf(NfKind::Amf, None).unwrap();
    let nrf = net.add_nf(NfKind::Nrf, None).unwrap();
    // the NRF is not allow-listed; the AMF already ran before the NRF existed.
    assert_eq!(net.auto_connect_outcome(nrf), None);
    assert!(!net.are_connected(amf, nrf));
}

#[test]
fn ue_is_a_pure_consumer() {
    let mut net = Network::default();
    let amf = net.add_nf(NfKind::Amf, None).unwrap();
    let gnb = net.add_nf(NfKind::Gnb, None).unwrap();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    assert!(net.are_connected(ue, gnb));
    assert!(!net.are_connected(ue, amf));
    assert_eq!(
        net.auto_connect_outcome(ue),
        Some(&AutoConnectOutcome::Connected(1))
    );
}

#[test]
fn gnb_seeks_amf_and_upf() {
    let mut net = Network::default();
    let amf = net.add_nf(NfKind::Amf, None).unwrap();
    let upf = net.add_nf(NfKind::Upf, None).unwrap();
    let gnb = net.add_nf(NfKind::Gnb, None).unwrap();
    assert!(net.are_connected(gnb, amf));
    assert!(net.are_connected(gnb, upf));
    assert_eq!(
        net.auto_connect_outcome(gnb),
        Some(&AutoConnectOutcome::Connected(2))
    );
}

#[test]
fn upf_auto_connects_to_its_dn() {
    let mut net = Network::default();
    let upf = net.add_nf(NfKind::Upf, None).unwrap();
    let dn = net.store().nfs_of_kind(NfKind::Dn)[0].id();
    assert!(net.are_connected(upf, dn));
    // the auto-created data-path link constructed the tunnel pool.
    assert!(net.nf(upf).unwrap().tunnel_pool().is_some());
}
