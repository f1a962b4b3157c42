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

//! Test the connection validator: the validation order, interface resolution, and the tunnel
//! pool side effect.

use pretty_assertions::assert_eq;

use super::insert_stable;
use crate::{
    network::Network,
    rules::FALLBACK_INTERFACE,
    types::{NetworkError, NfKind},
};

#[test]
fn self_connection() {
    let mut net = Network::default();
    let amf = insert_stable(&mut net, NfKind::Amf, "10.10.1.11");
    assert_eq!(
        net.add_connection(amf, amf, true),
        Err(NetworkError::SelfConnection(amf))
    );
}

#[test]
fn duplicate_connection_is_unordered() {
    let mut net = Network::default();
    let amf = insert_stable(&mut net, NfKind::Amf, "10.10.1.11");
    let nrf = insert_stable(&mut net, NfKind::Nrf, "10.10.1.12");
    net.add_connection(amf, nrf, true).unwrap();
    assert_eq!(
        net.add_connection(nrf, amf, true),
        Err(NetworkError::DuplicateConnection(nrf, amf))
    );
    assert_eq!(net.store().num_connections(), 1);
}

#[test]
fn subnet_mismatch_beats_adjacency() {
    let mut net = Network::default();
    let amf = insert_stable(&mut net, NfKind::Amf, "10.10.1.11");
    let ue = insert_stable(&mut net, NfKind::Ue, "10.10.2.11");
    // UE and AMF are not adjacent either, but the subnet check comes first.
    assert_eq!(
        net.add_connection(ue, amf, true),
        Err(NetworkError::SubnetMismatch(ue, amf))
    );
}

#[test]
fn invalid_adjacency() {
    let mut net = Network::default();
    let amf = insert_stable(&mut net, NfKind::Amf, "10.10.1.11");
    let ue = insert_stable(&mut net, NfKind::Ue, "10.10.1.12");
    assert_eq!(
        net.add_connection(ue, amf, true),
        Err(NetworkError::InvalidAdjacency(NfKind::Ue, NfKind::Amf))
    );
}

#[test]
fn missing_endpoint() {
    let mut net = Network::default();
    let amf = insert_stable(&mut net, NfKind::Amf, "10.10.1.11");
    let ghost = insert_stable(&mut net, NfKind::Nrf, "10.10.1.12");
    net.remove_nf(ghost).unwrap();
    assert_eq!(
        net.add_connection(amf, ghost, true),
        Err(NetworkError::NfNotFound(ghost))
    );
}

#[test]
fn interface_is_resolved_once() {
    let mut net = Network::default();
    let gnb = insert_stable(&mut net, NfKind::Gnb, "10.10.1.11");
    let amf = insert_stable(&mut net, NfKind::Amf, "10.10.1.12");
    let conn = net.add_connection(gnb, amf, true).unwrap();
    assert_eq!(net.store().connection(conn).unwrap().interface(), "N2");
}

#[test]
fn unknown_pair_gets_fallback_interface() {
    let mut net = Network::default();
    let udr = insert_stable(&mut net, NfKind::Udr, "10.10.1.11");
    let db = insert_stable(&mut net, NfKind::Db, "10.10.1.12");
    let conn = net.add_connection(udr, db, true).unwrap();
    assert_eq!(
        net.store().connection(conn).unwrap().interface(),
        FALLBACK_INTERFACE
    );
}

#[test]
fn upf_dn_link_constructs_tunnel_pool() {
    let mut net = Network::default();
    let upf = insert_stable(&mut net, NfKind::Upf, "10.10.1.11");
    let dn = insert_stable(&mut net, NfKind::Dn, "10.10.1.12");
    assert!(net.nf(upf).unwrap().tunnel_pool().is_none());
    net.add_connection(dn, upf, true).unwrap();
    let pool = net.nf(upf).unwrap().tunnel_pool().unwrap();
    assert_eq!(pool.range(), "10.45.0.0/24".parse().unwrap());
}

#[test]
fn remove_connection() {
    let mut net = Network::default();
    let amf = insert_stable(&mut net, NfKind::Amf, "10.10.1.11");
    let nrf = insert_stable(&mut net, NfKind::Nrf, "10.10.1.12");
    let conn = net.add_connection(amf, nrf, true).unwrap();
    net.remove_connection(conn).unwrap();
    assert_eq!(net.store().num_connections(), 0);
    assert!(!net.are_connected(amf, nrf));
    assert_eq!(
        net.remove_connection(conn),
        Err(NetworkError::ConnectionNotFound(conn))
    );
}

#[test]
fn connected_via_shared_bus() {
    let mut net = Network::default();
    let amf = insert_stable(&mut net, NfKind::Amf, "10.10.1.11");
    let nrf = insert_stable(&mut net, NfKind::Nrf, "10.10.1.12");
    assert!(!net.are_connected(amf, nrf));
    let bus = net.add_bus("sbi", None);
    net.join_bus(amf, bus).unwrap();
    net.join_bus(nrf, bus).unwrap();
    assert!(net.are_connected(amf, nrf));
    net.leave_bus(nrf, bus).unwrap();
    assert!(!net.are_connected(amf, nrf));
}
