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

//! Test the resource allocator.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use pretty_assertions::assert_eq;

use crate::{
    alloc::{allocate_address, allocate_address_in_subnet, allocate_port, PORT_RANGE},
    network::Network,
    nf::NetworkFunction,
    store::EntityStore,
    types::NfKind,
};

#[test]
fn first_allocation_skips_reserved_range() {
    let mut net = Network::default();
    let nrf = net.add_nf(NfKind::Nrf, None).unwrap();
    let nf = net.nf(nrf).unwrap();
    assert_eq!(nf.addr(), Ipv4Addr::new(10, 10, 1, 11));
    assert_eq!(nf.port(), *PORT_RANGE.start());
}

#[test]
fn sequential_allocation_is_unique() {
    let mut net = Network::default();
    for kind in NfKind::ALL {
        // companions occupy their singleton slot, so some creations fail. That is fine; the
        // property under test is uniqueness among those that succeed.
        let _ = net.add_nf(kind, None);
    }
    let addrs: HashSet<Ipv4Addr> = net.store().nfs().map(|nf| nf.addr()).collect();
    let ports: HashSet<u16> = net.store().nfs().map(|nf| nf.port()).collect();
    assert_eq!(addrs.len(), net.num_nfs());
    assert_eq!(ports.len(), net.num_nfs());
}

#[test]
fn subnets_are_probed_in_order() {
    let mut store = EntityStore::new();
    // occupy every allocatable host of the first candidate subnet.
    let subnet: ipnet::Ipv4Net = "10.10.1.0/24".parse().unwrap();
    for host in subnet.hosts().skip(10) {
        let id = store.next_nf_id();
        store.insert_nf(NetworkFunction::new(id, NfKind::Dn, host, 9000));
    }
    assert_eq!(allocate_address(&store), Ipv4Addr::new(10, 10, 2, 11));
}

#[test]
fn allocation_in_subnet_colocates() {
    let store = EntityStore::new();
    let subnet: ipnet::Ipv4Net = "10.10.3.0/24".parse().unwrap();
    assert_eq!(
        allocate_address_in_subnet(&store, subnet),
        Ipv4Addr::new(10, 10, 3, 11)
    );
}

#[test]
fn ports_are_allocated_in_order() {
    let mut store = EntityStore::new();
    assert_eq!(allocate_port(&store), 8000);
    let id = store.next_nf_id();
    store.insert_nf(NetworkFunction::new(
        id,
        NfKind::Nrf,
        Ipv4Addr::new(10, 10, 1, 11),
        8000,
    ));
    assert_eq!(allocate_port(&store), 8001);
}
