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

//! # Resource Allocator
//!
//! Produces collision-free addresses and ports given the current entity store contents.
//!
//! Addresses are drawn from an ordered list of candidate subnets; within each subnet, host
//! suffixes are probed in ascending order starting above the reserved range, skipping any
//! already held by a live NF. If every candidate subnet is exhausted, a pseudo-random address
//! is produced as a best-effort fallback. The fallback can theoretically collide; it is a
//! non-fatal degraded path, not an error. Ports work the same way over a fixed numeric range.

use std::{net::Ipv4Addr, ops::RangeInclusive};

use ipnet::Ipv4Net;
use lazy_static::lazy_static;
use log::warn;
use rand::prelude::*;

use crate::store::EntityStore;

/// Host suffixes up to (and including) this value are reserved and never allocated.
pub const RESERVED_HOSTS: usize = 10;

/// The fixed numeric range ports are allocated from.
pub const PORT_RANGE: RangeInclusive<u16> = 8000..=8255;

lazy_static! {
    /// The ordered list of candidate subnets addresses are drawn from.
    pub static ref CANDIDATE_SUBNETS: Vec<Ipv4Net> = vec![
        "10.10.1.0/24".parse().unwrap(),
        "10.10.2.0/24".parse().unwrap(),
        "10.10.3.0/24".parse().unwrap(),
        "10.10.4.0/24".parse().unwrap(),
    ];
}

/// Allocate an address not held by any live NF, probing the candidate subnets in order.
pub fn allocate_address(store: &EntityStore) -> Ipv4Addr {
    for subnet in CANDIDATE_SUBNETS.iter() {
        if let Some(addr) = probe_subnet(store, *subnet) {
            return addr;
        }
    }
    warn!("all candidate subnets are exhausted, falling back to a random address");
    let subnet = CANDIDATE_SUBNETS
        .choose(&mut thread_rng())
        .copied()
        .unwrap_or_else(|| "10.10.1.0/24".parse().unwrap());
    random_host(subnet)
}

/// Allocate an address inside the given subnet, co-locating a dependent resource with its
/// parent. Falls back to a random host of the subnet when it is exhausted.
pub fn allocate_address_in_subnet(store: &EntityStore, subnet: Ipv4Net) -> Ipv4Addr {
    if let Some(addr) = probe_subnet(store, subnet) {
        return addr;
    }
    warn!("subnet {subnet} is exhausted, falling back to a random address");
    random_host(subnet)
}

/// Allocate a port not held by any live NF. Falls back to a random ephemeral port when the
/// range is exhausted.
pub fn allocate_port(store: &EntityStore) -> u16 {
    if let Some(port) = PORT_RANGE.clone().find(|p| !store.port_in_use(*p)) {
        return port;
    }
    warn!("the port range is exhausted, falling back to a random port");
    thread_rng().gen_range(49152..=u16::MAX)
}

/// Probe the host suffixes of the subnet in ascending order, starting above the reserved range.
fn probe_subnet(store: &EntityStore, subnet: Ipv4Net) -> Option<Ipv4Addr> {
    subnet
        .hosts()
        .skip(RESERVED_HOSTS)
        .find(|host| !store.addr_in_use(*host))
}

fn random_host(subnet: Ipv4Net) -> Ipv4Addr {
    let mut octets = subnet.network().octets();
    octets[3] = thread_rng().gen_range(RESERVED_HOSTS as u8 + 1..=254);
    Ipv4Addr::from(octets)
}
