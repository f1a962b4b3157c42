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

//! Subnet locality helpers.
//!
//! Two addresses are "in the same subnet" if their first three octets match, i.e., if they share
//! the same /24. Connections are restricted to same-subnet peers.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

/// Return the /24 subnet containing the given address.
pub fn subnet_of(addr: Ipv4Addr) -> Ipv4Net {
    // the prefix length is constant and valid, so this can never fail.
    Ipv4Net::new(addr, 24).unwrap().trunc()
}

/// Check whether the two addresses share their first three octets.
pub fn same_subnet(a: Ipv4Addr, b: Ipv4Addr) -> bool {
    a.octets()[..3] == b.octets()[..3]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn subnet_locality() {
        let a: Ipv4Addr = "10.10.1.11".parse().unwrap();
        let b: Ipv4Addr = "10.10.1.254".parse().unwrap();
        let c: Ipv4Addr = "10.10.2.11".parse().unwrap();
        assert!(same_subnet(a, b));
        assert!(!same_subnet(a, c));
        assert_eq!(subnet_of(a), "10.10.1.0/24".parse::<Ipv4Net>().unwrap());
        assert!(subnet_of(a).contains(&b));
    }
}
