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

//! Test the session and tunnel allocator, and the registration retry loop.

use std::net::Ipv4Addr;

use pretty_assertions::assert_eq;

use crate::{
    interactive::InteractiveNetwork,
    network::Network,
    nf::{NfPayload, TunnelPool},
    subscriber::Subscriber,
    types::{NetworkError, NfKind, ResourceKind},
};

#[test]
fn assign_is_idempotent_per_consumer() {
    let mut net = Network::default();
    let upf = net.add_nf(NfKind::Upf, None).unwrap();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    let first = net.assign_tunnel_address(upf, ue).unwrap();
    let second = net.assign_tunnel_address(upf, ue).unwrap();
    assert_eq!(first, second);
}

#[test]
fn assign_skips_the_gateway() {
    let mut net = Network::default();
    let upf = net.add_nf(NfKind::Upf, None).unwrap();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    let addr = net.assign_tunnel_address(upf, ue).unwrap();
    assert_eq!(addr, Ipv4Addr::new(10, 45, 0, 2));
}

#[test]
fn pool_exhaustion_is_terminal() {
    let mut net = Network::default();
    let upf = net.add_nf(NfKind::Upf, None).unwrap();
    let ue1 = net.add_nf(NfKind::Ue, None).unwrap();
    let ue2 = net.add_nf(NfKind::Ue, None).unwrap();
    // shrink the pool to a single assignable address (the other host is the gateway).
    net.store.nf_mut_or_err(upf).unwrap().payload = NfPayload::Upf {
        pool: Some(TunnelPool::with_range(
            Ipv4Addr::new(10, 45, 0, 1),
            "10.45.0.0/30".parse().unwrap(),
        )),
    };
    assert_eq!(
        net.assign_tunnel_address(upf, ue1),
        Ok(Ipv4Addr::new(10, 45, 0, 2))
    );
    assert_eq!(
        net.assign_tunnel_address(upf, ue2),
        Err(NetworkError::ResourceExhausted(ResourceKind::TunnelPool))
    );
    // the error is deterministic on re-invocation.
    assert_eq!(
        net.assign_tunnel_address(upf, ue2),
        Err(NetworkError::ResourceExhausted(ResourceKind::TunnelPool))
    );
}

#[test]
fn removing_a_ue_releases_its_tunnel_binding() {
    let mut net = Network::default();
    let upf = net.add_nf(NfKind::Upf, None).unwrap();
    net.add_nf(NfKind::Gnb, None).unwrap();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    net.add_subscriber(Subscriber::for_ue(net.nf(ue).unwrap().ue().unwrap()));
    net.establish_pdu_session(ue, None).unwrap();
    assert!(net.nf(upf).unwrap().tunnel_pool().unwrap().binding_of(ue).is_some());

    net.remove_nf(ue).unwrap();
    assert_eq!(net.nf(upf).unwrap().tunnel_pool().unwrap().binding_of(ue), None);
}

#[test]
fn registration_succeeds_once_directory_is_populated() {
    let mut net = Network::default();
    net.add_nf(NfKind::Upf, None).unwrap();
    net.add_nf(NfKind::Gnb, None).unwrap();

    net.manual_simulation();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    // the directory is populated while the UE is still starting; the scheduled registration
    // attempt then goes through without manual intervention.
    net.add_subscriber(Subscriber::for_ue(net.nf(ue).unwrap().ue().unwrap()));
    net.auto_simulation();
    net.simulate().unwrap();

    let cfg = net.nf(ue).unwrap().ue().unwrap();
    assert!(cfg.registered);
    assert!(cfg.session.is_some());
}

#[test]
fn registration_gives_up_on_empty_directory() {
    let mut net = Network::default();
    net.add_nf(NfKind::Upf, None).unwrap();
    net.add_nf(NfKind::Gnb, None).unwrap();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    // all retry attempts ran against an empty directory.
    assert!(!net.nf(ue).unwrap().ue().unwrap().registered);
    assert_eq!(net.nf(ue).unwrap().ue().unwrap().session, None);
}

#[test]
fn establish_is_a_noop_on_existing_session() {
    let mut net = Network::default();
    net.add_nf(NfKind::Upf, None).unwrap();
    net.add_nf(NfKind::Gnb, None).unwrap();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    net.add_subscriber(Subscriber::for_ue(net.nf(ue).unwrap().ue().unwrap()));
    let first = net.establish_pdu_session(ue, None).unwrap();
    let second = net.establish_pdu_session(ue, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn identity_not_found() {
    let mut net = Network::default();
    net.add_nf(NfKind::Upf, None).unwrap();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    net.add_subscriber(Subscriber {
        supi: "imsi-901700000099999".to_string(),
        key: crate::nf::UeConfig::DEFAULT_KEY.to_string(),
        sst: 1,
        sd: None,
        dnn: "internet".to_string(),
    });
    let supi = net.nf(ue).unwrap().ue().unwrap().supi.clone();
    assert_eq!(
        net.establish_pdu_session(ue, None),
        Err(NetworkError::IdentityNotFound(supi))
    );
}

#[test]
fn identity_mismatch_on_conflicting_attributes() {
    let mut net = Network::default();
    net.add_nf(NfKind::Upf, None).unwrap();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    let mut sub = Subscriber::for_ue(net.nf(ue).unwrap().ue().unwrap());
    sub.dnn = "ims".to_string();
    net.add_subscriber(sub);
    let supi = net.nf(ue).unwrap().ue().unwrap().supi.clone();
    assert_eq!(
        net.establish_pdu_session(ue, None),
        Err(NetworkError::IdentityMismatch(
            supi,
            "data network does not match".to_string()
        ))
    );
}

#[test]
fn empty_directory_is_an_allocation_race() {
    let mut net = Network::default();
    net.add_nf(NfKind::Upf, None).unwrap();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    assert_eq!(
        net.establish_pdu_session(ue, None),
        Err(NetworkError::AllocationRace)
    );
}

#[test]
fn upf_not_found_without_same_subnet_upf() {
    let mut net = Network::default();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    net.add_subscriber(Subscriber::for_ue(net.nf(ue).unwrap().ue().unwrap()));
    assert_eq!(
        net.establish_pdu_session(ue, None),
        Err(NetworkError::UpfNotFound(ue))
    );
}
