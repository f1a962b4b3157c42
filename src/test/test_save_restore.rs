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

//! Test the snapshot export and import.

use pretty_assertions::assert_eq;

use crate::{
    event::{BasicEventQueue, EventQueue},
    interactive::InteractiveNetwork,
    network::Network,
    subscriber::Subscriber,
    types::{NetworkError, NfKind},
};

fn get_net() -> Network {
    let mut net = Network::default();
    net.add_nf(NfKind::Nrf, None).unwrap();
    net.add_nf(NfKind::Amf, None).unwrap();
    net.add_nf(NfKind::Upf, None).unwrap();
    let gnb = net.add_nf(NfKind::Gnb, None).unwrap();
    let ue = net.add_nf(NfKind::Ue, None).unwrap();
    net.add_subscriber(Subscriber::for_ue(net.nf(ue).unwrap().ue().unwrap()));
    net.establish_pdu_session(ue, None).unwrap();
    let bus = net.add_bus("sbi", None);
    net.join_bus(gnb, bus).unwrap();
    net
}

#[test]
fn round_trip_preserves_entities() {
    let net = get_net();
    let snapshot = net.snapshot();
    let restored = Network::from_snapshot(snapshot.clone(), BasicEventQueue::new()).unwrap();
    assert_eq!(restored.snapshot(), snapshot);
    assert_eq!(restored.num_nfs(), net.num_nfs());
    assert_eq!(
        restored.store().num_connections(),
        net.store().num_connections()
    );
}

#[test]
fn restore_emits_no_events_and_schedules_nothing() {
    let net = get_net();
    let mut restored =
        Network::from_snapshot(net.snapshot(), BasicEventQueue::new()).unwrap();
    assert_eq!(restored.take_events(), vec![]);
    assert_eq!(restored.queue().len(), 0);
}

#[test]
fn restored_ids_continue_above_the_snapshot() {
    let net = get_net();
    let max_id = net.store().nfs().map(|nf| nf.id()).max().unwrap();
    let mut restored = Network::from_snapshot(net.snapshot(), BasicEventQueue::new()).unwrap();
    // the UE slot still has room for a second instance.
    let new = restored.add_nf(NfKind::Ue, None).unwrap();
    assert!(new > max_id);
}

#[test]
fn json_round_trip() {
    let net = get_net();
    let snapshot = net.snapshot();
    let json = snapshot.to_json().unwrap();
    let parsed = crate::export::NetSnapshot::from_json(&json).unwrap();
    assert_eq!(parsed, snapshot);
}

#[test]
fn unsupported_schema_version() {
    let net = get_net();
    let mut snapshot = net.snapshot();
    snapshot.schema_version = 99;
    assert_eq!(
        Network::from_snapshot(snapshot, BasicEventQueue::new()).err(),
        Some(NetworkError::UnsupportedSnapshot(99))
    );
}
