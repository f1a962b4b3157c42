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

//! # Connection rule tables
//!
//! The immutable rule tables of the engine, built once at startup and keyed by [`NfKind`]
//! (pairs): the type-adjacency graph, the reference-point (interface) names, the per-kind
//! auto-connection target lists, the auto-connection allow-list, and the companion pairs. They
//! follow the 3GPP service-based reference architecture closely enough to be recognizable, but
//! make no claim of completeness.

use std::collections::HashMap;

use lazy_static::lazy_static;
use maplit::hashmap;

use crate::types::NfKind::{self, *};

/// The interface label stored on a connection whose type pair is missing from the reference
/// table.
pub const FALLBACK_INTERFACE: &str = "P2P";

lazy_static! {
    /// Directed type-adjacency declarations. A pair is connectable if either direction declares
    /// the other, so the relation is effectively symmetric.
    static ref ADJACENCY: HashMap<NfKind, Vec<NfKind>> = hashmap! {
        Ue => vec![Gnb],
        Gnb => vec![Amf, Upf],
        Amf => vec![Nrf, Smf, Ausf, Udm, Pcf, Nssf],
        Smf => vec![Nrf, Upf, Udm, Pcf],
        Upf => vec![Dn],
        Ausf => vec![Nrf, Udm],
        Udm => vec![Nrf, Udr],
        Udr => vec![Nrf, Db],
        Pcf => vec![Nrf, Udr],
        Nssf => vec![Nrf],
        Nrf => vec![],
        Dn => vec![],
        Db => vec![],
    };

    /// Reference-point names, keyed by unordered type pair (stored in both orders is not
    /// necessary; lookups try both).
    static ref INTERFACES: HashMap<(NfKind, NfKind), &'static str> = hashmap! {
        (Ue, Gnb) => "Uu",
        (Gnb, Amf) => "N2",
        (Gnb, Upf) => "N3",
        (Smf, Upf) => "N4",
        (Upf, Dn) => "N6",
        (Smf, Pcf) => "N7",
        (Amf, Udm) => "N8",
        (Smf, Udm) => "N10",
        (Amf, Smf) => "N11",
        (Amf, Ausf) => "N12",
        (Ausf, Udm) => "N13",
        (Amf, Pcf) => "N15",
        (Amf, Nssf) => "N22",
        (Udm, Udr) => "N35",
        (Pcf, Udr) => "N36",
        (Amf, Nrf) => "Nnrf",
        (Smf, Nrf) => "Nnrf",
        (Ausf, Nrf) => "Nnrf",
        (Udm, Nrf) => "Nnrf",
        (Udr, Nrf) => "Nnrf",
        (Pcf, Nrf) => "Nnrf",
        (Nssf, Nrf) => "Nnrf",
    };

    /// Ordered auto-connection target lists for the generic multi-target loop. [`Ue`] and
    /// [`Upf`] are handled by the pure-consumer special case and do not appear here.
    static ref AUTO_TARGETS: HashMap<NfKind, Vec<NfKind>> = hashmap! {
        Amf => vec![Nrf, Ausf, Udm, Pcf, Nssf, Smf],
        Smf => vec![Nrf, Upf, Udm, Pcf],
        Ausf => vec![Nrf, Udm],
        Udm => vec![Nrf, Udr],
        Udr => vec![Nrf, Db],
        Pcf => vec![Nrf, Udr],
        Nssf => vec![Nrf],
        Gnb => vec![Amf, Upf],
    };
}

/// Check the type-adjacency rule for the pair, in both directions.
pub fn adjacent(a: NfKind, b: NfKind) -> bool {
    ADJACENCY.get(&a).map(|t| t.contains(&b)).unwrap_or(false)
        || ADJACENCY.get(&b).map(|t| t.contains(&a)).unwrap_or(false)
}

/// Resolve the interface name for the pair, falling back to [`FALLBACK_INTERFACE`] when the
/// pair is missing from the reference table.
pub fn interface_name(a: NfKind, b: NfKind) -> &'static str {
    INTERFACES
        .get(&(a, b))
        .or_else(|| INTERFACES.get(&(b, a)))
        .copied()
        .unwrap_or(FALLBACK_INTERFACE)
}

/// The ordered list of target kinds the given kind auto-seeks once stable. Empty for kinds that
/// never initiate connections (NRF, DN, DB) and for the pure consumers.
pub fn auto_targets(kind: NfKind) -> &'static [NfKind] {
    AUTO_TARGETS.get(&kind).map(|t| t.as_slice()).unwrap_or(&[])
}

/// The single target of a pure-consumer kind, overriding the generic multi-target loop.
pub fn sole_target(kind: NfKind) -> Option<NfKind> {
    match kind {
        NfKind::Ue => Some(NfKind::Gnb),
        NfKind::Upf => Some(NfKind::Dn),
        _ => None,
    }
}

/// Check whether the kind is scheduled for auto-connection after its promotion.
pub fn auto_connect_allowed(kind: NfKind) -> bool {
    sole_target(kind).is_some() || AUTO_TARGETS.contains_key(&kind)
}

/// The companion kind created alongside (and removed together with) the given kind, co-located
/// in the same subnet.
pub fn companion_kind(kind: NfKind) -> Option<NfKind> {
    match kind {
        NfKind::Udr => Some(NfKind::Db),
        NfKind::Upf => Some(NfKind::Dn),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn adjacency_is_symmetric() {
        for a in NfKind::ALL {
            for b in NfKind::ALL {
                assert_eq!(adjacent(a, b), adjacent(b, a));
            }
        }
    }

    #[test]
    fn interface_lookup_ignores_order() {
        assert_eq!(interface_name(Amf, Gnb), "N2");
        assert_eq!(interface_name(Gnb, Amf), "N2");
        assert_eq!(interface_name(Udr, Db), FALLBACK_INTERFACE);
    }

    #[test]
    fn every_auto_target_is_adjacent() {
        for kind in NfKind::ALL {
            for target in auto_targets(kind) {
                assert!(adjacent(kind, *target), "{kind} -> {target}");
            }
            if let Some(target) = sole_target(kind) {
                assert!(adjacent(kind, target), "{kind} -> {target}");
            }
        }
    }
}
