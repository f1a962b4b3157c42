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

//! Module that introduces a formatter to display all types containing `NfId`.

use std::collections::{BTreeSet, HashSet};

use itertools::Itertools;

use crate::{
    event::{Event, FmtPriority},
    network::Network,
    types::{BusId, ConnectionId, NfId},
};

/// Trait to format a type that contains NfIds
pub trait NetworkFormatter<'a, 'n, Q> {
    /// Type that is returned, which implements `std::fmt::Display`.
    type Formatter;

    /// Return a struct that can be formatted and displayed. Unknown ids are rendered as `?`.
    fn fmt(&'a self, net: &'n Network<Q>) -> Self::Formatter;
}

impl<'a, 'n, Q> NetworkFormatter<'a, 'n, Q> for NfId {
    type Formatter = &'n str;

    fn fmt(&'a self, net: &'n Network<Q>) -> Self::Formatter {
        net.get_nf_name(*self).unwrap_or("?")
    }
}

impl<'a, 'n, Q> NetworkFormatter<'a, 'n, Q> for ConnectionId {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network<Q>) -> Self::Formatter {
        match net.store().connection(*self) {
            Some(c) => format!(
                "{} -> {} ({})",
                c.source().fmt(net),
                c.target().fmt(net),
                c.interface()
            ),
            None => format!("{self}?"),
        }
    }
}

impl<'a, 'n, Q> NetworkFormatter<'a, 'n, Q> for BusId {
    type Formatter = &'n str;

    fn fmt(&'a self, net: &'n Network<Q>) -> Self::Formatter {
        net.store().bus(*self).map(|b| b.name()).unwrap_or("?")
    }
}

impl<'a, 'n, Q> NetworkFormatter<'a, 'n, Q> for HashSet<NfId> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network<Q>) -> Self::Formatter {
        format!("{{{}}}", self.iter().map(|nf| nf.fmt(net)).join(", "))
    }
}

impl<'a, 'n, Q> NetworkFormatter<'a, 'n, Q> for BTreeSet<NfId> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network<Q>) -> Self::Formatter {
        format!("{{{}}}", self.iter().map(|nf| nf.fmt(net)).join(", "))
    }
}

impl<'a, 'n, Q> NetworkFormatter<'a, 'n, Q> for Vec<NfId> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network<Q>) -> Self::Formatter {
        format!("[{}]", self.iter().map(|nf| nf.fmt(net)).join(", "))
    }
}

impl<'a, 'n, Q, T: FmtPriority> NetworkFormatter<'a, 'n, Q> for Event<T> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network<Q>) -> Self::Formatter {
        match self {
            Event::Stabilize(p, nf) => format!("Stabilize {} {}", nf.fmt(net), p.fmt()),
            Event::AutoConnect(p, nf) => format!("AutoConnect {} {}", nf.fmt(net), p.fmt()),
            Event::Register(p, nf, attempt) => {
                format!("Register {} (attempt {}) {}", nf.fmt(net), attempt, p.fmt())
            }
        }
    }
}
