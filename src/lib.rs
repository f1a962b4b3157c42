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

#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # NfSim
//!
//! This is a library for simulating the topology of a 5G core network: the network functions
//! (NFs), the connections between them, and the resources (addresses, ports, tunnel IP pools)
//! they consume. It is built to teach the 5G service-based architecture by letting a caller
//! assemble a virtual network and observe lifecycle and connectivity behavior.
//!
//! ## Main Concepts
//!
//! The [`network::Network`] is the main datastructure to operate on. It owns the entity store
//! (the authoritative registry of NFs, connections, buses and subscribers), the immutable
//! connection rule tables, and the event queue. NFs are created in `Starting` state and promoted
//! to `Stable` by a scheduled event; once stable, allow-listed NF kinds automatically seek
//! connections to eligible peers, and UEs attempt an identity-validated registration.
//!
//! All mutations happen through the command surface on [`network::Network`]
//! ([`Network::add_nf`](network::Network::add_nf),
//! [`Network::add_connection`](network::Network::add_connection),
//! [`Network::establish_pdu_session`](network::Network::establish_pdu_session), ...) and emit
//! [`store::ChangeEvent`]s which external observers (a canvas, a narration log) can drain with
//! [`Network::take_events`](network::Network::take_events).
//!
//! The default queue is a deterministic FIFO ([`event::BasicEventQueue`]). It can be replaced by
//! any implementation of [`event::EventQueue`]; [`event::TimingQueue`] schedules events on a
//! simulated millisecond clock with randomized setup latencies. If you wish to step through the
//! events one-by-one, `use` the trait [`interactive::InteractiveNetwork`].
//!
//! ```rust
//! use nfsim::prelude::*;
//!
//! fn main() -> Result<(), NetworkError> {
//!     let mut net = Network::default();
//!
//!     // create an NRF and an AMF; both stabilize and the AMF auto-connects to the NRF.
//!     let nrf = net.add_nf(NfKind::Nrf, None)?;
//!     let amf = net.add_nf(NfKind::Amf, None)?;
//!     assert!(net.are_connected(amf, nrf));
//!
//!     Ok(())
//! }
//! ```

pub mod alloc;
pub mod autoconnect;
pub mod bus;
pub mod connection;
pub mod event;
pub mod export;
pub mod formatter;
pub mod interactive;
pub mod lifecycle;
pub mod network;
pub mod nf;
pub mod prelude;
pub mod rules;
pub mod session;
pub mod store;
pub mod subscriber;
pub mod types;

#[cfg(test)]
mod test;
