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

//! Module for defining events
//!
//! Events are the only suspension points of the engine: they model the real-world setup latency
//! of lifecycle promotion, auto-connection and UE registration. There is no explicit
//! cancellation requirement for correctness — every handler re-checks that its target still
//! exists — but the queue hands out an [`EventHandle`] so that pending events of a removed
//! entity can be dropped eagerly.

use serde::{Deserialize, Serialize};

mod queue;
pub use queue::{BasicEventQueue, EventQueue, FmtPriority, TimingQueue};

use crate::types::{NfId, SimTime};

/// Event to handle. The first tuple field is the priority assigned by the queue (the scheduled
/// time for timed queues, `()` for the FIFO queue).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event<T> {
    /// Promote the NF from `Starting` to `Stable`.
    Stabilize(T, NfId),
    /// Let the (now stable) NF seek automatic connections to eligible peers.
    AutoConnect(T, NfId),
    /// Attempt an identity-validated registration of the UE. The last field counts the attempts
    /// made so far; the queue uses it to compute the retry backoff.
    Register(T, NfId, u8),
}

impl<T> Event<T> {
    /// Get a reference to the priority of this event.
    pub fn priority(&self) -> &T {
        match self {
            Event::Stabilize(p, _) | Event::AutoConnect(p, _) | Event::Register(p, _, _) => p,
        }
    }

    /// Get a mutable reference to the priority of this event.
    pub fn priority_mut(&mut self) -> &mut T {
        match self {
            Event::Stabilize(p, _) | Event::AutoConnect(p, _) | Event::Register(p, _, _) => p,
        }
    }

    /// Return the NF targeted by the event.
    pub fn nf(&self) -> NfId {
        match self {
            Event::Stabilize(_, nf) | Event::AutoConnect(_, nf) | Event::Register(_, nf, _) => *nf,
        }
    }
}

impl<T: FmtPriority> Event<T> {
    /// Format the event for logging.
    pub fn fmt(&self) -> String {
        match self {
            Event::Stabilize(p, nf) => format!("Stabilize {} {}", nf, p.fmt()),
            Event::AutoConnect(p, nf) => format!("AutoConnect {} {}", nf, p.fmt()),
            Event::Register(p, nf, attempt) => {
                format!("Register {} (attempt {}) {}", nf, attempt, p.fmt())
            }
        }
    }
}

/// Handle of an enqueued event, returned by [`EventQueue::push`]. Cancelling a handle whose
/// event has already fired is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventHandle(pub(crate) u64);

/// The fixed delay before a `Starting` NF is promoted to `Stable` (timed queues only).
pub const STABILIZE_DELAY: SimTime = 2_000;

/// The range from which the randomized auto-connection delay is drawn (timed queues only).
pub const AUTO_CONNECT_DELAY: std::ops::Range<SimTime> = 500..2_500;

/// Base backoff of a registration retry; doubled on every attempt (timed queues only).
pub const REGISTER_BACKOFF: SimTime = 1_000;
