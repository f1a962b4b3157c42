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

//! This module contains an extension trait that allows you to interact with the simulator on a
//! per-event level.

use crate::{
    event::{Event, EventQueue},
    network::Network,
    types::NetworkError,
};

/// Trait that allows you to interact with the simulator on a per event level. It exposes an
/// interface to simulate a single event and to inspect the queue of the network.
pub trait InteractiveNetwork<Q>
where
    Q: EventQueue,
{
    /// Setup the network to automatically simulate each change of the network. This is the default
    /// behavior. Disable auto-simulation by using [`InteractiveNetwork::manual_simulation`].
    fn auto_simulation(&mut self);

    /// Setup the network to not to automatically simulate each change of the network. Upon any
    /// change (adding an NF, connecting two NFs, registering a subscriber), the event queue will
    /// be filled with the initial event(s), but it will not execute them. Enable auto-simulation
    /// by using [`InteractiveNetwork::auto_simulation`]. Use either
    /// [`InteractiveNetwork::simulate`] to run the entire queue, or
    /// [`InteractiveNetwork::simulate_step`] to execute a single event on the queue.
    fn manual_simulation(&mut self);

    /// Returns `true` if auto-simulation is enabled.
    fn auto_simulation_enabled(&self) -> bool;

    /// Calls the function `f` with argument to a mutable network. During this call, the network
    /// will have automatic simulation disabled. It will be re-enabled once the function exits.
    ///
    /// Note, that this function takes ownership of `self` and returns it afterwards. This is to
    /// prohibit you to call `with_manual_simulation` multiple times.
    fn with_manual_simulation<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut Network<Q>);

    /// Simulate the network behavior, given the current event queue. This function will execute
    /// all events (which may schedule new events), until either the event queue is empty (i.e.,
    /// the network has converged), or until the maximum allowed number of events have been
    /// processed (which can be set by [`Network::set_event_limit`]).
    fn simulate(&mut self) -> Result<(), NetworkError>;

    /// Simulate the next event on the queue. In comparison to [`InteractiveNetwork::simulate`],
    /// this function will not execute any subsequent event. It returns the event that was
    /// processed, or `None` if the queue was empty.
    fn simulate_step(&mut self) -> Option<Event<Q::Priority>>;

    /// Get a reference to the queue
    fn queue(&self) -> &Q;

    /// Get a mutable reference to the queue
    fn queue_mut(&mut self) -> &mut Q;
}

impl<Q: EventQueue> InteractiveNetwork<Q> for Network<Q> {
    fn auto_simulation(&mut self) {
        self.skip_queue = false;
    }

    fn manual_simulation(&mut self) {
        self.skip_queue = true;
    }

    fn auto_simulation_enabled(&self) -> bool {
        !self.skip_queue
    }

    fn with_manual_simulation<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Network<Q>),
    {
        self.manual_simulation();
        f(&mut self);
        self.auto_simulation();
        self
    }

    fn simulate(&mut self) -> Result<(), NetworkError> {
        let mut remaining = self.stop_after;
        while self.simulate_step().is_some() {
            if let Some(rem) = remaining.as_mut() {
                *rem -= 1;
                // draining the queue with the last allowed event still counts as converged.
                if *rem == 0 && !self.queue.is_empty() {
                    return Err(NetworkError::NoConvergence);
                }
            }
        }
        Ok(())
    }

    fn simulate_step(&mut self) -> Option<Event<Q::Priority>> {
        let event = self.queue.pop()?;
        self.handle_event(event.clone());
        Some(event)
    }

    fn queue(&self) -> &Q {
        &self.queue
    }

    fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }
}
