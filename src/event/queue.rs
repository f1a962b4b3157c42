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

//! Module containing the definitions for the event queues.

use priority_queue::PriorityQueue;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Reverse,
    collections::{HashMap, VecDeque},
};

use crate::types::SimTime;

use super::{Event, EventHandle, AUTO_CONNECT_DELAY, REGISTER_BACKOFF, STABILIZE_DELAY};

/// Interface of an event queue.
pub trait EventQueue {
    /// Type of the priority.
    type Priority: Default + FmtPriority + Clone;

    /// Enqueue a new event. The queue assigns the priority (the scheduled firing time for timed
    /// queues) and returns a cancellable handle.
    fn push(&mut self, event: Event<Self::Priority>) -> EventHandle;

    /// Remove an enqueued event. Returns the event if it had not yet fired.
    fn cancel(&mut self, handle: EventHandle) -> Option<Event<Self::Priority>>;

    /// pop the next event
    fn pop(&mut self) -> Option<Event<Self::Priority>>;

    /// peek the next event
    fn peek(&self) -> Option<&Event<Self::Priority>>;

    /// Get the number of enqueued events
    fn len(&self) -> usize;

    /// Return `True` if no event is enqueued.
    fn is_empty(&self) -> bool;

    /// Remove all events from the queue.
    fn clear(&mut self);

    /// Get the current time of the queue. `None` for untimed queues.
    fn get_time(&self) -> Option<SimTime>;
}

/// Basic event queue: strict FIFO, no delays, fully deterministic. Preserves the ordering
/// guarantee that a creation's promotion event fires strictly after the creation completed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BasicEventQueue {
    q: VecDeque<(EventHandle, Event<()>)>,
    next_handle: u64,
}

impl BasicEventQueue {
    /// Create a new empty event queue
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventQueue for BasicEventQueue {
    type Priority = ();

    fn push(&mut self, event: Event<()>) -> EventHandle {
        let handle = EventHandle(self.next_handle);
        self.next_handle += 1;
        self.q.push_back((handle, event));
        handle
    }

    fn cancel(&mut self, handle: EventHandle) -> Option<Event<()>> {
        let pos = self.q.iter().position(|(h, _)| *h == handle)?;
        self.q.remove(pos).map(|(_, e)| e)
    }

    fn pop(&mut self) -> Option<Event<()>> {
        self.q.pop_front().map(|(_, e)| e)
    }

    fn peek(&self) -> Option<&Event<()>> {
        self.q.front().map(|(_, e)| e)
    }

    fn len(&self) -> usize {
        self.q.len()
    }

    fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    fn clear(&mut self) {
        self.q.clear()
    }

    fn get_time(&self) -> Option<SimTime> {
        None
    }
}

/// Timed event queue on a simulated millisecond clock.
///
/// Stabilization takes the fixed [`STABILIZE_DELAY`], auto-connection fires after a randomized
/// secondary delay drawn from [`AUTO_CONNECT_DELAY`], and registration retries back off
/// exponentially starting at [`REGISTER_BACKOFF`]. The clock advances to the firing time of
/// every popped event.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TimingQueue {
    q: PriorityQueue<EventHandle, Reverse<SimTime>>,
    events: HashMap<EventHandle, Event<SimTime>>,
    current_time: SimTime,
    next_handle: u64,
}

impl TimingQueue {
    /// Create a new, empty timed queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn delay(event: &Event<SimTime>) -> SimTime {
        let mut rng = thread_rng();
        match event {
            Event::Stabilize(_, _) => STABILIZE_DELAY,
            Event::AutoConnect(_, _) => rng.gen_range(AUTO_CONNECT_DELAY),
            Event::Register(_, _, attempt) => REGISTER_BACKOFF << attempt,
        }
    }
}

impl EventQueue for TimingQueue {
    type Priority = SimTime;

    fn push(&mut self, mut event: Event<SimTime>) -> EventHandle {
        let fire_at = self.current_time + Self::delay(&event);
        *event.priority_mut() = fire_at;

        let handle = EventHandle(self.next_handle);
        self.next_handle += 1;
        self.q.push(handle, Reverse(fire_at));
        self.events.insert(handle, event);
        handle
    }

    fn cancel(&mut self, handle: EventHandle) -> Option<Event<SimTime>> {
        self.q.remove(&handle);
        self.events.remove(&handle)
    }

    fn pop(&mut self) -> Option<Event<SimTime>> {
        let (handle, Reverse(fire_at)) = self.q.pop()?;
        self.current_time = fire_at;
        self.events.remove(&handle)
    }

    fn peek(&self) -> Option<&Event<SimTime>> {
        self.q.peek().and_then(|(h, _)| self.events.get(h))
    }

    fn len(&self) -> usize {
        self.q.len()
    }

    fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    fn clear(&mut self) {
        self.q.clear();
        self.events.clear();
        self.current_time = 0;
    }

    fn get_time(&self) -> Option<SimTime> {
        Some(self.current_time)
    }
}

/// Display type for Priority
pub trait FmtPriority {
    /// Display the priority
    fn fmt(&self) -> String;
}

impl FmtPriority for SimTime {
    fn fmt(&self) -> String {
        format!("(time: {self}ms)")
    }
}

impl FmtPriority for () {
    fn fmt(&self) -> String {
        String::new()
    }
}
