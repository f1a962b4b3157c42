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

//! Module defining the subscriber directory and UE identity validation.

use serde::{Deserialize, Serialize};

use crate::{
    event::EventQueue,
    network::Network,
    nf::UeConfig,
    types::{NetworkError, NfId},
};

/// A subscriber record in the directory, keyed by its SUPI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Subscription permanent identifier. Unique within the directory.
    pub supi: String,
    /// Shared secret material (hex encoded, never interpreted).
    pub key: String,
    /// Slice/service type.
    pub sst: u8,
    /// Slice differentiator, if the slice carries one.
    pub sd: Option<String>,
    /// Data network name.
    pub dnn: String,
}

impl Subscriber {
    /// Create a subscriber matching the placeholder identity of the given UE, with the default
    /// key, slice and data network.
    pub fn for_ue(cfg: &UeConfig) -> Self {
        Self {
            supi: cfg.supi.clone(),
            key: cfg.key.clone(),
            sst: cfg.sst,
            sd: cfg.sd.clone(),
            dnn: cfg.dnn.clone(),
        }
    }
}

impl<Q: EventQueue> Network<Q> {
    /// Add a subscriber record to the directory, replacing any record with the same SUPI.
    /// Populating the directory lets pending UE registrations succeed on their next attempt.
    pub fn add_subscriber(&mut self, sub: Subscriber) -> Option<Subscriber> {
        self.store.insert_subscriber(sub)
    }

    /// Remove the subscriber record with the given SUPI, if one exists.
    pub fn remove_subscriber(&mut self, supi: &str) -> Option<Subscriber> {
        self.store.remove_subscriber(supi)
    }

    /// Validate the configured identity of the UE against the subscriber directory and mark the
    /// UE as registered on success.
    ///
    /// An empty directory is the transient [`NetworkError::AllocationRace`]; a populated
    /// directory without the SUPI is [`NetworkError::IdentityNotFound`]; a record whose key,
    /// slice or data-network attributes conflict is [`NetworkError::IdentityMismatch`].
    pub fn validate_identity(&mut self, ue: NfId) -> Result<(), NetworkError> {
        let nf = self.store.nf_or_err(ue)?;
        let Some(cfg) = nf.ue() else {
            return Err(NetworkError::NfNotFound(ue));
        };
        if !self.store.has_subscribers() {
            return Err(NetworkError::AllocationRace);
        }
        let sub = self
            .store
            .subscriber(&cfg.supi)
            .ok_or_else(|| NetworkError::IdentityNotFound(cfg.supi.clone()))?;
        if sub.key != cfg.key {
            return Err(NetworkError::IdentityMismatch(
                cfg.supi.clone(),
                "key does not match".to_string(),
            ));
        }
        if sub.sst != cfg.sst || sub.sd != cfg.sd {
            return Err(NetworkError::IdentityMismatch(
                cfg.supi.clone(),
                "network slice does not match".to_string(),
            ));
        }
        if sub.dnn != cfg.dnn {
            return Err(NetworkError::IdentityMismatch(
                cfg.supi.clone(),
                "data network does not match".to_string(),
            ));
        }

        let nf = self.store.nf_mut_or_err(ue)?;
        if let Some(cfg) = nf.ue_mut() {
            cfg.registered = true;
        }
        self.store.notify_updated(ue);
        Ok(())
    }
}
