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

//! Module defining a network function and its kind-specific payloads.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::types::{
    subnet_of, NetworkError, NfId, NfKind, NfStatus, ResourceKind, SimTime,
};

/// A typed node in the simulated topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkFunction {
    /// Id of the NF. Immutable and never reused.
    id: NfId,
    /// Kind of the NF.
    kind: NfKind,
    /// Display name.
    pub(crate) name: String,
    /// Lifecycle status.
    pub(crate) status: NfStatus,
    /// Simulated time of the last status change.
    pub(crate) status_changed: SimTime,
    /// Address of the NF. Unique across all live NFs.
    addr: Ipv4Addr,
    /// Port of the NF. Unique across all live NFs.
    port: u16,
    /// Protocol version tag, derived from the kind at creation.
    protocol: String,
    /// Canvas position. Opaque display data; the engine never reads it.
    pub(crate) position: Option<(f64, f64)>,
    /// Kind-specific payload.
    pub(crate) payload: NfPayload,
}

impl NetworkFunction {
    pub(crate) fn new(id: NfId, kind: NfKind, addr: Ipv4Addr, port: u16) -> Self {
        Self {
            id,
            kind,
            name: format!("{}-{}", kind, id.0),
            status: NfStatus::Creating,
            status_changed: 0,
            addr,
            port,
            protocol: kind.protocol().to_string(),
            position: None,
            payload: NfPayload::for_kind(kind, id),
        }
    }

    /// Return the id of the NF.
    pub fn id(&self) -> NfId {
        self.id
    }

    /// Return the kind of the NF.
    pub fn kind(&self) -> NfKind {
        self.kind
    }

    /// Return the display name of the NF.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Return the lifecycle status of the NF.
    pub fn status(&self) -> NfStatus {
        self.status
    }

    /// Return the simulated time of the last status change.
    pub fn status_changed(&self) -> SimTime {
        self.status_changed
    }

    /// Return the address of the NF.
    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// Return the port of the NF.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Return the protocol version tag of the NF.
    pub fn protocol(&self) -> &str {
        self.protocol.as_ref()
    }

    /// Return the canvas position of the NF, if one was set.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }

    /// Return the /24 subnet the NF lives in.
    pub fn subnet(&self) -> Ipv4Net {
        subnet_of(self.addr)
    }

    /// Return the kind-specific payload.
    pub fn payload(&self) -> &NfPayload {
        &self.payload
    }

    /// Return the tunnel pool, if this NF is a UPF and the pool was constructed.
    pub fn tunnel_pool(&self) -> Option<&TunnelPool> {
        match &self.payload {
            NfPayload::Upf { pool } => pool.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn tunnel_pool_mut(&mut self) -> Option<&mut TunnelPool> {
        match &mut self.payload {
            NfPayload::Upf { pool } => pool.as_mut(),
            _ => None,
        }
    }

    /// Return the UE configuration, if this NF is a UE.
    pub fn ue(&self) -> Option<&UeConfig> {
        match &self.payload {
            NfPayload::Ue(cfg) => Some(cfg),
            _ => None,
        }
    }

    pub(crate) fn ue_mut(&mut self) -> Option<&mut UeConfig> {
        match &mut self.payload {
            NfPayload::Ue(cfg) => Some(cfg),
            _ => None,
        }
    }

    pub(crate) fn set_status(&mut self, status: NfStatus, now: SimTime) {
        self.status = status;
        self.status_changed = now;
    }
}

/// Kind-specific payload of a network function, keyed by the NF kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NfPayload {
    /// No payload. All kinds except UPF and UE.
    None,
    /// UPF payload: the tunnel IP pool, constructed lazily when the UPF connects to its DN.
    Upf {
        /// The tunnel pool, or `None` if it was not yet constructed.
        pool: Option<TunnelPool>,
    },
    /// UE payload: subscriber identity and the PDU session once established.
    Ue(UeConfig),
}

impl NfPayload {
    fn for_kind(kind: NfKind, id: NfId) -> Self {
        match kind {
            NfKind::Upf => NfPayload::Upf { pool: None },
            NfKind::Ue => NfPayload::Ue(UeConfig::placeholder(id)),
            _ => NfPayload::None,
        }
    }
}

/// Subscriber identity configured on a UE, and its PDU session once established.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UeConfig {
    /// Subscription permanent identifier.
    pub supi: String,
    /// Shared secret material (hex encoded, never interpreted).
    pub key: String,
    /// Slice/service type of the requested network slice.
    pub sst: u8,
    /// Slice differentiator, if the requested slice carries one.
    pub sd: Option<String>,
    /// Requested data network name.
    pub dnn: String,
    /// Whether the UE has passed identity validation.
    pub registered: bool,
    /// The PDU session, established at most once per UE.
    pub session: Option<PduSession>,
}

impl UeConfig {
    /// The default shared secret configured on new UEs and subscribers.
    pub const DEFAULT_KEY: &'static str = "465B5CE8B199B49FAA5F0A2EE238A6BC";

    fn placeholder(id: NfId) -> Self {
        Self {
            supi: format!("imsi-90170{:010}", id.0),
            key: Self::DEFAULT_KEY.to_string(),
            sst: 1,
            sd: None,
            dnn: "internet".to_string(),
            registered: false,
            session: None,
        }
    }
}

/// A UE's established data-path binding: the serving UPF and the address drawn from its tunnel
/// pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSession {
    /// The serving UPF.
    pub upf: NfId,
    /// The tunnel address assigned to the UE.
    pub addr: Ipv4Addr,
    /// Simulated time of establishment.
    pub established: SimTime,
}

/// A bounded range of tunnel addresses owned by a UPF, from which per-consumer addresses are
/// issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelPool {
    /// Gateway address of the pool. Never issued to a consumer.
    gateway: Ipv4Addr,
    /// Address range of the pool.
    range: Ipv4Net,
    /// Issued bindings, in issue order.
    bindings: Vec<TunnelBinding>,
    /// Index of the next host to probe. Advances monotonically; bindings are only released by
    /// tearing down the whole pool.
    next_free: u32,
}

/// A single consumer-to-address binding in a tunnel pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelBinding {
    /// The consumer holding the binding.
    pub consumer: NfId,
    /// The assigned address.
    pub addr: Ipv4Addr,
}

impl Default for TunnelPool {
    fn default() -> Self {
        // the standard UE pool from the reference configuration.
        Self::with_range(
            Ipv4Addr::new(10, 45, 0, 1),
            "10.45.0.0/24".parse().unwrap(),
        )
    }
}

impl TunnelPool {
    /// Create an empty pool over the given range. The gateway is excluded from issuance.
    pub fn with_range(gateway: Ipv4Addr, range: Ipv4Net) -> Self {
        Self {
            gateway,
            range,
            bindings: Vec::new(),
            next_free: 0,
        }
    }

    /// Return the gateway address of the pool.
    pub fn gateway(&self) -> Ipv4Addr {
        self.gateway
    }

    /// Return the address range of the pool.
    pub fn range(&self) -> Ipv4Net {
        self.range
    }

    /// Return the issued bindings, in issue order.
    pub fn bindings(&self) -> &[TunnelBinding] {
        &self.bindings
    }

    /// Return the binding of the given consumer, if one exists.
    pub fn binding_of(&self, consumer: NfId) -> Option<Ipv4Addr> {
        self.bindings
            .iter()
            .find(|b| b.consumer == consumer)
            .map(|b| b.addr)
    }

    /// Issue an address to the consumer. If the consumer already holds a binding, the identical
    /// address is returned again. Exhaustion is terminal and not retried.
    pub fn assign(&mut self, consumer: NfId) -> Result<Ipv4Addr, NetworkError> {
        if let Some(addr) = self.binding_of(consumer) {
            return Ok(addr);
        }
        for (idx, host) in self.range.hosts().enumerate().skip(self.next_free as usize) {
            if host == self.gateway {
                continue;
            }
            if self.bindings.iter().any(|b| b.addr == host) {
                continue;
            }
            self.bindings.push(TunnelBinding {
                consumer,
                addr: host,
            });
            self.next_free = idx as u32 + 1;
            return Ok(host);
        }
        Err(NetworkError::ResourceExhausted(ResourceKind::TunnelPool))
    }

    /// Drop the binding of the given consumer, if one exists. The freed address is not reissued;
    /// the next-free counter never moves backwards.
    pub(crate) fn release(&mut self, consumer: NfId) {
        self.bindings.retain(|b| b.consumer != consumer);
    }
}
