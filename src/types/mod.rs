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

//! Module containing all type definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod addr;
pub use addr::{same_subnet, subnet_of};

/// Simulated time in milliseconds since the network was created.
pub type SimTime = u64;

/// Network Function identification. Ids are assigned monotonically by the entity store and are
/// never reused, not even after the NF was removed.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NfId(pub u64);

impl std::fmt::Display for NfId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NF{}", self.0)
    }
}

impl From<u64> for NfId {
    fn from(x: u64) -> Self {
        Self(x)
    }
}

impl From<usize> for NfId {
    fn from(x: usize) -> Self {
        Self(x as u64)
    }
}

impl From<u32> for NfId {
    fn from(x: u32) -> Self {
        Self(x as u64)
    }
}

impl<T> From<&T> for NfId
where
    T: Into<NfId> + Copy,
{
    fn from(x: &T) -> Self {
        (*x).into()
    }
}

/// Connection identification.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C{}", self.0)
    }
}

impl From<u64> for ConnectionId {
    fn from(x: u64) -> Self {
        Self(x)
    }
}

/// Bus identification.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BusId(pub u64);

impl std::fmt::Display for BusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BUS{}", self.0)
    }
}

impl From<u64> for BusId {
    fn from(x: u64) -> Self {
        Self(x)
    }
}

/// Bus-Connection identification.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BusConnectionId(pub u64);

impl std::fmt::Display for BusConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BC{}", self.0)
    }
}

impl From<u64> for BusConnectionId {
    fn from(x: u64) -> Self {
        Self(x)
    }
}

/// The kind of a network function. Every kind except [`NfKind::Ue`] is a singleton: at most one
/// live instance may exist at any time. UEs are capped at two live instances.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum NfKind {
    /// Network Repository Function: the service registry every control-plane NF connects to.
    Nrf,
    /// Access and Mobility Management Function.
    Amf,
    /// Session Management Function.
    Smf,
    /// User Plane Function. Owns the tunnel IP pool from which PDU sessions draw addresses.
    Upf,
    /// Authentication Server Function.
    Ausf,
    /// Unified Data Management.
    Udm,
    /// Unified Data Repository. Paired with a [`NfKind::Db`] companion in the same subnet.
    Udr,
    /// Policy Control Function.
    Pcf,
    /// Network Slice Selection Function.
    Nssf,
    /// Radio access node (gNodeB).
    Gnb,
    /// User Equipment. Up to two live instances.
    Ue,
    /// External data network, the companion of a [`NfKind::Upf`].
    Dn,
    /// Backing database, the companion of a [`NfKind::Udr`].
    Db,
}

impl NfKind {
    /// All NF kinds, in display order.
    pub const ALL: [NfKind; 13] = [
        NfKind::Nrf,
        NfKind::Amf,
        NfKind::Smf,
        NfKind::Upf,
        NfKind::Ausf,
        NfKind::Udm,
        NfKind::Udr,
        NfKind::Pcf,
        NfKind::Nssf,
        NfKind::Gnb,
        NfKind::Ue,
        NfKind::Dn,
        NfKind::Db,
    ];

    /// The maximum number of live instances of this kind.
    pub fn instance_cap(&self) -> usize {
        match self {
            NfKind::Ue => 2,
            _ => 1,
        }
    }

    /// The protocol version tag carried by NFs of this kind.
    pub fn protocol(&self) -> &'static str {
        match self {
            NfKind::Gnb | NfKind::Upf => "GTP-U",
            NfKind::Ue => "NAS",
            NfKind::Dn => "IP",
            NfKind::Db => "SQL",
            _ => "HTTP/2",
        }
    }
}

impl std::fmt::Display for NfKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NfKind::Nrf => "NRF",
            NfKind::Amf => "AMF",
            NfKind::Smf => "SMF",
            NfKind::Upf => "UPF",
            NfKind::Ausf => "AUSF",
            NfKind::Udm => "UDM",
            NfKind::Udr => "UDR",
            NfKind::Pcf => "PCF",
            NfKind::Nssf => "NSSF",
            NfKind::Gnb => "gNB",
            NfKind::Ue => "UE",
            NfKind::Dn => "DN",
            NfKind::Db => "DB",
        };
        f.write_str(s)
    }
}

/// Lifecycle status of a network function.
///
/// The regular transition is `Creating → Starting → Stable`, driven by the stability timer. The
/// side transitions are `Stable|Starting → Stopped` and any state `→ Removed`.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum NfStatus {
    /// The NF is being created; resources are not yet assigned.
    Creating,
    /// The NF holds its resources and waits for the stability timer.
    Starting,
    /// The NF is fully operational.
    Stable,
    /// The NF was stopped by an explicit command.
    Stopped,
    /// The NF was removed. Only visible on the entity carried by the removal change event.
    Removed,
}

impl std::fmt::Display for NfStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NfStatus::Creating => "creating",
            NfStatus::Starting => "starting",
            NfStatus::Stable => "stable",
            NfStatus::Stopped => "stopped",
            NfStatus::Removed => "removed",
        };
        f.write_str(s)
    }
}

/// The kind of resource that ran out in [`NetworkError::ResourceExhausted`].
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ResourceKind {
    /// No free address remains in the candidate subnets.
    Address,
    /// No free port remains in the allocation range.
    Port,
    /// No unbound address remains in a UPF's tunnel pool.
    TunnelPool,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceKind::Address => "address",
            ResourceKind::Port => "port",
            ResourceKind::TunnelPool => "tunnel pool",
        };
        f.write_str(s)
    }
}

/// Network Errors
///
/// All errors are returned synchronously from the mutating command that caused them. Scheduled
/// events that discover a now-invalid precondition degrade to a silent no-op instead of raising.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// The NF is not present in the topology.
    #[error("Network function was not found in the topology: {0}")]
    NfNotFound(NfId),
    /// No NF with the given name is present in the topology.
    #[error("Network function name was not found in the topology: {0}")]
    NfNameNotFound(String),
    /// The connection is not present in the topology.
    #[error("Connection was not found in the topology: {0}")]
    ConnectionNotFound(ConnectionId),
    /// The bus is not present in the topology.
    #[error("Bus was not found in the topology: {0}")]
    BusNotFound(BusId),
    /// A live instance of the requested singleton kind already exists.
    #[error("An instance of {0} already exists")]
    SingletonViolation(NfKind),
    /// The instance cap of the requested kind is reached (two for UEs).
    #[error("The instance cap of {0} is reached")]
    CapacityExceeded(NfKind),
    /// Source and target of a connection are the same NF.
    #[error("Cannot connect {0} to itself")]
    SelfConnection(NfId),
    /// A connection between the unordered pair already exists.
    #[error("A connection between {0} and {1} already exists")]
    DuplicateConnection(NfId, NfId),
    /// The two endpoints live in different subnets.
    #[error("{0} and {1} are in different subnets")]
    SubnetMismatch(NfId, NfId),
    /// The two kinds are not adjacent in the reference architecture.
    #[error("Invalid adjacency: {0} cannot connect to {1}")]
    InvalidAdjacency(NfKind, NfKind),
    /// A resource pool ran out. Address and port exhaustion degrade to a pseudo-random fallback
    /// and never surface this error; tunnel-pool exhaustion is terminal.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(ResourceKind),
    /// The configured identity is not present in the subscriber directory.
    #[error("Subscriber identity not found: {0}")]
    IdentityNotFound(String),
    /// The configured identity exists but its slice or data-network attributes conflict.
    #[error("Subscriber identity mismatch for {0}: {1}")]
    IdentityMismatch(String, String),
    /// The subscriber directory is not yet populated. Transient; registration retries with
    /// backoff before giving up.
    #[error("Subscriber directory is not yet populated")]
    AllocationRace,
    /// No stable same-subnet UPF is available for a PDU session.
    #[error("No stable UPF available in the subnet of {0}")]
    UpfNotFound(NfId),
    /// The event queue did not drain within the configured event budget.
    #[error("The network did not settle within the event budget")]
    NoConvergence,
    /// Json error
    #[error("{0}")]
    JsonError(Box<serde_json::Error>),
    /// The snapshot has an unsupported schema version.
    #[error("Unsupported snapshot schema version: {0}")]
    UnsupportedSnapshot(u32),
}

impl From<serde_json::Error> for NetworkError {
    fn from(value: serde_json::Error) -> Self {
        Self::JsonError(Box::new(value))
    }
}

impl PartialEq for NetworkError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NfNotFound(l0), Self::NfNotFound(r0)) => l0 == r0,
            (Self::NfNameNotFound(l0), Self::NfNameNotFound(r0)) => l0 == r0,
            (Self::ConnectionNotFound(l0), Self::ConnectionNotFound(r0)) => l0 == r0,
            (Self::BusNotFound(l0), Self::BusNotFound(r0)) => l0 == r0,
            (Self::SingletonViolation(l0), Self::SingletonViolation(r0)) => l0 == r0,
            (Self::CapacityExceeded(l0), Self::CapacityExceeded(r0)) => l0 == r0,
            (Self::SelfConnection(l0), Self::SelfConnection(r0)) => l0 == r0,
            (Self::DuplicateConnection(l0, l1), Self::DuplicateConnection(r0, r1)) => {
                l0 == r0 && l1 == r1
            }
            (Self::SubnetMismatch(l0, l1), Self::SubnetMismatch(r0, r1)) => l0 == r0 && l1 == r1,
            (Self::InvalidAdjacency(l0, l1), Self::InvalidAdjacency(r0, r1)) => {
                l0 == r0 && l1 == r1
            }
            (Self::ResourceExhausted(l0), Self::ResourceExhausted(r0)) => l0 == r0,
            (Self::IdentityNotFound(l0), Self::IdentityNotFound(r0)) => l0 == r0,
            (Self::IdentityMismatch(l0, l1), Self::IdentityMismatch(r0, r1)) => {
                l0 == r0 && l1 == r1
            }
            (Self::UpfNotFound(l0), Self::UpfNotFound(r0)) => l0 == r0,
            (Self::UnsupportedSnapshot(l0), Self::UnsupportedSnapshot(r0)) => l0 == r0,
            (Self::JsonError(l), Self::JsonError(r)) => l.to_string() == r.to_string(),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}
