//! Topology announcements and their JSON wire format.
//!
//! An [`Announcement`] is the claim of one instance (the *owner*) about the
//! cluster it sees locally, together with the announcements it received from
//! other instances and folded into its own. Announcements travel over
//! connectors as JSON:
//!
//! ```json
//! {
//!   "ownerId": "a",
//!   "protocolVersion": 1,
//!   "created": 1699636852107,
//!   "loop": false,
//!   "inherited": false,
//!   "localClusterView": {
//!     "id": "c1",
//!     "instances": [{ "slingId": "a", "isLeader": true, "properties": {} }]
//!   },
//!   "topologyAnnouncements": []
//! }
//! ```
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json as json;
use thiserror::Error;

use crate::cluster::{ClusterView, Instance};
use crate::time::Timestamp;
use crate::PROTOCOL_VERSION;

/// Version assumed when an announcement doesn't carry one.
///
/// Never equal to [`PROTOCOL_VERSION`], so such announcements are rejected.
pub const UNKNOWN_PROTOCOL_VERSION: i32 = -1;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid announcement json: {0}")]
    Json(#[from] json::Error),
}

/// One instance's claim about its cluster and the announcements it relays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    owner_id: String,
    protocol_version: i32,
    local_cluster: Option<ClusterView>,
    incomings: Vec<Announcement>,
    inherited: bool,
    is_loop: bool,
    server_info: Option<String>,
    backoff_interval: Option<u64>,
    reset_backoff: bool,
    originally_created_at: Option<Timestamp>,
    received_at: Option<Timestamp>,
}

impl Announcement {
    /// A new, empty announcement owned by the given instance, using the
    /// current protocol version.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            protocol_version: PROTOCOL_VERSION,
            local_cluster: None,
            incomings: Vec::new(),
            inherited: false,
            is_loop: false,
            server_info: None,
            backoff_interval: None,
            reset_backoff: false,
            originally_created_at: None,
            received_at: None,
        }
    }

    /// Decode an announcement, including all nested announcements.
    pub fn from_json(s: &str) -> Result<Self, Error> {
        let wire: Wire = json::from_str(s)?;
        Ok(Self::from(wire))
    }

    /// Encode this announcement. The `created` field is set to the current time.
    pub fn to_json(&self) -> Result<String, Error> {
        let wire = self.wire(Some(Timestamp::now()));
        json::to_string(&wire).map_err(Error::from)
    }

    /// Like [`Announcement::to_json`], but indented.
    pub fn to_pretty_json(&self) -> Result<String, Error> {
        let wire = self.wire(Some(Timestamp::now()));
        json::to_string_pretty(&wire).map_err(Error::from)
    }

    /// Whether both announcements carry the same claim.
    ///
    /// Creation time and backoff interval are ignored, at every level of
    /// nesting: a heartbeat that only differs in those is not a change.
    pub fn corresponds_to(&self, other: &Announcement) -> bool {
        self.wire(None) == other.wire(None)
    }

    pub fn is_correct_version(&self) -> bool {
        self.protocol_version == PROTOCOL_VERSION
    }

    /// An announcement is valid if it has an owner, and either signals a loop,
    /// or has the right version and a local cluster that contains its owner.
    pub fn is_valid(&self) -> bool {
        if self.owner_id.is_empty() {
            return false;
        }
        if self.is_loop {
            return true;
        }
        if !self.is_correct_version() {
            return false;
        }
        match &self.local_cluster {
            Some(view) => view.contains(&self.owner_id),
            None => false,
        }
    }

    /// All instances of the local cluster and of every nested announcement.
    pub fn list_instances(&self) -> Vec<&Instance> {
        let mut instances = Vec::new();
        self.collect_instances(&mut instances);
        instances
    }

    fn collect_instances<'a>(&'a self, instances: &mut Vec<&'a Instance>) {
        if let Some(view) = &self.local_cluster {
            instances.extend(view.instances());
        }
        for incoming in &self.incomings {
            incoming.collect_instances(instances);
        }
    }

    /// Whether the given instance is part of this announcement's claim.
    pub fn contains_instance(&self, id: &str) -> bool {
        self.list_instances().iter().any(|i| i.id() == id)
    }

    pub fn add_incoming_topology_announcement(&mut self, announcement: Announcement) {
        self.incomings.push(announcement);
    }

    /// Remove the inherited announcements owned by `owner_id`.
    pub fn remove_inherited(&mut self, owner_id: &str) {
        self.incomings
            .retain(|a| !(a.inherited && a.owner_id == owner_id));
    }

    /// Carry over the informational timestamps of a newer copy of this announcement.
    pub fn register_ping(&mut self, incoming: &Announcement) {
        self.originally_created_at = incoming.originally_created_at;
        self.received_at = incoming.received_at;
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    pub fn local_cluster(&self) -> Option<&ClusterView> {
        self.local_cluster.as_ref()
    }

    pub fn incomings(&self) -> &[Announcement] {
        &self.incomings
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    pub fn is_loop(&self) -> bool {
        self.is_loop
    }

    pub fn server_info(&self) -> Option<&str> {
        self.server_info.as_deref()
    }

    /// Seconds the server asks the client to wait before its next heartbeat.
    pub fn backoff_interval(&self) -> Option<u64> {
        self.backoff_interval
    }

    pub fn reset_backoff(&self) -> bool {
        self.reset_backoff
    }

    pub fn originally_created_at(&self) -> Option<Timestamp> {
        self.originally_created_at
    }

    pub fn received_at(&self) -> Option<Timestamp> {
        self.received_at
    }

    pub fn set_protocol_version(&mut self, version: i32) {
        self.protocol_version = version;
    }

    pub fn set_local_cluster(&mut self, view: ClusterView) {
        self.local_cluster = Some(view);
    }

    pub fn set_inherited(&mut self, inherited: bool) {
        self.inherited = inherited;
    }

    pub fn set_loop(&mut self, is_loop: bool) {
        self.is_loop = is_loop;
    }

    pub fn set_server_info(&mut self, info: impl Into<String>) {
        self.server_info = Some(info.into());
    }

    pub fn set_backoff_interval(&mut self, secs: Option<u64>) {
        self.backoff_interval = secs;
    }

    pub fn set_reset_backoff(&mut self, reset: bool) {
        self.reset_backoff = reset;
    }

    pub fn set_received_at(&mut self, time: Timestamp) {
        self.received_at = Some(time);
    }

    /// Wire form of this announcement. Without a creation time, the
    /// time-dependent fields are left out.
    fn wire(&self, created: Option<Timestamp>) -> Wire {
        Wire {
            owner_id: self.owner_id.clone(),
            protocol_version: self.protocol_version,
            created: created.map(|t| t.as_millis()),
            backoff_interval: created
                .and(self.backoff_interval)
                .map(|b| b.try_into().unwrap_or(i64::MAX)),
            reset_backoff: self.reset_backoff,
            is_loop: self.is_loop,
            local_cluster_view: self.local_cluster.clone(),
            inherited: self.inherited,
            server_info: self.server_info.clone(),
            topology_announcements: self.incomings.iter().map(|a| a.wire(created)).collect(),
        }
    }
}

impl FromStr for Announcement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Announcement[ownerId={}, protocolVersion={}, inherited={}, loop={}, incomings={}]",
            self.owner_id,
            self.protocol_version,
            self.inherited,
            self.is_loop,
            self.incomings.len()
        )
    }
}

fn unknown_protocol_version() -> i32 {
    UNKNOWN_PROTOCOL_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Wire {
    owner_id: String,
    #[serde(default = "unknown_protocol_version")]
    protocol_version: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backoff_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    reset_backoff: bool,
    #[serde(default, rename = "loop")]
    is_loop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_cluster_view: Option<ClusterView>,
    #[serde(default)]
    inherited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server_info: Option<String>,
    #[serde(default)]
    topology_announcements: Vec<Wire>,
}

impl From<Wire> for Announcement {
    fn from(wire: Wire) -> Self {
        Self {
            owner_id: wire.owner_id,
            protocol_version: wire.protocol_version,
            local_cluster: wire.local_cluster_view,
            incomings: wire
                .topology_announcements
                .into_iter()
                .map(Announcement::from)
                .collect(),
            inherited: wire.inherited,
            is_loop: wire.is_loop,
            server_info: wire.server_info,
            // Negative values mean "unset".
            backoff_interval: wire.backoff_interval.and_then(|b| u64::try_from(b).ok()),
            reset_backoff: wire.reset_backoff,
            originally_created_at: wire.created.map(Timestamp::from_millis),
            received_at: None,
        }
    }
}
