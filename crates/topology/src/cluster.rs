//! Cluster views: the set of instances an owner sees in its local cluster.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fields common to every instance description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Instance identifier.
    pub id: String,
    /// Whether this instance is the leader of its cluster.
    pub leader: bool,
    /// Free-form instance properties.
    pub properties: BTreeMap<String, String>,
}

impl Descriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            leader: false,
            properties: BTreeMap::new(),
        }
    }

    /// Mark this instance as the cluster leader.
    pub fn leader(mut self) -> Self {
        self.leader = true;
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// An instance, as seen from the instance holding the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "InstanceWire", into = "InstanceWire")]
pub enum Instance {
    /// The instance holding the view.
    Local(Descriptor),
    /// Any other instance.
    Remote(Descriptor),
}

impl Instance {
    pub fn descriptor(&self) -> &Descriptor {
        match self {
            Self::Local(d) | Self::Remote(d) => d,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor().id
    }

    pub fn is_leader(&self) -> bool {
        self.descriptor().leader
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.descriptor().properties
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceWire {
    sling_id: String,
    #[serde(default)]
    is_leader: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_local: bool,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

impl From<InstanceWire> for Instance {
    fn from(wire: InstanceWire) -> Self {
        let descriptor = Descriptor {
            id: wire.sling_id,
            leader: wire.is_leader,
            properties: wire.properties,
        };
        if wire.is_local {
            Self::Local(descriptor)
        } else {
            Self::Remote(descriptor)
        }
    }
}

impl From<Instance> for InstanceWire {
    fn from(instance: Instance) -> Self {
        let is_local = instance.is_local();
        let (Instance::Local(d) | Instance::Remote(d)) = instance;

        Self {
            sling_id: d.id,
            is_leader: d.leader,
            is_local,
            properties: d.properties,
        }
    }
}

/// A view of one cluster: its identifier and member instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterView {
    id: String,
    #[serde(default)]
    instances: Vec<Instance>,
}

impl ClusterView {
    pub fn new(id: impl Into<String>, instances: impl IntoIterator<Item = Instance>) -> Self {
        Self {
            id: id.into(),
            instances: instances.into_iter().collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The instance holding this view, if it is part of it.
    pub fn local(&self) -> Option<&Instance> {
        self.instances.iter().find(|i| i.is_local())
    }

    /// The cluster leader, if any.
    pub fn leader(&self) -> Option<&Instance> {
        self.instances.iter().find(|i| i.is_leader())
    }

    pub fn get(&self, id: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.instances.iter().map(Instance::id)
    }
}
