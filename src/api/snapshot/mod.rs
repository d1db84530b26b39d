// Copyright 2024 the Velero contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CSI snapshot API types (snapshot.storage.k8s.io/v1beta1).
//!
//! Only VolumeSnapshotContent is modelled. Fields this crate never reads are
//! ignored on decode, so documents from newer servers still convert.

use super::meta::{null_as_default, ApiResource, ObjectMeta, ObjectReference};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const GROUP: &str = "snapshot.storage.k8s.io";
pub const VERSION: &str = "v1beta1";

/// DeletionPolicy describes what happens to the storage snapshot when its
/// VolumeSnapshotContent is deleted.
///
/// The field is a free-form string on the wire. Values other than `Delete`
/// and `Retain` are kept as `Other` so a document carrying them still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeletionPolicy {
    /// Delete removes the storage snapshot together with the content object.
    Delete,
    /// Retain keeps the storage snapshot after the content object is gone.
    Retain,
    /// Any other value, including the empty string.
    Other(String),
}

impl DeletionPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            DeletionPolicy::Delete => "Delete",
            DeletionPolicy::Retain => "Retain",
            DeletionPolicy::Other(value) => value,
        }
    }
}

impl From<String> for DeletionPolicy {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Delete" => DeletionPolicy::Delete,
            "Retain" => DeletionPolicy::Retain,
            _ => DeletionPolicy::Other(value),
        }
    }
}

impl fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeletionPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeletionPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(DeletionPolicy::from)
    }
}

/// VolumeSnapshotContentSource names where the snapshot comes from. Exactly one
/// of the handles is expected to be set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContentSource {
    /// Handle of a volume to be snapshotted dynamically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_handle: Option<String>,
    /// Handle of a snapshot that already exists on the storage system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_handle: Option<String>,
}

impl VolumeSnapshotContentSource {
    pub fn from_snapshot_handle(handle: &str) -> Self {
        Self {
            volume_handle: None,
            snapshot_handle: Some(handle.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContentSpec {
    /// The VolumeSnapshot this content is bound to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub volume_snapshot_ref: ObjectReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,
    /// Name of the CSI driver that owns the snapshot.
    #[serde(default, deserialize_with = "null_as_default")]
    pub driver: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_snapshot_class_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: VolumeSnapshotContentSource,
}

/// VolumeSnapshotError is the last error the snapshot controller recorded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// VolumeSnapshotContentStatus is written by the driver after the snapshot is cut.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContentStatus {
    /// Nanoseconds since the epoch at which the snapshot was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_to_use: Option<bool>,
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<VolumeSnapshotError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_handle: Option<String>,
}

/// VolumeSnapshotContent binds a storage-level snapshot to a VolumeSnapshot.
/// It is cluster scoped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContent {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub api_version: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ObjectMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: VolumeSnapshotContentSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VolumeSnapshotContentStatus>,
}

impl ApiResource for VolumeSnapshotContent {
    const GROUP: &'static str = GROUP;
    const VERSION: &'static str = VERSION;
    const KIND: &'static str = "VolumeSnapshotContent";
    const SINGULAR: &'static str = "volumesnapshotcontent";
}

impl VolumeSnapshotContent {
    /// Create an empty content object with type information filled in.
    pub fn new(name: &str) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::KIND.to_string(),
            metadata: ObjectMeta::named(name),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Snapshot handle recorded by the driver, if any.
    pub fn status_snapshot_handle(&self) -> Option<&str> {
        self.status.as_ref()?.snapshot_handle.as_deref()
    }
}
