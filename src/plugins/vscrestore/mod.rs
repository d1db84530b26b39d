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

//! VolumeSnapshotContent restore item action.
//!
//! A VolumeSnapshotContent taken in one cluster is bound to that cluster's
//! snapshot controller state. This action rebuilds it so the target cluster
//! statically binds the restored content to the existing storage snapshot:
//! the source becomes the snapshot handle the driver recorded in status, the
//! deletion policy becomes Retain so removing the restored object never
//! deletes the backed-up snapshot, and the status block is dropped because
//! the server owns it.
//!
//! Rewriting is not idempotent. The output has no status, so running it
//! through the action a second time fails on the missing snapshot handle.

use crate::api::snapshot::{
    DeletionPolicy, VolumeSnapshotContent, VolumeSnapshotContentSource, VolumeSnapshotContentSpec,
};
use crate::api::{from_unstructured, to_unstructured, ApiResource, ObjectReference, Unstructured};
use crate::restore::{
    Handler, Plugins, ResourceSelector, RestoreError, RestoreItemAction,
    RestoreItemActionExecuteInput, RestoreItemActionExecuteOutput, RestoreResult,
};
use std::io::Read;
use std::sync::Arc;
use tracing::{info, info_span, Span};

/// Plugin name for the VolumeSnapshotContent restorer.
pub const PLUGIN_NAME: &str = "velero.io/csi-volumesnapshotcontent-restorer";

/// Register the VolumeSnapshotContent restorer with the plugin registry.
pub fn register(plugins: &Plugins) {
    plugins.register(PLUGIN_NAME, |_config: Option<&mut dyn Read>| {
        Ok(Arc::new(VscRestorer::new()) as Arc<dyn RestoreItemAction>)
    });
}

/// VscRestorer rewrites VolumeSnapshotContent items for re-creation in the
/// restore target cluster.
pub struct VscRestorer {
    handler: Handler,
    span: Span,
}

impl VscRestorer {
    pub fn new() -> Self {
        Self {
            handler: Handler::for_resource::<VolumeSnapshotContent>(),
            span: info_span!("restore_item_action", plugin = PLUGIN_NAME),
        }
    }

    /// Record all diagnostics of this restorer inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Decode the item, rebuild it for restore and encode the result.
    pub fn rewrite(&self, item: &Unstructured) -> RestoreResult<Unstructured> {
        let _entered = self.span.enter();
        info!("Starting VolumeSnapshotContent restorer");

        let vsc: VolumeSnapshotContent = from_unstructured(item)?;
        info!(content = vsc.name(), "Restoring VolumeSnapshotContent");

        let to_restore = restore_content(&vsc)?;
        let updated = to_unstructured(&to_restore)
            .map_err(|e| RestoreError::encode("restored VolumeSnapshotContent", e))?;

        info!(
            volume_handle = ?to_restore.spec.source.volume_handle,
            snapshot_handle = ?to_restore.spec.source.snapshot_handle,
            "Restored VolumeSnapshotContent source"
        );
        info!(
            status_snapshot_handle = ?to_restore.status_snapshot_handle(),
            "Restored VolumeSnapshotContent status"
        );
        info!("Returning from VolumeSnapshotContent restorer");

        Ok(updated)
    }
}

impl Default for VscRestorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RestoreItemAction for VscRestorer {
    fn applies_to(&self) -> RestoreResult<ResourceSelector> {
        Ok(self.handler.selector().clone())
    }

    fn selects(&self, resource: &str) -> bool {
        self.handler.selects(resource)
    }

    fn execute(
        &self,
        input: &RestoreItemActionExecuteInput,
    ) -> RestoreResult<RestoreItemActionExecuteOutput> {
        let updated_item = self.rewrite(&input.item)?;
        Ok(RestoreItemActionExecuteOutput::new(updated_item))
    }
}

/// Build the VolumeSnapshotContent to create in the target cluster.
///
/// Only the name, driver, snapshot class and the four identifying fields of
/// the VolumeSnapshot reference survive. The status snapshot handle becomes
/// the source and the deletion policy is forced to Retain.
pub fn restore_content(vsc: &VolumeSnapshotContent) -> RestoreResult<VolumeSnapshotContent> {
    let snapshot_handle = vsc
        .status_snapshot_handle()
        .ok_or_else(|| missing_field(vsc, "status.snapshotHandle"))?;
    let class_name = vsc
        .spec
        .volume_snapshot_class_name
        .as_deref()
        .ok_or_else(|| missing_field(vsc, "spec.volumeSnapshotClassName"))?;

    let snapshot_ref = &vsc.spec.volume_snapshot_ref;
    Ok(VolumeSnapshotContent {
        spec: VolumeSnapshotContentSpec {
            volume_snapshot_ref: ObjectReference {
                api_version: snapshot_ref.api_version.clone(),
                kind: snapshot_ref.kind.clone(),
                name: snapshot_ref.name.clone(),
                namespace: snapshot_ref.namespace.clone(),
                ..Default::default()
            },
            deletion_policy: Some(DeletionPolicy::Retain),
            driver: vsc.spec.driver.clone(),
            volume_snapshot_class_name: Some(class_name.to_string()),
            source: VolumeSnapshotContentSource::from_snapshot_handle(snapshot_handle),
        },
        status: None,
        ..VolumeSnapshotContent::new(vsc.name())
    })
}

fn missing_field(vsc: &VolumeSnapshotContent, field: &str) -> RestoreError {
    RestoreError::missing_field(
        VolumeSnapshotContent::group_resource().to_string(),
        vsc.name(),
        field,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::io::{Cursor, Write};
    use std::sync::Mutex;

    const VSC_RESOURCE: &str = "volumesnapshotcontent.snapshot.storage.k8s.io";

    fn item(value: Value) -> Unstructured {
        Unstructured::from_value(value).unwrap()
    }

    /// A VolumeSnapshotContent as it appears in a backup taken from a live cluster.
    fn backed_up_content(deletion_policy: Option<&str>) -> Value {
        let mut value = json!({
            "apiVersion": "snapshot.storage.k8s.io/v1beta1",
            "kind": "VolumeSnapshotContent",
            "metadata": {
                "name": "snap-1",
                "uid": "0a5c3c2e-1f2d-4c1b-9a57-d3b1a0c4a001",
                "resourceVersion": "8812",
                "labels": {"velero.io/backup-name": "backup-1"},
                "annotations": {"snapshot.storage.kubernetes.io/deletion-secret-name": "creds"},
                "finalizers": ["snapshot.storage.kubernetes.io/volumesnapshotcontent-bound-protection"]
            },
            "spec": {
                "driver": "csi.example.com",
                "source": {"volumeHandle": "vol-123"},
                "volumeSnapshotClassName": "vsc-class",
                "volumeSnapshotRef": {
                    "apiVersion": "v1",
                    "kind": "VolumeSnapshot",
                    "name": "vs-1",
                    "namespace": "ns-a",
                    "uid": "f00d",
                    "resourceVersion": "8800"
                }
            },
            "status": {
                "creationTime": 1583056800000000000i64,
                "readyToUse": true,
                "restoreSize": 1073741824,
                "snapshotHandle": "handle-xyz"
            }
        });
        if let Some(policy) = deletion_policy {
            value["spec"]["deletionPolicy"] = json!(policy);
        }
        value
    }

    #[test]
    fn test_selects_only_volume_snapshot_content() {
        let restorer = VscRestorer::new();
        assert!(restorer.selects(VSC_RESOURCE));

        for resource in [
            "volumesnapshotcontents.snapshot.storage.k8s.io",
            "VolumeSnapshotContent.snapshot.storage.k8s.io",
            "VOLUMESNAPSHOTCONTENT.SNAPSHOT.STORAGE.K8S.IO",
            "volumesnapshotcontent",
            "volumesnapshotcontent.snapshot.storage.k8s.io ",
            "volumesnapshot.snapshot.storage.k8s.io",
            "volumesnapshotclass.snapshot.storage.k8s.io",
            "persistentvolumes",
            "",
        ] {
            assert!(!restorer.selects(resource), "unexpectedly selected {:?}", resource);
        }
    }

    #[test]
    fn test_applies_to() {
        let selector = VscRestorer::new().applies_to().unwrap();
        assert_eq!(selector.included_resources, vec![VSC_RESOURCE.to_string()]);
        assert!(selector.excluded_resources.is_empty());
        assert!(selector.included_namespaces.is_empty());
        assert!(selector.label_selector.is_empty());
    }

    #[test]
    fn test_rewrite_example() {
        let input = item(json!({
            "metadata": {"name": "snap-1"},
            "spec": {
                "driver": "csi.example.com",
                "volumeSnapshotClassName": "vsc-class",
                "volumeSnapshotRef": {
                    "apiVersion": "v1",
                    "kind": "VolumeSnapshot",
                    "name": "vs-1",
                    "namespace": "ns-a"
                },
                "deletionPolicy": "Delete"
            },
            "status": {"snapshotHandle": "handle-xyz"}
        }));

        let output = VscRestorer::new().rewrite(&input).unwrap();

        assert_eq!(
            output.into_value(),
            json!({
                "apiVersion": "snapshot.storage.k8s.io/v1beta1",
                "kind": "VolumeSnapshotContent",
                "metadata": {"name": "snap-1"},
                "spec": {
                    "deletionPolicy": "Retain",
                    "driver": "csi.example.com",
                    "source": {"snapshotHandle": "handle-xyz"},
                    "volumeSnapshotClassName": "vsc-class",
                    "volumeSnapshotRef": {
                        "apiVersion": "v1",
                        "kind": "VolumeSnapshot",
                        "name": "vs-1",
                        "namespace": "ns-a"
                    }
                }
            })
        );
    }

    #[test]
    fn test_deletion_policy_always_retain() {
        let restorer = VscRestorer::new();
        for policy in [Some("Delete"), Some("Retain"), Some("Orphan"), Some(""), None] {
            let output = restorer.rewrite(&item(backed_up_content(policy))).unwrap();
            assert_eq!(
                output.nested_str(&["spec", "deletionPolicy"]),
                Some("Retain"),
                "input deletion policy {:?}",
                policy
            );
        }
    }

    #[test]
    fn test_rewrite_accepts_null_fields() {
        let mut input = backed_up_content(Some("Delete"));
        input["metadata"]["labels"] = Value::Null;
        input["spec"]["driver"] = Value::Null;
        input["spec"]["volumeSnapshotRef"] = Value::Null;

        let output = VscRestorer::new().rewrite(&item(input)).unwrap();
        assert_eq!(output.nested_str(&["spec", "driver"]), Some(""));
        assert_eq!(output.object["spec"]["volumeSnapshotRef"], json!({}));
        assert_eq!(output.object["metadata"], json!({"name": "snap-1"}));
        assert_eq!(
            output.nested_str(&["spec", "source", "snapshotHandle"]),
            Some("handle-xyz")
        );
    }

    #[test]
    fn test_snapshot_handle_promoted_to_source() {
        let output = VscRestorer::new()
            .rewrite(&item(backed_up_content(Some("Delete"))))
            .unwrap();

        assert_eq!(
            output.nested_str(&["spec", "source", "snapshotHandle"]),
            Some("handle-xyz")
        );
        assert!(!output.has_field(&["spec", "source", "volumeHandle"]));
    }

    #[test]
    fn test_status_and_extra_fields_dropped() {
        let output = VscRestorer::new()
            .rewrite(&item(backed_up_content(Some("Delete"))))
            .unwrap();

        assert!(!output.has_field(&["status"]));
        assert_eq!(output.object["metadata"], json!({"name": "snap-1"}));
        assert_eq!(
            output.object["spec"]["volumeSnapshotRef"],
            json!({
                "apiVersion": "v1",
                "kind": "VolumeSnapshot",
                "name": "vs-1",
                "namespace": "ns-a"
            })
        );
    }

    #[test]
    fn test_rewrite_output_decodes_to_expected_fields() {
        let input = backed_up_content(Some("Delete"));
        let original: VolumeSnapshotContent = from_unstructured(&item(input.clone())).unwrap();
        let output = VscRestorer::new().rewrite(&item(input)).unwrap();

        let restored: VolumeSnapshotContent = from_unstructured(&output).unwrap();
        assert_eq!(restored, restore_content(&original).unwrap());
        assert_eq!(restored.name(), original.name());
        assert_eq!(restored.spec.driver, original.spec.driver);
        assert_eq!(
            restored.spec.volume_snapshot_class_name,
            original.spec.volume_snapshot_class_name
        );
        let (got, want) = (&restored.spec.volume_snapshot_ref, &original.spec.volume_snapshot_ref);
        assert_eq!(got.api_version, want.api_version);
        assert_eq!(got.kind, want.kind);
        assert_eq!(got.name, want.name);
        assert_eq!(got.namespace, want.namespace);
        assert_eq!(got.uid, "");
        assert_eq!(restored.spec.deletion_policy, Some(DeletionPolicy::Retain));
        assert_eq!(restored.spec.source.snapshot_handle.as_deref(), Some("handle-xyz"));
        assert_eq!(restored.status, None);
    }

    #[test]
    fn test_second_rewrite_fails_on_missing_handle() {
        let restorer = VscRestorer::new();
        let once = restorer.rewrite(&item(backed_up_content(None))).unwrap();

        let err = restorer.rewrite(&once).unwrap_err();
        assert!(matches!(err, RestoreError::MissingRequiredField { .. }));
        assert_eq!(err.missing_field_path(), Some("status.snapshotHandle"));
    }

    #[test]
    fn test_missing_status_snapshot_handle() {
        let restorer = VscRestorer::new();

        let mut no_status = backed_up_content(None);
        no_status.as_object_mut().unwrap().remove("status");
        let err = restorer.rewrite(&item(no_status)).unwrap_err();
        assert_eq!(err.missing_field_path(), Some("status.snapshotHandle"));

        let mut no_handle = backed_up_content(None);
        no_handle["status"] = json!({"readyToUse": true});
        let err = restorer.rewrite(&item(no_handle)).unwrap_err();
        assert_eq!(err.missing_field_path(), Some("status.snapshotHandle"));
        assert_eq!(
            err.to_string(),
            "volumesnapshotcontent.snapshot.storage.k8s.io \"snap-1\": status.snapshotHandle: Required value"
        );

        let mut null_handle = backed_up_content(None);
        null_handle["status"]["snapshotHandle"] = Value::Null;
        let err = restorer.rewrite(&item(null_handle)).unwrap_err();
        assert_eq!(err.missing_field_path(), Some("status.snapshotHandle"));
    }

    #[test]
    fn test_missing_snapshot_class_name() {
        let mut input = backed_up_content(None);
        input["spec"].as_object_mut().unwrap().remove("volumeSnapshotClassName");

        let err = VscRestorer::new().rewrite(&item(input)).unwrap_err();
        assert_eq!(err.missing_field_path(), Some("spec.volumeSnapshotClassName"));
    }

    #[test]
    fn test_decode_failure() {
        let mut input = backed_up_content(None);
        input["spec"]["driver"] = json!(["csi.example.com"]);

        let err = VscRestorer::new().rewrite(&item(input)).unwrap_err();
        assert!(matches!(err, RestoreError::Decode(_)), "got {:?}", err);
    }

    #[test]
    fn test_restore_content_is_pure() {
        let original: VolumeSnapshotContent =
            from_unstructured(&item(backed_up_content(Some("Delete")))).unwrap();
        let snapshot = original.clone();

        let first = restore_content(&original).unwrap();
        let second = restore_content(&original).unwrap();
        assert_eq!(first, second);
        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_execute() {
        let mut backup = backed_up_content(None);
        backup["status"]["snapshotHandle"] = json!("handle-from-backup");
        let input = RestoreItemActionExecuteInput {
            item: item(backed_up_content(None)),
            item_from_backup: item(backup),
            restore: None,
        };

        let output = VscRestorer::new().execute(&input).unwrap();
        assert_eq!(
            output.updated_item.nested_str(&["spec", "source", "snapshotHandle"]),
            Some("handle-xyz")
        );
        assert!(output.additional_items.is_empty());
        assert!(!output.skip_restore);
    }

    /// Collects formatted log output written by a test subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).lines().map(String::from).collect()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_rewrite_logs_inside_injected_span() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let restorer = VscRestorer::new().with_span(info_span!("restore", restore = "restore-1"));
        restorer.rewrite(&item(backed_up_content(None))).unwrap();

        let lines = logs.lines();
        let expected = [
            "Starting VolumeSnapshotContent restorer",
            "Restoring VolumeSnapshotContent",
            "Restored VolumeSnapshotContent source",
            "Restored VolumeSnapshotContent status",
            "Returning from VolumeSnapshotContent restorer",
        ];
        assert_eq!(lines.len(), expected.len(), "captured: {:#?}", lines);
        for (line, message) in lines.iter().zip(expected) {
            assert!(line.contains(message), "expected {:?} in {:?}", message, line);
            assert!(
                line.contains("restore{restore=\"restore-1\"}"),
                "event outside injected span: {:?}",
                line
            );
        }
        assert!(lines[1].contains("snap-1"));
        assert!(lines[2].contains("volume_handle=None"));
        assert!(lines[2].contains("handle-xyz"));
        assert!(lines[3].contains("status_snapshot_handle=None"));
    }

    #[test]
    fn test_concurrent_rewrites() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VscRestorer>();

        let restorer = Arc::new(VscRestorer::new());
        std::thread::scope(|s| {
            for i in 0..4 {
                let restorer = Arc::clone(&restorer);
                s.spawn(move || {
                    let mut input = backed_up_content(None);
                    input["metadata"]["name"] = json!(format!("snap-{}", i));
                    let output = restorer.rewrite(&item(input)).unwrap();
                    assert_eq!(output.name(), format!("snap-{}", i));
                });
            }
        });
    }

    #[test]
    fn test_plugin_registration() {
        let plugins = Plugins::new();
        register(&plugins);
        assert!(plugins.is_registered(PLUGIN_NAME));

        let plugin = plugins.new_from_plugins(PLUGIN_NAME, None).unwrap();
        assert!(plugin.selects(VSC_RESOURCE));

        let mut config = Cursor::new("unused: value\n");
        let plugin = plugins.new_from_plugins(PLUGIN_NAME, Some(&mut config)).unwrap();
        let output = plugin
            .execute(&RestoreItemActionExecuteInput::new(item(backed_up_content(None))))
            .unwrap();
        assert_eq!(output.updated_item.nested_str(&["spec", "deletionPolicy"]), Some("Retain"));
    }
}
