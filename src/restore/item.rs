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

//! Execute input and output that describe a single restore item.

use crate::api::{GroupResource, Unstructured};

/// RestoreMetadata identifies the restore an item belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreMetadata {
    pub name: String,
    pub namespace: String,
    pub backup_name: String,
}

/// RestoreItemActionExecuteInput is the input to RestoreItemAction::execute.
/// This corresponds to velero.RestoreItemActionExecuteInput.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreItemActionExecuteInput {
    /// The item being restored. Actions earlier in the chain may have modified it.
    pub item: Unstructured,
    /// The item exactly as it was read from the backup.
    pub item_from_backup: Unstructured,
    pub restore: Option<RestoreMetadata>,
}

impl RestoreItemActionExecuteInput {
    /// Create an input for an item that has not been modified since it was backed up.
    pub fn new(item: Unstructured) -> Self {
        Self {
            item_from_backup: item.clone(),
            item,
            restore: None,
        }
    }

    pub fn with_restore(mut self, restore: RestoreMetadata) -> Self {
        self.restore = Some(restore);
        self
    }
}

/// ResourceIdentifier names an additional item the host should restore.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    pub group_resource: GroupResource,
    pub namespace: String,
    pub name: String,
}

/// RestoreItemActionExecuteOutput is the result of RestoreItemAction::execute.
/// This corresponds to velero.RestoreItemActionExecuteOutput.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreItemActionExecuteOutput {
    /// The item to create in place of the input item.
    pub updated_item: Unstructured,
    /// Items that must be restored before this one.
    pub additional_items: Vec<ResourceIdentifier>,
    /// Tells the host not to create this item at all.
    pub skip_restore: bool,
}

impl RestoreItemActionExecuteOutput {
    pub fn new(updated_item: Unstructured) -> Self {
        Self {
            updated_item,
            additional_items: Vec::new(),
            skip_restore: false,
        }
    }
}
