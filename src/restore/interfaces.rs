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

//! Core restore item action interfaces.

use super::errors::RestoreResult;
use super::item::{RestoreItemActionExecuteInput, RestoreItemActionExecuteOutput};

/// ResourceSelector describes which items a restore item action applies to.
/// This corresponds to velero.ResourceSelector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSelector {
    /// Resources (`resource.group`) the action applies to.
    pub included_resources: Vec<String>,
    /// Resources the action never applies to, even if included.
    pub excluded_resources: Vec<String>,
    pub included_namespaces: Vec<String>,
    pub excluded_namespaces: Vec<String>,
    pub label_selector: String,
}

impl ResourceSelector {
    /// Create a selector that includes exactly the given resources.
    pub fn for_resources(resources: &[&str]) -> Self {
        Self {
            included_resources: resources.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Returns true if the resource identifier is included and not excluded.
    /// Matching is exact and case-sensitive.
    pub fn matches_resource(&self, resource: &str) -> bool {
        self.included_resources.iter().any(|r| r == resource)
            && !self.excluded_resources.iter().any(|r| r == resource)
    }
}

/// RestoreItemAction is an actor that performs an operation on an individual
/// item being restored.
/// This corresponds to velero.RestoreItemAction.
pub trait RestoreItemAction: Send + Sync {
    /// Returns the selector that determines which items this action is executed for.
    fn applies_to(&self) -> RestoreResult<ResourceSelector>;

    /// Returns true if this action should be executed for the given resource.
    fn selects(&self, resource: &str) -> bool {
        self.applies_to()
            .map(|selector| selector.matches_resource(resource))
            .unwrap_or(false)
    }

    /// Execute allows the action to modify or replace the item before it is
    /// created in the target cluster.
    fn execute(
        &self,
        input: &RestoreItemActionExecuteInput,
    ) -> RestoreResult<RestoreItemActionExecuteOutput>;
}
