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

//! Base restore item action handler implementation.

use super::interfaces::ResourceSelector;
use crate::api::ApiResource;

/// Handler is a base struct for restore item actions.
/// It owns the action's constant selector and answers selection queries.
#[derive(Debug, Clone)]
pub struct Handler {
    selector: ResourceSelector,
}

impl Handler {
    /// Create a new Handler that applies to the given resources.
    pub fn new(resources: &[&str]) -> Self {
        Self {
            selector: ResourceSelector::for_resources(resources),
        }
    }

    /// Create a new Handler that applies to a single typed resource.
    pub fn for_resource<T: ApiResource>() -> Self {
        Self::new(&[T::group_resource().to_string().as_str()])
    }

    pub fn selector(&self) -> &ResourceSelector {
        &self.selector
    }

    pub fn selects(&self, resource: &str) -> bool {
        self.selector.matches_resource(resource)
    }
}
