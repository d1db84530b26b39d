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

//! Restore item action interfaces and types.
//!
//! This module provides the core types and traits for implementing restore item
//! actions, mirroring the plugin interfaces of the Velero restore pipeline.

pub mod errors;
mod handler;
mod interfaces;
pub mod item;
mod plugins;

pub use errors::{RestoreError, RestoreResult};
pub use handler::Handler;
pub use interfaces::{ResourceSelector, RestoreItemAction};
pub use item::{
    ResourceIdentifier, RestoreItemActionExecuteInput, RestoreItemActionExecuteOutput,
    RestoreMetadata,
};
pub use plugins::{Factory, Plugins};
