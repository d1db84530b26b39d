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

//! Velero restore item action plugins implemented in Rust.
//!
//! A restore item action is handed each backed-up item whose resource it
//! selects and returns the item to create in the target cluster. The host
//! that discovers and runs plugins is not part of this crate; it wraps the
//! [`RestoreItemAction`] trait.

pub mod api;
pub mod plugins;
pub mod restore;

// Re-export commonly used types
pub use api::Unstructured;
pub use plugins::vscrestore::VscRestorer;
pub use restore::{
    Handler, Plugins, ResourceSelector, RestoreError, RestoreItemAction,
    RestoreItemActionExecuteInput, RestoreItemActionExecuteOutput, RestoreResult,
};
