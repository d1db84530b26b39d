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

//! Restore item action plugins module.

pub mod vscrestore;

use crate::restore::Plugins;

/// All restore item actions provided by this crate, in registration order.
pub const ALL_RESTORE_ITEM_ACTIONS: &[&str] = &[
    vscrestore::PLUGIN_NAME, // velero.io/csi-volumesnapshotcontent-restorer
];

/// Register all restore item actions.
pub fn register_all_restore_item_actions(plugins: &Plugins) {
    vscrestore::register(plugins);
}
