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

//! Restore item action error types.

use thiserror::Error;

/// Result type for restore item action operations.
pub type RestoreResult<T> = Result<T, RestoreError>;

/// RestoreError represents errors that can occur while executing a restore item action.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// Decode indicates the item could not be converted into its typed shape.
    #[error(transparent)]
    Decode(serde_json::Error),

    /// MissingRequiredField indicates an optional field the action depends on is unset.
    #[error("{resource} \"{name}\": {field}: Required value")]
    MissingRequiredField {
        resource: String,
        name: String,
        field: String,
    },

    /// Encode indicates the computed item could not be converted back into a document.
    #[error("error converting {context} to unstructured: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Internal represents a failure in the plugin host.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RestoreError {
    /// Create a MissingRequiredField error.
    pub fn missing_field(
        resource: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        RestoreError::MissingRequiredField {
            resource: resource.into(),
            name: name.into(),
            field: field.into(),
        }
    }

    /// Create an Encode error naming the step that produced the value.
    pub fn encode(context: impl Into<String>, source: serde_json::Error) -> Self {
        RestoreError::Encode {
            context: context.into(),
            source,
        }
    }

    /// Create an Internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        RestoreError::Internal(msg.into())
    }

    /// Returns the field path for MissingRequiredField errors.
    pub fn missing_field_path(&self) -> Option<&str> {
        match self {
            RestoreError::MissingRequiredField { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RestoreError {
    fn from(error: serde_json::Error) -> Self {
        RestoreError::Decode(error)
    }
}
