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

//! Field-addressable documents and their conversion to and from typed API objects.
//!
//! Restore item actions receive and return items as [`Unstructured`] documents.
//! [`from_unstructured`] and [`to_unstructured`] are the only places where a
//! document crosses into a typed shape, so the rewrite logic itself never
//! touches raw JSON.

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unstructured is a JSON object holding an API item of any kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unstructured {
    pub object: Map<String, Value>,
}

impl Unstructured {
    pub fn new(object: Map<String, Value>) -> Self {
        Self { object }
    }

    /// Build a document from a JSON value. Anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.object)
    }

    /// Returns the string at the given field path, if every step is present.
    pub fn nested_str(&self, path: &[&str]) -> Option<&str> {
        let (first, rest) = path.split_first()?;
        let mut current = self.object.get(*first)?;
        for field in rest {
            current = current.as_object()?.get(*field)?;
        }
        current.as_str()
    }

    /// Returns true if the given field path resolves to any value.
    pub fn has_field(&self, path: &[&str]) -> bool {
        let Some((first, rest)) = path.split_first() else {
            return false;
        };
        let mut current = match self.object.get(*first) {
            Some(v) => v,
            None => return false,
        };
        for field in rest {
            current = match current.as_object().and_then(|o| o.get(*field)) {
                Some(v) => v,
                None => return false,
            };
        }
        true
    }

    pub fn api_version(&self) -> &str {
        self.nested_str(&["apiVersion"]).unwrap_or_default()
    }

    pub fn kind(&self) -> &str {
        self.nested_str(&["kind"]).unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.nested_str(&["metadata", "name"]).unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.nested_str(&["metadata", "namespace"]).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for Unstructured {
    fn from(object: Map<String, Value>) -> Self {
        Self::new(object)
    }
}

/// Convert a document into a typed object.
pub fn from_unstructured<T: DeserializeOwned>(item: &Unstructured) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(item.object.clone()))
}

/// Convert a typed object into a document. The object must serialize to a JSON object.
pub fn to_unstructured<T: Serialize>(obj: &T) -> Result<Unstructured, serde_json::Error> {
    match serde_json::to_value(obj)? {
        Value::Object(object) => Ok(Unstructured { object }),
        other => Err(serde_json::Error::custom(format!(
            "expected an object, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
