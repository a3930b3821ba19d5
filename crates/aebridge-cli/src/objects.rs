//! Handles to host objects parked in the panel's `$._pydobe` table.
//!
//! [`object_script`] wraps a line so that an object result is stored under a
//! fresh id and described as `{"isObject": true, "objectType", "pydobeId"}`.
//! [`ObjectRef`] is that description on the client side; property reads and
//! index lookups on it go through the same wrapper, so they return handles
//! too. [`Collection`] adds a length read and negative indexing.

use serde_json::Value;

use crate::{BridgeClient, ClientError, EvalValue};

/// Wraps `line` so an object result is parked host-side and described as JSON.
///
/// Scalar results pass through unchanged.
pub fn object_script(line: &str) -> String {
    format!(
        "var tmp = {}\n\
         if(typeof tmp === 'object' && tmp !== null){{\n\
         var newPydobeId = $._pydobe.generateId();\n\
         $._pydobe[newPydobeId] = tmp;\n\
         tmp = ExtendJSON.stringify({{\"isObject\": true, \"objectType\": tmp.reflect.name, \"pydobeId\": newPydobeId}}, internal_variables_replacer, 0, 1);\n\
         }}\n\
         tmp",
        line
    )
}

/// A host object parked under `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub id: String,
    pub object_type: String,
}

/// Result of an object-aware evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectValue {
    Object(ObjectRef),
    Value(EvalValue),
}

impl ObjectValue {
    pub fn decode(value: EvalValue) -> Self {
        match value {
            EvalValue::Json(json) => match ObjectRef::from_json(&json) {
                Some(object) => ObjectValue::Object(object),
                None => ObjectValue::Value(EvalValue::Json(json)),
            },
            text => ObjectValue::Value(text),
        }
    }

    pub fn into_object(self) -> Option<ObjectRef> {
        match self {
            ObjectValue::Object(object) => Some(object),
            ObjectValue::Value(_) => None,
        }
    }
}

impl ObjectRef {
    /// Reads an `isObject` description. `None` for any other JSON.
    pub fn from_json(value: &Value) -> Option<Self> {
        if value.get("isObject") != Some(&Value::Bool(true)) {
            return None;
        }
        let id = match value.get("pydobeId")? {
            Value::String(id) => id.clone(),
            Value::Number(id) => id.to_string(),
            _ => return None,
        };
        let object_type = value
            .get("objectType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(ObjectRef { id, object_type })
    }

    /// ExtendScript expression naming the parked object.
    pub fn expression(&self) -> String {
        let escaped = self.id.replace('\\', "\\\\").replace('\'', "\\'");
        format!("$._pydobe['{}']", escaped)
    }

    pub fn property_line(&self, property: &str) -> String {
        format!("{}.{};", self.expression(), property)
    }

    pub fn index_line(&self, index: i64) -> String {
        format!("{}[{}];", self.expression(), index)
    }

    /// Reads `property` (or calls a method, e.g. `"addFolder(\"x\")"`).
    pub async fn get(&self, client: &BridgeClient, property: &str) -> Result<ObjectValue, ClientError> {
        client.eval_returning_object(&self.property_line(property)).await
    }

    /// Looks up `[index]` as written, with no normalisation.
    pub async fn index(&self, client: &BridgeClient, index: i64) -> Result<ObjectValue, ClientError> {
        client.eval_returning_object(&self.index_line(index)).await
    }
}

/// A host collection whose length is read from `len_property`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub object: ObjectRef,
    pub len_property: String,
    /// Host index of the first element (After Effects collections start at 1).
    pub base: i64,
}

impl Collection {
    pub fn new(object: ObjectRef, len_property: impl Into<String>) -> Self {
        Collection {
            object,
            len_property: len_property.into(),
            base: 0,
        }
    }

    pub fn one_based(object: ObjectRef, len_property: impl Into<String>) -> Self {
        Collection {
            base: 1,
            ..Collection::new(object, len_property)
        }
    }

    pub async fn len(&self, client: &BridgeClient) -> Result<usize, ClientError> {
        match self.object.get(client, &self.len_property).await? {
            ObjectValue::Value(EvalValue::Json(Value::Number(n))) => {
                n.as_u64().map(|n| n as usize).ok_or_else(|| ClientError::UnexpectedResult {
                    expected: "a non-negative length",
                    text: n.to_string(),
                })
            }
            other => Err(ClientError::UnexpectedResult {
                expected: "a length",
                text: format!("{:?}", other),
            }),
        }
    }

    /// Fetches the element at zero-based `index`; negative counts from the end.
    pub async fn get(&self, client: &BridgeClient, index: i64) -> Result<ObjectValue, ClientError> {
        let len = self.len(client).await?;
        let host_index = self.host_index(index, len)?;
        self.object.index(client, host_index).await
    }

    /// Maps a zero-based, possibly negative index onto the host's numbering.
    pub fn host_index(&self, index: i64, len: usize) -> Result<i64, ClientError> {
        let len_i = len as i64;
        let normalized = if index < 0 { len_i + index } else { index };
        if normalized < 0 || normalized >= len_i {
            return Err(ClientError::IndexOutOfRange { index, len });
        }
        Ok(normalized + self.base)
    }
}
