use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{PropertySet, PropertyValue, ValidationError};

/// Wire name of the out-of-band field deletion list.
const DELETE: &str = "delete";

/// Request verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource-action path relative to the API root, e.g. `/nodes/n1/lxc/100/resize`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Result<Self, ValidationError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(ValidationError::invalid("endpoint", "path must start with '/'"));
        }
        if path.split('/').skip(1).any(str::is_empty) {
            return Err(ValidationError::invalid("endpoint", "path has an empty segment"));
        }
        Ok(Self(path))
    }

    /// Join path segments under the API root; segments must not be empty.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = String::new();
        for segment in segments {
            path.push('/');
            path.push_str(segment.as_ref());
        }
        Self::new(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Node named by a `/nodes/{node}/...` path.
    pub fn node(&self) -> Option<&str> {
        let mut segments = self.0.split('/').skip(1);
        match (segments.next(), segments.next()) {
            (Some("nodes"), Some(node)) => Some(node),
            _ => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Endpoint {
    type Error = ValidationError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        Endpoint::new(path)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.0
    }
}

/// Parameters of a mutating request: field values plus fields to delete.
///
/// Deletions travel next to the values as a comma-joined `delete` field, never
/// inside a property string. A value keyed `delete` is read as such a list and
/// merged into the deletions instead of being stored as a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    values: PropertySet,
    delete: BTreeSet<String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(mut values: PropertySet) -> Self {
        let listed = values.remove(DELETE);
        let mut params = Self {
            values,
            delete: BTreeSet::new(),
        };
        if let Some(list) = listed {
            params.merge_deletes(&list);
        }
        params
    }

    pub fn with<K, V>(self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.with_opt(key, Some(value))
    }

    pub fn with_opt<K, V>(mut self, key: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        let key = key.into();
        if key == DELETE {
            if let Some(list) = value {
                self.merge_deletes(&list.into());
            }
        } else {
            self.values.set_opt(key, value);
        }
        self
    }

    fn merge_deletes(&mut self, list: &PropertyValue) {
        let list = list.to_string();
        self.delete.extend(
            list.split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string),
        );
    }

    /// Ask the node to drop `field` from the stored record.
    pub fn delete(mut self, field: impl Into<String>) -> Self {
        self.delete.insert(field.into());
        self
    }

    pub fn values(&self) -> &PropertySet {
        &self.values
    }

    /// Fields scheduled for deletion, sorted.
    pub fn deletes(&self) -> impl Iterator<Item = &str> {
        self.delete.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.delete.is_empty()
    }

    /// Flatten into wire pairs: values in key order, then `delete` if any.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .values
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        if !self.delete.is_empty() {
            let fields: Vec<&str> = self.deletes().collect();
            pairs.push((DELETE.to_string(), fields.join(",")));
        }
        pairs
    }
}

/// A validated call against a node-scoped endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRequest {
    pub endpoint: Endpoint,
    pub method: Method,
    pub params: RequestParams,
}

impl NodeRequest {
    pub fn new(endpoint: Endpoint, method: Method, params: RequestParams) -> Self {
        Self {
            endpoint,
            method,
            params,
        }
    }
}
