use super::{NodeOperation, require_segment};
use crate::{
    Endpoint, LEGACY_MAXFILES, Method, NodeRequest, PRUNE_BACKUPS, RequestParams, RetentionPolicy,
    ValidationError,
};

/// Write a storage's backup retention policy.
///
/// This is a plain configuration write: the node answers without a task
/// handle. When a structured policy is written the legacy count field is
/// deleted so the two never disagree on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRetentionUpdate {
    pub storage: String,
    /// Storage type when creating; `None` edits an existing storage.
    pub create_type: Option<String>,
    pub policy: RetentionPolicy,
    /// Scalar field superseded by the structured policy.
    pub legacy_field: Option<String>,
}

impl StorageRetentionUpdate {
    pub fn create(
        storage: impl Into<String>,
        storage_type: impl Into<String>,
        policy: RetentionPolicy,
    ) -> Self {
        Self {
            storage: storage.into(),
            create_type: Some(storage_type.into()),
            policy,
            legacy_field: Some(LEGACY_MAXFILES.to_string()),
        }
    }

    pub fn edit(storage: impl Into<String>, policy: RetentionPolicy) -> Self {
        Self {
            storage: storage.into(),
            create_type: None,
            policy,
            legacy_field: Some(LEGACY_MAXFILES.to_string()),
        }
    }

    fn is_create(&self) -> bool {
        self.create_type.is_some()
    }

    /// Retention part of the request.
    ///
    /// - empty policy on create: nothing
    /// - empty policy on edit: delete the policy and the legacy field
    /// - otherwise: the encoded policy, deleting the legacy field on edit
    pub fn retention_params(&self) -> RequestParams {
        let retention = self.policy.to_property_string();
        let mut params = RequestParams::new();

        if retention.is_empty() {
            if !self.is_create() {
                params = params.delete(PRUNE_BACKUPS);
                if let Some(legacy) = &self.legacy_field {
                    params = params.delete(legacy.as_str());
                }
            }
            return params;
        }

        params = params.with(PRUNE_BACKUPS, retention);
        if let (false, Some(legacy)) = (self.is_create(), &self.legacy_field) {
            params = params.delete(legacy.as_str());
        }
        params
    }
}

impl NodeOperation for StorageRetentionUpdate {
    fn to_request(&self) -> Result<NodeRequest, ValidationError> {
        require_segment("storage", &self.storage)?;

        let mut params = self.retention_params();
        let (endpoint, method) = match &self.create_type {
            Some(storage_type) => {
                require_segment("type", storage_type)?;
                params = params
                    .with("storage", self.storage.as_str())
                    .with("type", storage_type.as_str());
                (Endpoint::new("/storage")?, Method::Post)
            }
            None => (
                Endpoint::from_segments(["storage", self.storage.as_str()])?,
                Method::Put,
            ),
        };
        Ok(NodeRequest::new(endpoint, method, params))
    }
}
