//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    ActingUser, BatchResult, EditOperation, Script, ScriptEditApi, ScriptElement, ScriptError,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Native client implementation that directly calls the domain service
///
/// Used by in-process callers (such as a realtime edit channel) that already
/// hold an authenticated user and want batch semantics without HTTP.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ScriptEditApi for NativeClient {
    async fn process_batch(
        &self,
        script_id: Uuid,
        operations: Vec<EditOperation>,
        user: &ActingUser,
    ) -> Result<BatchResult, ScriptError> {
        self.service.process_batch(script_id, operations, user).await
    }

    async fn get_script(&self, script_id: Uuid) -> Result<Script, ScriptError> {
        self.service.get_script(script_id).await
    }

    async fn get_elements(&self, script_id: Uuid) -> Result<Vec<ScriptElement>, ScriptError> {
        self.service.get_elements(script_id).await
    }
}
