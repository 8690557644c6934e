//! Dispatcher: name + untyped arguments -> client call -> rendered text.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Ambient, Registry, ToolCall};
use crate::choreo::ChoreoClient;
use crate::config::Settings;
use crate::error::ToolError;

/// Cheap to clone; shares read-only settings between concurrent invocations.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    settings: Arc<Settings>,
    client: ChoreoClient,
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(settings: Settings, client: ChoreoClient) -> Self {
        let registry = Registry::new(Ambient::from_settings(&settings));
        Self {
            settings: Arc::new(settings),
            client,
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Invoke a tool by name. Returns the rendered records on success.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Option<&Map<String, Value>>,
    ) -> Result<String, ToolError> {
        let tool = self
            .registry
            .find(name)
            .map(|spec| spec.name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let empty = Map::new();
        let args = arguments.unwrap_or(&empty);
        let call = ToolCall::extract(tool, args, &self.settings)?;
        tracing::debug!(tool = %tool, "invoking tool");
        self.run(call).await
    }

    /// Execute an already-validated call.
    pub async fn run(&self, call: ToolCall<'_>) -> Result<String, ToolError> {
        let tool = call.tool();
        let wrap = |e| ToolError::operation(tool.operation(), e);
        let rendered = match call {
            ToolCall::Projects { org_id, token } => {
                render(&self.client.fetch_projects(org_id, token).await.map_err(wrap)?)
            }
            ToolCall::Components {
                org_handle,
                project_id,
                token,
            } => render(
                &self
                    .client
                    .fetch_components(org_handle, project_id, token)
                    .await
                    .map_err(wrap)?,
            ),
            ToolCall::Organizations { token } => {
                render(&self.client.fetch_organizations(token).await.map_err(wrap)?)
            }
            ToolCall::Environments { org_id, token } => {
                render(&self.client.fetch_environments(org_id, token).await.map_err(wrap)?)
            }
        };
        Ok(rendered)
    }
}

/// Dump the decoded records as pretty JSON (Debug form as a fallback).
fn render<T: Serialize + std::fmt::Debug>(records: &[T]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|_| format!("{records:?}"))
}
