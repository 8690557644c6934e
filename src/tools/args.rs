//! Argument extraction: untyped JSON object -> typed `ToolCall`.
//!
//! Values borrow from the argument object or from the ambient settings, so a
//! call never copies the token. Extraction fails fast with `ArgumentError`
//! before any network activity.

use serde_json::{Map, Value};

use super::{PARAM_ORG_HANDLE, PARAM_ORG_ID, PARAM_PROJECT_ID, PARAM_TOKEN, ToolName};
use crate::choreo::query;
use crate::config::Settings;
use crate::error::ArgumentError;

/// A validated tool invocation, ready for the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall<'a> {
    Projects {
        org_id: &'a str,
        token: &'a str,
    },
    Components {
        org_handle: &'a str,
        project_id: &'a str,
        token: &'a str,
    },
    Organizations {
        token: &'a str,
    },
    Environments {
        org_id: &'a str,
        token: &'a str,
    },
}

impl<'a> ToolCall<'a> {
    pub fn extract(
        name: ToolName,
        args: &'a Map<String, Value>,
        settings: &'a Settings,
    ) -> Result<Self, ArgumentError> {
        let ambient_org = settings.organization();
        match name {
            ToolName::GetProjects => {
                let org_id = or_ambient(args, PARAM_ORG_ID, ambient_org.map(|o| o.id.as_str()))?;
                let token = token(args, settings)?;
                Ok(ToolCall::Projects {
                    org_id: query::org_id(PARAM_ORG_ID, org_id)?,
                    token,
                })
            }
            ToolName::GetComponents => {
                let org_handle = or_ambient(
                    args,
                    PARAM_ORG_HANDLE,
                    ambient_org.map(|o| o.handle.as_str()),
                )?;
                let project_id = required(args, PARAM_PROJECT_ID)?;
                let token = token(args, settings)?;
                Ok(ToolCall::Components {
                    org_handle: query::non_empty(PARAM_ORG_HANDLE, org_handle)?,
                    project_id: query::non_empty(PARAM_PROJECT_ID, project_id)?,
                    token,
                })
            }
            ToolName::GetOrganizations => Ok(ToolCall::Organizations {
                token: token(args, settings)?,
            }),
            ToolName::GetEnvironments => {
                let org_id = or_ambient(args, PARAM_ORG_ID, ambient_org.map(|o| o.id.as_str()))?;
                let token = token(args, settings)?;
                Ok(ToolCall::Environments {
                    org_id: query::org_id(PARAM_ORG_ID, org_id)?,
                    token,
                })
            }
        }
    }

    pub fn tool(&self) -> ToolName {
        match self {
            ToolCall::Projects { .. } => ToolName::GetProjects,
            ToolCall::Components { .. } => ToolName::GetComponents,
            ToolCall::Organizations { .. } => ToolName::GetOrganizations,
            ToolCall::Environments { .. } => ToolName::GetEnvironments,
        }
    }
}

/// Read an optional string parameter. `null` counts as absent; any other
/// non-string value is a type error.
pub fn optional<'a>(
    args: &'a Map<String, Value>,
    name: &str,
) -> Result<Option<&'a str>, ArgumentError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ArgumentError::wrong_type(name, json_type(other))),
    }
}

pub fn required<'a>(args: &'a Map<String, Value>, name: &str) -> Result<&'a str, ArgumentError> {
    optional(args, name)?.ok_or_else(|| ArgumentError::missing(name))
}

fn or_ambient<'a>(
    args: &'a Map<String, Value>,
    name: &str,
    ambient: Option<&'a str>,
) -> Result<&'a str, ArgumentError> {
    optional(args, name)?
        .or(ambient)
        .ok_or_else(|| ArgumentError::missing(name))
}

fn token<'a>(args: &'a Map<String, Value>, settings: &'a Settings) -> Result<&'a str, ArgumentError> {
    let value = or_ambient(args, PARAM_TOKEN, settings.token())?;
    query::non_empty(PARAM_TOKEN, value)
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
