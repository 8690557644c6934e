/*!
Tool registry.

Declares the fixed set of tools exposed over MCP and via `choreo-mcp exec`:

  get_projects       orgId, token
  get_components     orgHandle, projectId, token
  get_organizations  token
  get_environments   orgId, token

Whether `token` / `orgId` / `orgHandle` are required depends on the ambient
values resolved at startup (see `Ambient`). A per-call value always wins.

  args.rs      untyped argument object -> typed `ToolCall`
  dispatch.rs  `Dispatcher::invoke` (extract -> client call -> render)
*/

pub mod args;
pub mod dispatch;

use std::fmt;

use serde_json::{Map, Value, json};

pub use args::ToolCall;
pub use dispatch::Dispatcher;

/// Names of the exposed tools.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ToolName {
    GetProjects,
    GetComponents,
    GetOrganizations,
    GetEnvironments,
}

impl ToolName {
    pub const fn all() -> &'static [ToolName] {
        &[
            ToolName::GetProjects,
            ToolName::GetComponents,
            ToolName::GetOrganizations,
            ToolName::GetEnvironments,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::GetProjects => "get_projects",
            ToolName::GetComponents => "get_components",
            ToolName::GetOrganizations => "get_organizations",
            ToolName::GetEnvironments => "get_environments",
        }
    }

    /// Case-insensitive lookup for CLI input.
    pub fn from_str_ci(name: &str) -> Option<Self> {
        let norm = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(norm))
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::GetProjects => "Get projects from a Choreo organization",
            ToolName::GetComponents => "Get components of a project in a Choreo organization",
            ToolName::GetOrganizations => "Get the Choreo organizations visible to the token",
            ToolName::GetEnvironments => "Get environment templates of a Choreo organization",
        }
    }

    /// Parameter that the ambient organization can stand in for, if any.
    pub fn org_param(&self) -> Option<&'static str> {
        match self {
            ToolName::GetProjects | ToolName::GetEnvironments => Some(PARAM_ORG_ID),
            ToolName::GetComponents => Some(PARAM_ORG_HANDLE),
            ToolName::GetOrganizations => None,
        }
    }

    /// Phrase used when wrapping failures ("failed to <operation>: ...").
    pub fn operation(&self) -> &'static str {
        match self {
            ToolName::GetProjects => "get projects",
            ToolName::GetComponents => "get components",
            ToolName::GetOrganizations => "get organizations",
            ToolName::GetEnvironments => "get environments",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* ---- Parameter names ---- */

pub const PARAM_ORG_ID: &str = "orgId";
pub const PARAM_ORG_HANDLE: &str = "orgHandle";
pub const PARAM_PROJECT_ID: &str = "projectId";
pub const PARAM_TOKEN: &str = "token";

/// Which ambient values are available; decides parameter required-ness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ambient {
    pub token: bool,
    pub organization: bool,
}

impl Ambient {
    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self {
            token: settings.token().is_some(),
            organization: settings.organization().is_some(),
        }
    }
}

/// A declared tool parameter. Every parameter is a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: ToolName,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: ToolName, ambient: Ambient) -> Self {
        let org_id = ParamSpec {
            name: PARAM_ORG_ID,
            description: if ambient.organization {
                "Organization ID (defaults to the organization resolved at startup)"
            } else {
                "Organization ID"
            },
            required: !ambient.organization,
        };
        let token = ParamSpec {
            name: PARAM_TOKEN,
            description: if ambient.token {
                "Bearer token for authentication (defaults to the configured token)"
            } else {
                "Bearer token for authentication"
            },
            required: !ambient.token,
        };
        let params = match name {
            ToolName::GetProjects | ToolName::GetEnvironments => vec![org_id, token],
            ToolName::GetComponents => vec![
                ParamSpec {
                    name: PARAM_ORG_HANDLE,
                    description: if ambient.organization {
                        "Organization handle (defaults to the organization resolved at startup)"
                    } else {
                        "Organization handle"
                    },
                    required: !ambient.organization,
                },
                ParamSpec {
                    name: PARAM_PROJECT_ID,
                    description: "Project ID",
                    required: true,
                },
                token,
            ],
            ToolName::GetOrganizations => vec![token],
        };
        Self { name, params }
    }

    pub fn required(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }

    /// JSON Schema object describing the parameters.
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        for p in &self.params {
            properties.insert(
                p.name.to_string(),
                json!({ "type": "string", "description": p.description }),
            );
        }
        let required: Vec<&str> = self.required().map(|p| p.name).collect();
        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema
    }
}

/// All tool declarations for one process.
#[derive(Debug, Clone)]
pub struct Registry {
    specs: Vec<ToolSpec>,
}

impl Registry {
    pub fn new(ambient: Ambient) -> Self {
        let specs = ToolName::all()
            .iter()
            .map(|&name| ToolSpec::new(name, ambient))
            .collect();
        Self { specs }
    }

    /// Exact-match lookup (MCP tool names are case-sensitive).
    pub fn find(&self, name: &str) -> Option<&ToolSpec> {
        self.specs.iter().find(|s| s.name.as_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }
}
