//! GraphQL query assembly.
//!
//! Every caller-supplied value goes through `org_id` or `string_literal`
//! before it is placed in a query document. The finished document is carried
//! in a `{"query": ...}` object serialized by serde_json.

use crate::error::ArgumentError;

const PROJECT_FIELDS: &[&str] = &[
    "id",
    "orgId",
    "name",
    "version",
    "createdDate",
    "handler",
    "region",
    "description",
    "defaultDeploymentPipelineId",
    "deploymentPipelineIds",
    "type",
    "gitProvider",
    "gitOrganization",
    "repository",
    "branch",
    "secretRef",
    "updatedAt",
];

const COMPONENT_FIELDS: &[&str] = &[
    "projectId",
    "id",
    "name",
    "status",
    "handler",
    "displayName",
    "displayType",
];

/// Validate an organization id. The API takes it as a GraphQL `Int` and as a
/// URL path segment, so only ASCII digits are accepted.
pub fn org_id<'a>(param: &str, raw: &'a str) -> Result<&'a str, ArgumentError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ArgumentError::invalid(param, "must not be empty"));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ArgumentError::invalid(
            param,
            "must be a numeric organization id",
        ));
    }
    Ok(value)
}

/// Reject blank values. The value itself is passed through untouched.
pub fn non_empty<'a>(param: &str, raw: &'a str) -> Result<&'a str, ArgumentError> {
    if raw.trim().is_empty() {
        return Err(ArgumentError::invalid(param, "must not be empty"));
    }
    Ok(raw)
}

/// Render a GraphQL string literal (quotes included).
pub fn string_literal(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    out.push('"');
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `projects(orgId: <id>)` selection over every project field.
pub fn projects(org_id: &str) -> String {
    format!(
        "query{{projects(orgId: {org_id}){{{}}}}}",
        PROJECT_FIELDS.join(", ")
    )
}

/// `components(orgHandler: "...", projectId: "...")` selection.
pub fn components(org_handle: &str, project_id: &str) -> String {
    format!(
        "query{{components(orgHandler: {}, projectId: {}){{{}}}}}",
        string_literal(org_handle),
        string_literal(project_id),
        COMPONENT_FIELDS.join(", ")
    )
}

/// JSON body for a GraphQL POST.
pub fn payload(query: String) -> serde_json::Value {
    serde_json::json!({ "query": query })
}
