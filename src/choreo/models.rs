//! Records returned by the Choreo management API.
//!
//! Field names and optionality mirror the remote JSON. Unknown fields are
//! ignored so new server-side attributes never break decoding.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub org_id: i64,
    pub name: String,
    pub version: String,
    pub created_date: String,
    pub handler: String,
    pub region: String,
    pub description: String,
    pub default_deployment_pipeline_id: String,
    pub deployment_pipeline_ids: Vec<String>,
    #[serde(rename = "type")]
    pub project_type: String,
    pub git_provider: Option<String>,
    pub git_organization: Option<String>,
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub secret_ref: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    pub idp_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub uuid: String,
    pub handle: String,
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub project_id: String,
    pub id: String,
    pub name: String,
    pub status: String,
    pub handler: String,
    pub display_name: String,
    pub display_type: String,
}

/// Environment template of an organization (snake_case on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub created_at: String,
    pub organization_id: i64,
    pub organization_uuid: String,
    pub env_name: String,
    pub region: String,
    pub choreo_env: String,
    pub cluster_id: String,
    pub docker_credential_uuid: String,
    pub external_apim_env_name: String,
    pub internal_apim_env_name: String,
    pub sandbox_apim_env_name: String,
    pub critical: bool,
    pub dns_prefix: String,
    pub pdp_web_app_dns_prefix: String,
    pub deletion_status: String,
    pub sandbox: bool,
}

/* ---- Response envelopes ---- */

/// Standard GraphQL response: `data` on success, `errors` on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlErrorItem {
    pub message: String,
}

/// The selection must be present but may be `null` (partial GraphQL failure).
#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsData {
    #[serde(deserialize_with = "Option::deserialize")]
    pub projects: Option<Vec<Project>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComponentsData {
    #[serde(deserialize_with = "Option::deserialize")]
    pub components: Option<Vec<Component>>,
}

/// REST `{"data":[...]}` wrapper used by the devops service.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_optional_fields_may_be_absent() {
        let p: Project = serde_json::from_value(json!({
            "id": "p1",
            "orgId": 123,
            "name": "demo",
            "version": "1.0.0",
            "createdDate": "2024-01-01",
            "handler": "demo",
            "region": "US",
            "description": "",
            "defaultDeploymentPipelineId": "dp1",
            "deploymentPipelineIds": ["dp1", "dp2"],
            "type": "MONO_REPO",
            "updatedAt": "2024-01-02",
            "somethingNew": {"nested": true}
        }))
        .unwrap();
        assert_eq!(p.org_id, 123);
        assert_eq!(p.project_type, "MONO_REPO");
        assert_eq!(p.deployment_pipeline_ids, vec!["dp1", "dp2"]);
        assert!(p.git_provider.is_none());
        assert!(p.secret_ref.is_none());
    }

    #[test]
    fn project_nullable_git_fields() {
        let p: Project = serde_json::from_value(json!({
            "id": "p1", "orgId": 1, "name": "n", "version": "v",
            "createdDate": "c", "handler": "h", "region": "r",
            "description": "d", "defaultDeploymentPipelineId": "x",
            "deploymentPipelineIds": [], "type": "t", "updatedAt": "u",
            "gitProvider": "github", "gitOrganization": null,
            "repository": "repo", "branch": "main", "secretRef": null
        }))
        .unwrap();
        assert_eq!(p.git_provider.as_deref(), Some("github"));
        assert!(p.git_organization.is_none());
        assert_eq!(p.branch.as_deref(), Some("main"));
    }

    #[test]
    fn project_missing_required_field_fails() {
        let res: Result<Project, _> = serde_json::from_value(json!({"id": "p1"}));
        assert!(res.is_err());
    }

    #[test]
    fn environment_snake_case() {
        let e: Environment = serde_json::from_value(json!({
            "id": "e1",
            "created_at": "2024-01-01",
            "organization_id": 42,
            "organization_uuid": "uuid",
            "env_name": "Development",
            "region": "US",
            "choreo_env": "dev",
            "cluster_id": "c1",
            "docker_credential_uuid": "d1",
            "external_apim_env_name": "ext",
            "internal_apim_env_name": "int",
            "sandbox_apim_env_name": "sbx",
            "critical": false,
            "dns_prefix": "dev",
            "pdp_web_app_dns_prefix": "pdp",
            "deletion_status": "NONE",
            "sandbox": true
        }))
        .unwrap();
        assert_eq!(e.organization_id, 42);
        assert!(e.sandbox);
        assert!(!e.critical);
    }

    #[test]
    fn organization_owner_nested() {
        let o: Organization = serde_json::from_value(json!({
            "id": "1", "uuid": "u", "handle": "acme", "name": "Acme",
            "owner": {"id": "o1", "idpId": "idp", "createdAt": "now"}
        }))
        .unwrap();
        assert_eq!(o.owner.idp_id, "idp");
    }

    #[test]
    fn project_serializes_with_wire_names() {
        let p = Project {
            id: "p1".into(),
            org_id: 1,
            name: "n".into(),
            version: "v".into(),
            created_date: "c".into(),
            handler: "h".into(),
            region: "r".into(),
            description: "d".into(),
            default_deployment_pipeline_id: "x".into(),
            deployment_pipeline_ids: vec![],
            project_type: "t".into(),
            git_provider: None,
            git_organization: None,
            repository: None,
            branch: None,
            secret_ref: None,
            updated_at: "u".into(),
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["orgId"], json!(1));
        assert_eq!(v["type"], json!("t"));
        assert!(v.get("project_type").is_none());
    }
}
