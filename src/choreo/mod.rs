//! Choreo management API client.
//!
//! ChoreoClient { base_url, http } -> fetch_projects / fetch_organizations /
//! fetch_components / fetch_environments
//!
//! GraphQL operations POST `{"query": ...}` to the projects service; REST
//! operations GET a resource path. Every request carries the bearer token
//! verbatim. Anything other than 200 is an error carrying the full body.

pub mod models;
pub mod query;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ChoreoError;
pub use models::{Component, Environment, Organization, Project};
use models::{ComponentsData, DataEnvelope, GraphQlResponse, ProjectsData};

pub const DEFAULT_BASE_URL: &str = "https://apis.choreo.dev";

const PROJECTS_GRAPHQL: &[&str] = &["projects", "1.0.0", "graphql"];
const ORGS: &[&str] = &["orgs", "1.0.0", "orgs"];
const ORG_ENVIRONMENTS: &[&str] = &["devops", "1.0.0", "api", "v1", "organizations"];

/// Accept only http(s) URLs that can take path segments.
pub fn check_base_url(base_url: &Url) -> Result<()> {
    match base_url.scheme() {
        "http" | "https" => {}
        other => bail!("unsupported base URL scheme '{other}' (expected http or https)"),
    }
    if base_url.cannot_be_a_base() {
        bail!("base URL cannot carry a path: {base_url}");
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ChoreoClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ChoreoClient {
    /// Build a client for `base_url` (http/https) with a per-request timeout.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        check_base_url(&base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base_url, http })
    }

    /// Projects of an organization (GraphQL).
    pub async fn fetch_projects(
        &self,
        org_id: &str,
        token: &str,
    ) -> Result<Vec<Project>, ChoreoError> {
        let org_id = query::org_id("orgId", org_id)?;
        let body = query::payload(query::projects(org_id));
        let response: GraphQlResponse<ProjectsData> = self
            .send(self.graphql(body), token)
            .await?;
        unwrap_graphql(response, |d| d.projects)
    }

    /// Organizations visible to the token (REST, bare array).
    pub async fn fetch_organizations(&self, token: &str) -> Result<Vec<Organization>, ChoreoError> {
        let url = self.endpoint(ORGS, &[]);
        self.send(self.http.request(Method::GET, url), token).await
    }

    /// Components of a project (GraphQL).
    pub async fn fetch_components(
        &self,
        org_handle: &str,
        project_id: &str,
        token: &str,
    ) -> Result<Vec<Component>, ChoreoError> {
        let org_handle = query::non_empty("orgHandle", org_handle)?;
        let project_id = query::non_empty("projectId", project_id)?;
        let body = query::payload(query::components(org_handle, project_id));
        let response: GraphQlResponse<ComponentsData> = self
            .send(self.graphql(body), token)
            .await?;
        unwrap_graphql(response, |d| d.components)
    }

    /// Environment templates of an organization (REST, `{"data":[...]}`).
    pub async fn fetch_environments(
        &self,
        org_id: &str,
        token: &str,
    ) -> Result<Vec<Environment>, ChoreoError> {
        let org_id = query::org_id("orgId", org_id)?;
        let url = self.endpoint(ORG_ENVIRONMENTS, &[org_id, "environment-templates"]);
        let envelope: DataEnvelope<Environment> = self
            .send(self.http.request(Method::GET, url), token)
            .await?;
        Ok(envelope.data)
    }

    /* ---- Request plumbing ---- */

    fn graphql(&self, body: serde_json::Value) -> RequestBuilder {
        self.http
            .request(Method::POST, self.endpoint(PROJECTS_GRAPHQL, &[]))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
    }

    /// Append path segments to the base URL. Dynamic segments are
    /// percent-encoded by `url`.
    fn endpoint(&self, fixed: &[&str], dynamic: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(fixed);
            segments.extend(dynamic);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: &str,
    ) -> Result<T, ChoreoError> {
        let response = request
            .header(ACCEPT, "application/json")
            .bearer_auth(token)
            .send()
            .await
            .map_err(ChoreoError::Transport)?;

        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "choreo response");

        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(ChoreoError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(ChoreoError::Transport)?;
        serde_json::from_slice(&bytes).map_err(ChoreoError::Decode)
    }
}

/// Take the selected list out of a GraphQL response.
///
/// `errors` wins whenever the list itself is absent or null, whether or not
/// `data` came back. A null list without errors is an empty result.
fn unwrap_graphql<T, R>(
    response: GraphQlResponse<T>,
    select: impl FnOnce(T) -> Option<Vec<R>>,
) -> Result<Vec<R>, ChoreoError> {
    let GraphQlResponse { data, errors } = response;
    let had_data = data.is_some();
    match data.and_then(select) {
        Some(records) => Ok(records),
        None if !errors.is_empty() => Err(ChoreoError::GraphQl {
            messages: errors.into_iter().map(|e| e.message).collect(),
        }),
        None if had_data => Ok(Vec::new()),
        None => Err(ChoreoError::Decode(<serde_json::Error as serde::de::Error>::missing_field(
            "data",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client_for(server: &MockServer) -> ChoreoClient {
        ChoreoClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(5)).unwrap()
    }

    fn project_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "orgId": 123,
            "name": "demo",
            "version": "1.0.0",
            "createdDate": "2024-01-01T00:00:00Z",
            "handler": "demo",
            "region": "US",
            "description": "demo project",
            "defaultDeploymentPipelineId": "dp1",
            "deploymentPipelineIds": ["dp1"],
            "type": "MONO_REPO",
            "gitProvider": null,
            "updatedAt": "2024-01-02T00:00:00Z"
        })
    }

    #[test]
    fn rejects_non_http_base() {
        let err = ChoreoClient::new(
            Url::parse("ftp://example.com").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported base URL scheme"));
    }

    #[test]
    fn endpoint_keeps_base_prefix_and_encodes_ids() {
        let client = ChoreoClient::new(
            Url::parse("https://gw.example.com/choreo/").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        let url = client.endpoint(ORG_ENVIRONMENTS, &["a/b", "environment-templates"]);
        assert_eq!(
            url.as_str(),
            "https://gw.example.com/choreo/devops/1.0.0/api/v1/organizations/a%2Fb/environment-templates"
        );
    }

    #[tokio::test]
    async fn fetch_projects_decodes_single_project() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/1.0.0/graphql"))
            .and(header("authorization", "Bearer tok"))
            .and(header("accept", "application/json"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "query": query::projects("123") })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"projects": [project_json("p1")]}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let projects = client_for(&server).fetch_projects("123", "tok").await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "p1");
        assert_eq!(projects[0].org_id, 123);
        assert!(projects[0].git_provider.is_none());
    }

    #[tokio::test]
    async fn fetch_organizations_401_is_remote_error() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/1.0.0/orgs"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_organizations("tok")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid credentials"));
    }

    #[tokio::test]
    async fn fetch_organizations_bare_array() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/1.0.0/orgs"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "42", "uuid": "u-42", "handle": "acme", "name": "Acme",
                "owner": {"id": "o1", "idpId": "idp-1", "createdAt": "2024-01-01"}
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let orgs = client_for(&server).fetch_organizations("tok").await.unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].handle, "acme");
        assert_eq!(orgs[0].owner.idp_id, "idp-1");
    }

    #[tokio::test]
    async fn fetch_components_sends_escaped_query() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/1.0.0/graphql"))
            .and(body_json(json!({
                "query": query::components("ac\"me", "p1")
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"components": [{
                    "projectId": "p1", "id": "c1", "name": "api",
                    "status": "ACTIVE", "handler": "api",
                    "displayName": "API", "displayType": "service"
                }]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let comps = client_for(&server)
            .fetch_components("ac\"me", "p1", "tok")
            .await
            .unwrap();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].display_type, "service");
    }

    #[tokio::test]
    async fn fetch_environments_data_envelope() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/devops/1.0.0/api/v1/organizations/42/environment-templates",
            ))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{
                "id": "e1",
                "created_at": "2024-01-01",
                "organization_id": 42,
                "organization_uuid": "u-42",
                "env_name": "Development",
                "region": "US",
                "choreo_env": "dev",
                "cluster_id": "c1",
                "docker_credential_uuid": "d1",
                "external_apim_env_name": "ext",
                "internal_apim_env_name": "int",
                "sandbox_apim_env_name": "sbx",
                "critical": true,
                "dns_prefix": "dev",
                "pdp_web_app_dns_prefix": "pdp",
                "deletion_status": "NONE",
                "sandbox": false
            }]})))
            .expect(1)
            .mount(&server)
            .await;

        let envs = client_for(&server).fetch_environments("42", "tok").await.unwrap();
        assert_eq!(envs.len(), 1);
        assert!(envs[0].critical);
        assert_eq!(envs[0].env_name, "Development");
    }

    #[tokio::test]
    async fn unexpected_envelope_is_decode_error() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/devops/1.0.0/api/v1/organizations/42/environment-templates",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/projects/1.0.0/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"other": []}})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_environments("42", "tok").await.unwrap_err();
        assert!(matches!(err, ChoreoError::Decode(_)), "{err}");
        let err = client.fetch_projects("42", "tok").await.unwrap_err();
        assert!(matches!(err, ChoreoError::Decode(_)), "{err}");
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/1.0.0/orgs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_organizations("tok")
            .await
            .unwrap_err();
        assert!(matches!(err, ChoreoError::Decode(_)));
    }

    #[tokio::test]
    async fn graphql_errors_surface_messages() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/1.0.0/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{"message": "Organization not found"}]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_projects("7", "tok")
            .await
            .unwrap_err();
        match err {
            ChoreoError::GraphQl { messages } => {
                assert_eq!(messages, vec!["Organization not found".to_string()])
            }
            other => panic!("expected GraphQl error, got {other}"),
        }
    }

    #[tokio::test]
    async fn graphql_errors_with_null_selection() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/1.0.0/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"projects": null},
                "errors": [{"message": "Organization not found"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_projects("7", "tok")
            .await
            .unwrap_err();
        assert!(
            matches!(&err, ChoreoError::GraphQl { messages } if messages == &["Organization not found"]),
            "{err}"
        );
        assert!(err.to_string().contains("Organization not found"));
    }

    #[tokio::test]
    async fn null_components_without_errors_is_empty() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/1.0.0/graphql"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"components": null}})),
            )
            .mount(&server)
            .await;

        let components = client_for(&server)
            .fetch_components("acme", "p1", "tok")
            .await
            .unwrap();
        assert!(components.is_empty());
    }

    #[tokio::test]
    async fn invalid_org_id_makes_no_request() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .fetch_projects("1){x}\"", "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, ChoreoError::Argument(_)));
        let err = client
            .fetch_environments("../admin", "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, ChoreoError::Argument(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let client = ChoreoClient::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.fetch_organizations("tok").await.unwrap_err();
        assert!(matches!(err, ChoreoError::Transport(_)));
    }
}
