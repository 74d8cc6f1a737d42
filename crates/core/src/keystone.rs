//! OpenStack Keystone API client.
//!
//! Talks to the Keystone v3 identity endpoints with the observer service
//! account to enumerate Cloud VPS projects and their role assignments. Only
//! the read-only surface these tools need is implemented.

use std::collections::HashSet;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::KeystoneConfig;
use crate::errors::KeystoneError;

/// Role name to role id, in scan order. Role ids are opaque and fixed for
/// the WMCS deployment.
pub const ROLES: [(&str, &str); 5] = [
    ("admin", "2cd63d467f754404bf3746fe63ee0698"),
    ("glanceadmin", "1102f4ff63c3435793d0e4340bf4b04e"),
    ("observer", "47a8370618ea42d49f7047774e75d262"),
    ("projectadmin", "4d8cad783d6342efa8414d7d36fbc034"),
    ("user", "f473273fac7146b3bdbf22e5d4504f95"),
];

/// Service accounts excluded from every role's user list.
const SERVICE_ACCOUNTS: [&str; 2] = ["novaadmin", "novaobserver"];

/// The magic admin project is never part of the project pool.
const RESERVED_PROJECT: &str = "admin";

/// A Keystone project.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectList {
    projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
struct RoleAssignmentList {
    role_assignments: Vec<RoleAssignment>,
}

#[derive(Debug, Deserialize)]
struct RoleAssignment {
    /// Absent for group-scoped assignments, which these tools ignore.
    user: Option<AssignedUser>,
}

#[derive(Debug, Deserialize)]
struct AssignedUser {
    id: String,
}

/// Attribute each user id to the first role it appears under.
///
/// `raw` holds the fetched user ids per role in scan order. The exclusion
/// set starts with the service accounts and accumulates every id already
/// attributed, so an id assigned to several roles within one project shows
/// up under the earliest role only.
pub fn partition_role_users(
    raw: Vec<(&'static str, Vec<String>)>,
) -> Vec<(&'static str, Vec<String>)> {
    let mut seen: HashSet<String> = SERVICE_ACCOUNTS.iter().map(|s| s.to_string()).collect();
    raw.into_iter()
        .map(|(role, ids)| {
            let kept: Vec<String> = ids.into_iter().filter(|id| !seen.contains(id)).collect();
            seen.extend(kept.iter().cloned());
            (role, kept)
        })
        .collect()
}

/// Read-only Keystone v3 client holding an authenticated token.
pub struct KeystoneClient {
    http: reqwest::Client,
    auth_url: String,
    token: String,
}

impl KeystoneClient {
    /// Authenticate with the configured observer credential and return a
    /// client scoped to the configured project.
    pub async fn authenticate(config: &KeystoneConfig) -> Result<Self, KeystoneError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let auth_url = config.auth_url.trim_end_matches('/').to_string();

        let body = serde_json::json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": config.username,
                            "domain": { "name": config.user_domain },
                            "password": config.password,
                        }
                    }
                },
                "scope": {
                    "project": {
                        "id": config.project_id,
                        "domain": { "name": config.project_domain },
                    }
                }
            }
        });

        let response = http
            .post(format!("{}/auth/tokens", auth_url))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(KeystoneError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let token = response
            .headers()
            .get("x-subject-token")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or(KeystoneError::MissingToken)?;

        info!(auth_url = %auth_url, username = %config.username, "authenticated with Keystone");
        Ok(Self {
            http,
            auth_url,
            token,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, KeystoneError> {
        let response = self
            .http
            .get(url)
            .header("X-Auth-Token", &self.token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(KeystoneError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }

    /// All enabled projects except the reserved admin project.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<Project>, KeystoneError> {
        let url = format!("{}/projects?enabled=true", self.auth_url);
        let list: ProjectList = self.get_json(&url).await?;
        let projects: Vec<Project> = list
            .projects
            .into_iter()
            .filter(|p| p.name != RESERVED_PROJECT)
            .collect();
        debug!(count = projects.len(), "listed projects");
        Ok(projects)
    }

    /// User ids assigned the given role within the given project.
    #[instrument(skip(self))]
    pub async fn role_assignments(
        &self,
        project_id: &str,
        role_id: &str,
    ) -> Result<Vec<String>, KeystoneError> {
        let url = format!(
            "{}/role_assignments?scope.project.id={}&role.id={}",
            self.auth_url, project_id, role_id
        );
        let list: RoleAssignmentList = self.get_json(&url).await?;
        Ok(list
            .role_assignments
            .into_iter()
            .filter_map(|a| a.user.map(|u| u.id))
            .collect())
    }

    /// User ids per role for a project, with the running exclusion applied
    /// (see [`partition_role_users`]).
    pub async fn project_users_by_role(
        &self,
        project_id: &str,
    ) -> Result<Vec<(&'static str, Vec<String>)>, KeystoneError> {
        let mut raw = Vec::with_capacity(ROLES.len());
        for (role_name, role_id) in ROLES {
            raw.push((role_name, self.role_assignments(project_id, role_id).await?));
        }
        Ok(partition_role_users(raw))
    }

    /// Deduplicated user ids holding the projectadmin role in any project.
    #[instrument(skip(self))]
    pub async fn project_admins(&self) -> Result<Vec<String>, KeystoneError> {
        let mut admins = Vec::new();
        let mut seen = HashSet::new();
        for project in self.list_projects().await? {
            for (role, users) in self.project_users_by_role(&project.id).await? {
                if role != "projectadmin" {
                    continue;
                }
                for user in users {
                    if seen.insert(user.clone()) {
                        admins.push(user);
                    }
                }
            }
        }
        info!(count = admins.len(), "enumerated project admins");
        Ok(admins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_service_accounts_excluded_everywhere() {
        let raw = vec![
            ("admin", ids(&["novaadmin", "alice"])),
            ("glanceadmin", ids(&["novaobserver"])),
            ("observer", ids(&["novaobserver", "bob"])),
            ("projectadmin", ids(&["novaadmin"])),
            ("user", ids(&[])),
        ];
        let result = partition_role_users(raw);
        assert_eq!(result[0], ("admin", ids(&["alice"])));
        assert_eq!(result[1], ("glanceadmin", ids(&[])));
        assert_eq!(result[2], ("observer", ids(&["bob"])));
        assert_eq!(result[3], ("projectadmin", ids(&[])));
    }

    #[test]
    fn test_exclusion_accumulates_across_roles() {
        // A user holding both observer and projectadmin is attributed to
        // whichever role comes first in scan order.
        let raw = vec![
            ("admin", ids(&[])),
            ("glanceadmin", ids(&[])),
            ("observer", ids(&["xavier"])),
            ("projectadmin", ids(&["xavier", "yolanda"])),
            ("user", ids(&["yolanda"])),
        ];
        let result = partition_role_users(raw);
        assert_eq!(result[2], ("observer", ids(&["xavier"])));
        assert_eq!(result[3], ("projectadmin", ids(&["yolanda"])));
        assert_eq!(result[4], ("user", ids(&[])));
    }

    #[test]
    fn test_roles_scan_order() {
        let names: Vec<&str> = ROLES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["admin", "glanceadmin", "observer", "projectadmin", "user"]
        );
    }

    #[test]
    fn test_role_assignment_without_user_is_skipped() {
        let json = r#"{"role_assignments": [
            {"user": {"id": "alice"}},
            {"group": {"id": "some-group"}}
        ]}"#;
        let list: RoleAssignmentList = serde_json::from_str(json).unwrap();
        let users: Vec<String> = list
            .role_assignments
            .into_iter()
            .filter_map(|a| a.user.map(|u| u.id))
            .collect();
        assert_eq!(users, ids(&["alice"]));
    }
}
