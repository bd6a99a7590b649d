//! Repository, branch, commit, and pull request operations.
//!
//! Branch and commit creation resolve the named ref to its head commit
//! first and mutate second; a ref that resolves to nothing fails the
//! operation before any update is issued.

use async_trait::async_trait;
use opshub_core::types::{ContentEncoding, FieldMap, FileChange};
use opshub_core::{Error, RepositoryProvider, Result};
use serde_json::{json, Value};
use tracing::debug;

use crate::client::DevOpsClient;
use crate::url::Endpoint;

/// Sentinel object id for a ref that does not exist yet.
const ZERO_OBJECT_ID: &str = "0000000000000000000000000000000000000000";

impl DevOpsClient {
    fn repo_endpoint(&self, project: Option<&str>, resource: String) -> Endpoint {
        Endpoint::scoped(self.project_scope(project), resource)
    }

    fn items_endpoint(
        &self,
        project: Option<&str>,
        repository: &str,
        path_key: &'static str,
        path: &str,
        branch: Option<&str>,
    ) -> Endpoint {
        let mut endpoint = self
            .repo_endpoint(project, format!("git/repositories/{}/items", repository))
            .param(path_key, path);
        if let Some(branch) = branch {
            endpoint = endpoint
                .param("versionDescriptor.version", branch)
                .param("versionDescriptor.versionType", "branch");
        }
        endpoint
    }

    /// Resolve a branch name to its head commit id.
    async fn resolve_branch_head(
        &self,
        project: Option<&str>,
        repository: &str,
        branch: &str,
    ) -> Result<String> {
        let endpoint = self
            .repo_endpoint(project, format!("git/repositories/{}/refs", repository))
            .param("filter", format!("heads/{}", branch))
            .api_version(&self.versions.git);

        let refs = self.get_json(&endpoint).await?;
        let head = refs["value"]
            .as_array()
            .and_then(|matches| matches.first())
            .ok_or_else(|| Error::NotFound(format!("Branch '{}' not found", branch)))?;
        head["objectId"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| Error::InvalidData("Resolved ref carries no objectId".to_string()))
    }
}

/// One entry of a push's `changes` array. Deletes carry no new content.
fn change_payload(change: &FileChange) -> Value {
    let mut payload = json!({
        "changeType": change.change_type,
        "item": { "path": change.path },
    });
    if let Some(content) = &change.content {
        payload["newContent"] = json!({
            "content": content,
            "contentType": match change.encoding {
                ContentEncoding::Base64 => "base64encoded",
                ContentEncoding::Raw => "rawtext",
            },
        });
    }
    payload
}

#[async_trait]
impl RepositoryProvider for DevOpsClient {
    async fn list_repositories(&self, project: Option<&str>) -> Result<Value> {
        let endpoint = self
            .repo_endpoint(project, "git/repositories".to_string())
            .api_version(&self.versions.git);
        self.get_json(&endpoint).await
    }

    async fn get_repository(&self, project: Option<&str>, repository: &str) -> Result<Value> {
        let endpoint = self
            .repo_endpoint(project, format!("git/repositories/{}", repository))
            .api_version(&self.versions.git);
        self.get_json(&endpoint).await
    }

    async fn get_file_content(
        &self,
        project: Option<&str>,
        repository: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Value> {
        let endpoint = self
            .items_endpoint(project, repository, "path", path, branch)
            .param("includeContent", "true")
            .api_version(&self.versions.git);
        self.get_json(&endpoint).await
    }

    async fn get_item_metadata(
        &self,
        project: Option<&str>,
        repository: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Value> {
        let endpoint = self
            .items_endpoint(project, repository, "path", path, branch)
            .api_version(&self.versions.git);
        self.get_json(&endpoint).await
    }

    async fn get_folder_contents(
        &self,
        project: Option<&str>,
        repository: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Value> {
        let endpoint = self
            .items_endpoint(project, repository, "scopePath", path, branch)
            .api_version(&self.versions.git);
        self.get_json(&endpoint).await
    }

    async fn list_branches(&self, project: Option<&str>, repository: &str) -> Result<Value> {
        let endpoint = self
            .repo_endpoint(project, format!("git/repositories/{}/refs", repository))
            .param("filter", "heads/")
            .api_version(&self.versions.git);
        self.get_json(&endpoint).await
    }

    async fn create_branch(
        &self,
        project: Option<&str>,
        repository: &str,
        name: &str,
        source_branch: &str,
    ) -> Result<Value> {
        debug!(repository = repository, name = name, "Creating branch");

        let head = self
            .resolve_branch_head(project, repository, source_branch)
            .await?;

        let endpoint = self
            .repo_endpoint(project, format!("git/repositories/{}/refs", repository))
            .api_version(&self.versions.git);
        let payload = json!([{
            "name": format!("refs/heads/{}", name),
            "oldObjectId": ZERO_OBJECT_ID,
            "newObjectId": head,
        }]);
        self.post_json(&endpoint, &payload).await
    }

    async fn create_commit(
        &self,
        project: Option<&str>,
        repository: &str,
        branch: &str,
        comment: &str,
        changes: Vec<FileChange>,
    ) -> Result<Value> {
        debug!(
            repository = repository,
            branch = branch,
            changes = changes.len(),
            "Creating commit"
        );

        let head = self.resolve_branch_head(project, repository, branch).await?;

        let endpoint = self
            .repo_endpoint(project, format!("git/repositories/{}/pushes", repository))
            .api_version(&self.versions.git);
        let payload = json!({
            "refUpdates": [{
                "name": format!("refs/heads/{}", branch),
                "oldObjectId": head,
            }],
            "commits": [{
                "comment": comment,
                "changes": changes.iter().map(change_payload).collect::<Vec<_>>(),
            }],
        });
        self.post_json(&endpoint, &payload).await
    }

    async fn create_pull_request(
        &self,
        project: Option<&str>,
        repository: &str,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Value> {
        debug!(
            repository = repository,
            source = source_branch,
            target = target_branch,
            "Creating pull request"
        );

        let endpoint = self
            .repo_endpoint(
                project,
                format!("git/repositories/{}/pullrequests", repository),
            )
            .api_version(&self.versions.pull_requests);
        let payload = json!({
            "sourceRefName": format!("refs/heads/{}", source_branch),
            "targetRefName": format!("refs/heads/{}", target_branch),
            "title": title,
            "description": description.unwrap_or(""),
        });
        self.post_json(&endpoint, &payload).await
    }

    async fn get_pull_request(
        &self,
        project: Option<&str>,
        repository: &str,
        pull_request_id: i64,
    ) -> Result<Value> {
        let endpoint = self
            .repo_endpoint(
                project,
                format!(
                    "git/repositories/{}/pullrequests/{}",
                    repository, pull_request_id
                ),
            )
            .api_version(&self.versions.pull_requests);
        self.get_json(&endpoint).await
    }

    async fn update_pull_request(
        &self,
        project: Option<&str>,
        repository: &str,
        pull_request_id: i64,
        updates: FieldMap,
    ) -> Result<Value> {
        let endpoint = self
            .repo_endpoint(
                project,
                format!(
                    "git/repositories/{}/pullrequests/{}",
                    repository, pull_request_id
                ),
            )
            .api_version(&self.versions.pull_requests);
        self.patch_json(&endpoint, &Value::Object(updates)).await
    }

    async fn list_pull_requests(
        &self,
        project: Option<&str>,
        repository: &str,
        status: Option<&str>,
    ) -> Result<Value> {
        let endpoint = self
            .repo_endpoint(
                project,
                format!("git/repositories/{}/pullrequests", repository),
            )
            .opt_param("searchCriteria.status", status)
            .api_version(&self.versions.pull_requests);
        self.get_json(&endpoint).await
    }
}

// =============================================================================
// Tests
// =============================================================================
