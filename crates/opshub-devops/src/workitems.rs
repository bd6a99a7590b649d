//! Work item operations.
//!
//! Creation posts an `add` patch document against the project-scoped
//! endpoint and extracts the new identifier; updates patch the org-scoped
//! endpoint with `replace` operations. Tags live in the `System.Tags`
//! field as a `;`-delimited string and are mutated read-modify-write.

use async_trait::async_trait;
use opshub_core::types::FieldMap;
use opshub_core::{Error, Result, WorkItemProvider};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use crate::client::DevOpsClient;
use crate::patch::{field_document, field_op, PatchKind};
use crate::tags;
use crate::url::Endpoint;

/// Work item field holding the delimited tag string.
const TAGS_FIELD: &str = "System.Tags";

impl DevOpsClient {
    fn work_item_endpoint(&self, id: i64) -> Endpoint {
        Endpoint::org(format!("wit/workitems/{}", id)).api_version(&self.versions.work_items)
    }

    fn comments_endpoint(&self, id: i64) -> Endpoint {
        Endpoint::org(format!("wit/workitems/{}/comments", id))
            .api_version(&self.versions.work_items)
    }

    /// Current tag set, parsed from the fetched item's `System.Tags` field.
    async fn work_item_tags(&self, id: i64) -> Result<Vec<String>> {
        let item = self.get_work_item(id).await?;
        Ok(tags::parse(&item["fields"][TAGS_FIELD]))
    }

    /// Write the whole tag set back as one field patch.
    ///
    /// The `add` kind upserts, so this works on items that have never been
    /// tagged. No concurrency token is exchanged: two callers racing on the
    /// same item can lose an update, and the later write wins.
    async fn write_work_item_tags(&self, id: i64, all: &[String]) -> Result<()> {
        let document = vec![field_op(PatchKind::Add, TAGS_FIELD, json!(tags::join(all)))];
        self.send_document(Method::PATCH, &self.work_item_endpoint(id), &document)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WorkItemProvider for DevOpsClient {
    async fn create_work_item(
        &self,
        project: &str,
        item_type: &str,
        fields: FieldMap,
    ) -> Result<i64> {
        debug!(project = project, item_type = item_type, "Creating work item");

        let endpoint = Endpoint::scoped(Some(project), format!("wit/workitems/${}", item_type))
            .api_version(&self.versions.work_items);
        let document = field_document(PatchKind::Add, &fields);

        let created = self
            .send_document(Method::POST, &endpoint, &document)
            .await?;
        created["id"].as_i64().ok_or_else(|| {
            Error::InvalidData("Create work item response carries no integer id".to_string())
        })
    }

    async fn get_work_item(&self, id: i64) -> Result<Value> {
        self.get_json(&self.work_item_endpoint(id)).await
    }

    async fn update_work_item(&self, id: i64, fields: FieldMap) -> Result<Value> {
        debug!(id = id, fields = fields.len(), "Updating work item");

        let document = field_document(PatchKind::Replace, &fields);
        self.send_document(Method::PATCH, &self.work_item_endpoint(id), &document)
            .await
    }

    async fn delete_work_item(&self, id: i64) -> Result<Value> {
        debug!(id = id, "Deleting work item");
        self.delete_json(&self.work_item_endpoint(id)).await
    }

    async fn get_work_item_tags(&self, id: i64) -> Result<Value> {
        let current = self.work_item_tags(id).await?;
        Ok(json!(current))
    }

    async fn add_work_item_tags(&self, id: i64, tags: Vec<String>) -> Result<Value> {
        let existing = self.work_item_tags(id).await?;
        let merged = tags::union(&existing, &tags);
        self.write_work_item_tags(id, &merged).await?;
        Ok(json!({ "success": true, "tags": merged }))
    }

    async fn remove_work_item_tags(&self, id: i64, tags: Vec<String>) -> Result<Value> {
        let existing = self.work_item_tags(id).await?;
        let remaining = tags::difference(&existing, &tags);
        self.write_work_item_tags(id, &remaining).await?;
        Ok(json!({ "success": true, "tags": remaining }))
    }

    async fn get_work_item_comments(&self, id: i64) -> Result<Value> {
        let response = self.get_json(&self.comments_endpoint(id)).await?;
        response.get("comments").cloned().ok_or_else(|| {
            Error::InvalidData("Comments response carries no comments array".to_string())
        })
    }

    async fn add_work_item_comment(&self, id: i64, text: &str) -> Result<Value> {
        debug!(id = id, "Adding work item comment");
        self.post_json(&self.comments_endpoint(id), &json!({ "text": text }))
            .await
    }
}

// =============================================================================
// Tests
// =============================================================================
