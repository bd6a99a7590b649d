//! Patch document construction for work item style endpoints.
//!
//! A patch document is an ordered list of field-level operations, each
//! addressing `/fields/{key}`. Creation uses `add` for every field,
//! update uses `replace` — the remote distinguishes adding a field that
//! does not exist yet from replacing one that does. Values pass through
//! opaquely; no coercion happens here.

use opshub_core::types::FieldMap;
use serde::Serialize;
use serde_json::Value;

/// Content type the remote expects for patch documents.
pub const PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

/// Operation kind of a patch entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    /// Field does not exist yet (creation, or upsert of an optional field).
    Add,
    /// Field exists and is being overwritten (partial update).
    Replace,
}

impl PatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchKind::Add => "add",
            PatchKind::Replace => "replace",
        }
    }
}

/// One field-level patch operation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatchOp {
    pub op: &'static str,
    pub path: String,
    pub value: Value,
}

/// An ordered patch document.
pub type PatchDocument = Vec<PatchOp>;

/// Build a single-field operation.
pub fn field_op(kind: PatchKind, field: &str, value: Value) -> PatchOp {
    PatchOp {
        op: kind.as_str(),
        path: format!("/fields/{}", field),
        value,
    }
}

/// Build one operation per field, in the map's iteration order.
pub fn field_document(kind: PatchKind, fields: &FieldMap) -> PatchDocument {
    fields
        .iter()
        .map(|(key, value)| field_op(kind, key, value.clone()))
        .collect()
}
