//! CRM request/response shapes.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::CrewError;

pub const TOKEN_NOT_CONFIGURED: &str = "CRM token not configured";

/// Object type ids the CRM ships with. Anything else in the schema list is custom.
pub const STANDARD_OBJECT_TYPES: &[&str] = &[
    "contacts",
    "companies",
    "deals",
    "tickets",
    "products",
    "line_items",
];

/// Normalized failure from the CRM boundary.
///
/// Serializes as `{"success": false, "message": ..., "detail"?: ..., "status"?: ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmFailure {
    pub message: String,
    pub detail: Option<String>,
    /// HTTP status when the CRM answered with an error code.
    pub status: Option<u16>,
}

impl CrmFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
            status: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn not_configured() -> Self {
        Self::new(TOKEN_NOT_CONFIGURED)
    }
}

impl fmt::Display for CrmFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.message, detail),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for CrmFailure {}

impl Serialize for CrmFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 2 + usize::from(self.detail.is_some()) + usize::from(self.status.is_some());
        let mut state = serializer.serialize_struct("CrmFailure", len)?;
        state.serialize_field("success", &false)?;
        state.serialize_field("message", &self.message)?;
        if let Some(detail) = &self.detail {
            state.serialize_field("detail", detail)?;
        }
        if let Some(status) = &self.status {
            state.serialize_field("status", status)?;
        }
        state.end()
    }
}

impl From<CrmFailure> for CrewError {
    fn from(failure: CrmFailure) -> Self {
        CrewError::remote(failure.message, failure.detail)
    }
}

pub type CrmResult<T> = std::result::Result<T, CrmFailure>;

/// A listable CRM object collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Contacts,
    Deals,
    /// Custom object type id, e.g. `2-47887496`.
    Custom(String),
}

impl ObjectKind {
    pub fn path_segment(&self) -> &str {
        match self {
            Self::Contacts => "contacts",
            Self::Deals => "deals",
            Self::Custom(id) => id,
        }
    }
}

impl From<&str> for ObjectKind {
    fn from(value: &str) -> Self {
        match value {
            "contacts" => Self::Contacts,
            "deals" => Self::Deals,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// Paging and filtering for a collection fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub after: Option<String>,
    pub properties: Vec<String>,
    /// Free-text query, only honored for contacts.
    pub query: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 10,
            after: None,
            properties: Vec::new(),
            query: None,
        }
    }
}

impl PageRequest {
    /// Query-string pairs in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string())];
        if let Some(after) = &self.after {
            pairs.push(("after", after.clone()));
        }
        if !self.properties.is_empty() {
            pairs.push(("properties", self.properties.join(",")));
        }
        if let Some(query) = &self.query {
            pairs.push(("q", query.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmObject {
    pub id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl CrmObject {
    /// A property value, treating null and empty as absent.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .and_then(|v| v.as_deref())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPage {
    pub after: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<NextPage>,
}

/// One page of a collection or search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default)]
    pub results: Vec<CrmObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl ObjectPage {
    /// Cursor for the following page, if there is one.
    pub fn next_after(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_ref())
            .map(|n| n.after.as_str())
    }
}

/// Contact fields for create/upsert. Empty optional fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    pub email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// Extra properties, applied last.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl ContactInput {
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        props.insert("email".to_string(), self.email.clone());
        let optional = [
            ("firstname", &self.firstname),
            ("lastname", &self.lastname),
            ("phone", &self.phone),
            ("company", &self.company),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                props.insert(key.to_string(), value.clone());
            }
        }
        props.extend(self.properties.clone());
        props
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMatch {
    Exact,
    #[default]
    Token,
}

impl SearchMatch {
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Exact => "EQ",
            Self::Token => "CONTAINS_TOKEN",
        }
    }
}

/// Contact search on a single property, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSearch {
    pub property: String,
    pub value: String,
    pub mode: SearchMatch,
    pub limit: u32,
}

impl ContactSearch {
    /// Token search on email, the default lookup.
    pub fn email_token(value: impl Into<String>) -> Self {
        Self {
            property: "email".to_string(),
            value: value.into(),
            mode: SearchMatch::Token,
            limit: 10,
        }
    }

    pub fn email_exact(email: impl Into<String>) -> Self {
        Self {
            mode: SearchMatch::Exact,
            limit: 1,
            ..Self::email_token(email)
        }
    }

    pub fn to_request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "filterGroups": [{
                "filters": [{
                    "propertyName": self.property,
                    "operator": self.mode.operator(),
                    "value": self.value,
                }]
            }],
            "limit": self.limit,
            "sorts": [{ "propertyName": "createdate", "direction": "DESCENDING" }],
        })
    }
}

/// Subset of account details reported by a connectivity test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    #[serde(default)]
    pub portal_id: Option<u64>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub account: AccountSummary,
    pub contacts_total: Option<u64>,
    pub has_contacts_access: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
    pub object_type_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: serde_json::Value,
    #[serde(default)]
    pub properties: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomObjectSummary {
    pub id: String,
    pub name: String,
    pub labels: serde_json::Value,
    pub property_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardObjectSummary {
    pub id: String,
    pub name: String,
}

/// Schema list split into standard and custom object types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaCatalog {
    pub total_schemas: usize,
    pub custom_objects: Vec<CustomObjectSummary>,
    pub standard_objects: Vec<StandardObjectSummary>,
}

impl SchemaCatalog {
    pub fn from_schemas(schemas: Vec<ObjectSchema>) -> Self {
        let total_schemas = schemas.len();
        let (standard, custom): (Vec<_>, Vec<_>) = schemas
            .into_iter()
            .partition(|s| STANDARD_OBJECT_TYPES.contains(&s.object_type_id.as_str()));

        Self {
            total_schemas,
            custom_objects: custom
                .into_iter()
                .map(|s| CustomObjectSummary {
                    property_count: s.properties.len(),
                    id: s.object_type_id,
                    name: s.name,
                    labels: s.labels,
                })
                .collect(),
            standard_objects: standard
                .into_iter()
                .map(|s| StandardObjectSummary {
                    id: s.object_type_id,
                    name: s.name,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineObject {
    #[default]
    Deals,
    Tickets,
}

impl PipelineObject {
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Deals => "deals",
            Self::Tickets => "tickets",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default)]
    pub stages: Vec<PipelineStage>,
}
