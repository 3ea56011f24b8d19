//! CRM boundary.
//!
//! The CRM is an external collaborator reached over HTTP. Everything that can
//! go wrong on the way (transport, HTTP status, unreadable body) arrives as a
//! single [`CrmFailure`] shape.
//!
//! # Module Structure
//!
//! - `model`: request and response shapes, failure type
//! - `gateway`: the async trait implemented by the HTTP client

mod gateway;
mod model;

pub use gateway::CrmGateway;
pub use model::{
    AccountSummary, ConnectionReport, ContactInput, ContactSearch, CrmFailure, CrmObject,
    CrmResult, CustomObjectSummary, NextPage, ObjectKind, ObjectPage, ObjectSchema, PageRequest,
    Paging, Pipeline, PipelineObject, PipelineStage, STANDARD_OBJECT_TYPES, SchemaCatalog,
    SearchMatch, StandardObjectSummary, TOKEN_NOT_CONFIGURED,
};

/// Contact properties fetched when syncing an account with its CRM contact.
pub const SYNC_CONTACT_PROPERTIES: &[&str] = &[
    "email",
    "firstname",
    "lastname",
    "company",
    "phone",
    "jobtitle",
    "city",
    "state",
    "country",
];
