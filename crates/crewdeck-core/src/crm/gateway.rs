//! CRM gateway trait.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::model::{
    ConnectionReport, ContactInput, ContactSearch, CrmObject, CrmResult, ObjectKind, ObjectPage,
    PageRequest, Pipeline, PipelineObject, SchemaCatalog,
};

/// Access to the CRM's contact/deal API.
///
/// Implementations must never panic or leak transport errors: every failure
/// comes back as a [`super::CrmFailure`].
#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Probes account details and contacts access.
    async fn test_connection(&self) -> CrmResult<ConnectionReport>;

    async fn list_objects(&self, kind: &ObjectKind, page: &PageRequest) -> CrmResult<ObjectPage>;

    async fn get_contact(&self, contact_id: &str, properties: &[&str]) -> CrmResult<CrmObject>;

    async fn create_contact(&self, input: &ContactInput) -> CrmResult<CrmObject>;

    async fn update_contact(
        &self,
        contact_id: &str,
        properties: &BTreeMap<String, String>,
    ) -> CrmResult<CrmObject>;

    async fn search_contacts(&self, search: &ContactSearch) -> CrmResult<ObjectPage>;

    async fn list_schemas(&self) -> CrmResult<SchemaCatalog>;

    async fn list_pipelines(&self, object: PipelineObject) -> CrmResult<Vec<Pipeline>>;

    /// Ids of deals associated with a contact.
    async fn contact_deal_ids(&self, contact_id: &str) -> CrmResult<Vec<String>>;

    /// Creates the contact, or updates the one already holding this email.
    async fn upsert_contact(&self, input: &ContactInput) -> CrmResult<CrmObject> {
        let existing = self
            .search_contacts(&ContactSearch::email_exact(&input.email))
            .await?;
        match existing.results.into_iter().next() {
            Some(contact) => {
                self.update_contact(&contact.id, &input.to_properties())
                    .await
            }
            None => self.create_contact(input).await,
        }
    }
}
