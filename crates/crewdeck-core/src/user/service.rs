//! Identity service traits.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::model::{LoginCredentials, SignupData, User, UserUpdate};
use crate::error::Result;

/// Account operations the session store delegates to.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Verifies credentials and marks the account online.
    async fn login(&self, credentials: LoginCredentials) -> Result<User>;

    /// Creates an account. May link a CRM contact on a best-effort basis.
    async fn signup(&self, data: SignupData) -> Result<User>;

    async fn get_user(&self, user_id: &str) -> Result<User>;

    async fn list_users(&self) -> Result<Vec<User>>;

    async fn update_user(&self, user_id: &str, update: UserUpdate) -> Result<User>;

    /// Refreshes name, company and deal ids from the linked CRM contact.
    async fn sync_with_crm(&self, user_id: &str) -> Result<CrmSyncOutcome>;
}

/// Result of [`IdentityService::sync_with_crm`].
#[derive(Debug, Clone, PartialEq)]
pub struct CrmSyncOutcome {
    pub user: User,
    /// Raw contact properties as returned by the CRM.
    pub contact_properties: BTreeMap<String, Option<String>>,
    pub deal_count: usize,
}

/// Read access to whoever is signed in right now.
///
/// The chat store attributes messages and typing indicators through this.
pub trait CurrentUser: Send + Sync {
    fn current_user(&self) -> Option<User>;
}
