//! Account directory service.
//!
//! `AccountService` owns stored accounts (email, salted password hash and
//! public identity) behind a [`UserRepository`], and optionally links each
//! account to a CRM contact.

use async_trait::async_trait;
use crewdeck_core::clock::{Clock, SystemClock};
use crewdeck_core::crm::{ContactInput, CrmFailure, CrmGateway, SYNC_CONTACT_PROPERTIES};
use crewdeck_core::error::{AuthErrorKind, CrewError, Result};
use crewdeck_core::user::{
    CrmSyncOutcome, IdentityService, LoginCredentials, Preferences, SignupData, User,
    UserRecord, UserRepository, UserUpdate, split_display_name,
};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// [`IdentityService`] backed by a user repository and an optional CRM.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    crm: Option<Arc<dyn CrmGateway>>,
    clock: Arc<dyn Clock>,
    /// Create a CRM contact for accounts that sign up without one.
    link_contacts_on_signup: bool,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            crm: None,
            clock: Arc::new(SystemClock),
            link_contacts_on_signup: true,
        }
    }

    pub fn with_crm(mut self, crm: Arc<dyn CrmGateway>) -> Self {
        self.crm = Some(crm);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn link_contacts_on_signup(mut self, enabled: bool) -> Self {
        self.link_contacts_on_signup = enabled;
        self
    }

    /// Removes every stored account.
    pub async fn clear_users(&self) -> Result<()> {
        self.users.clear().await?;
        tracing::info!("[AccountService] Cleared all users");
        Ok(())
    }

    fn crm(&self) -> Result<&Arc<dyn CrmGateway>> {
        self.crm
            .as_ref()
            .ok_or_else(|| CrmFailure::not_configured().into())
    }

    async fn record(&self, user_id: &str) -> Result<UserRecord> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CrewError::not_found("user", user_id))
    }

    /// Creates or updates the CRM contact for a new account.
    ///
    /// Best effort: any failure is logged and the account goes unlinked.
    async fn link_contact(&self, data: &SignupData) -> Option<String> {
        let crm = self.crm.as_ref()?;
        let (first, last) = split_display_name(&data.name);
        let input = ContactInput {
            email: data.email.clone(),
            firstname: Some(first),
            lastname: Some(last),
            phone: data.phone.clone(),
            company: data.company.clone(),
            properties: BTreeMap::from([
                ("jobtitle".to_string(), data.role.to_string()),
                ("hs_lead_status".to_string(), "NEW".to_string()),
                ("lifecyclestage".to_string(), "lead".to_string()),
            ]),
        };
        match crm.upsert_contact(&input).await {
            Ok(contact) => {
                tracing::info!("[AccountService] Linked CRM contact {}", contact.id);
                Some(contact.id)
            }
            Err(e) => {
                tracing::warn!(
                    "[AccountService] Failed to create CRM contact for {}: {}",
                    data.email,
                    e
                );
                None
            }
        }
    }
}

#[async_trait]
impl IdentityService for AccountService {
    async fn login(&self, credentials: LoginCredentials) -> Result<User> {
        let Some(mut record) = self.users.find_by_email(&credentials.email).await? else {
            return Err(CrewError::auth(AuthErrorKind::InvalidCredentials));
        };
        if hash_password(&record.password_salt, &credentials.password) != record.password_hash {
            return Err(CrewError::auth(AuthErrorKind::InvalidCredentials));
        }

        let now = self.clock.now();
        record.user.last_seen = now;
        record.user.is_online = true;
        record.user.updated_at = now;
        self.users.save(record.clone()).await?;

        tracing::info!("[AccountService] User {} logged in", record.user.id);
        Ok(record.user)
    }

    async fn signup(&self, data: SignupData) -> Result<User> {
        data.validate()?;
        // Early exit before touching the CRM; `save` enforces uniqueness.
        if self.users.find_by_email(&data.email).await?.is_some() {
            return Err(CrewError::auth(AuthErrorKind::EmailAlreadyExists));
        }

        let crm_contact_id = match data.crm_contact_id.clone() {
            Some(id) => Some(id),
            None if self.link_contacts_on_signup => self.link_contact(&data).await,
            None => None,
        };

        let now = self.clock.now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: data.email,
            name: data.name,
            avatar: None,
            role: data.role,
            service_type: data.service_type,
            company: data.company,
            phone: data.phone,
            bio: None,
            location: None,
            is_online: true,
            last_seen: now,
            preferences: Preferences::default(),
            crm_contact_id,
            crm_deal_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let salt = Uuid::new_v4().simple().to_string();
        let record = UserRecord {
            password_hash: hash_password(&salt, &data.password),
            password_salt: salt,
            user: user.clone(),
        };
        self.users.save(record).await?;

        tracing::info!("[AccountService] Created user {}", user.id);
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        Ok(self.record(user_id).await?.user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let records = self.users.list_all().await?;
        Ok(records.into_iter().map(|r| r.user).collect())
    }

    async fn update_user(&self, user_id: &str, update: UserUpdate) -> Result<User> {
        let mut record = self.record(user_id).await?;
        update.apply(&mut record.user, self.clock.now())?;
        // The repository rejects an email already held by another account.
        self.users.save(record.clone()).await?;

        tracing::debug!("[AccountService] Updated user {}", user_id);
        Ok(record.user)
    }

    async fn sync_with_crm(&self, user_id: &str) -> Result<CrmSyncOutcome> {
        let mut record = self.record(user_id).await?;
        let Some(contact_id) = record.user.crm_contact_id.clone() else {
            return Err(CrewError::validation(
                "user is not linked to a CRM contact",
            ));
        };
        let crm = self.crm()?;

        let contact = crm
            .get_contact(&contact_id, SYNC_CONTACT_PROPERTIES)
            .await?;
        let deal_ids = match crm.contact_deal_ids(&contact_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    "[AccountService] Failed to fetch deals for contact {}: {}",
                    contact_id,
                    e
                );
                Vec::new()
            }
        };

        let full_name = format!(
            "{} {}",
            contact.property("firstname").unwrap_or_default(),
            contact.property("lastname").unwrap_or_default()
        );
        let user = &mut record.user;
        if !full_name.trim().is_empty() {
            user.name = full_name.trim().to_string();
        }
        if let Some(company) = contact.property("company") {
            user.company = Some(company.to_string());
        }
        user.crm_deal_ids = deal_ids;
        user.updated_at = self.clock.now();
        self.users.save(record.clone()).await?;

        let deal_count = record.user.crm_deal_ids.len();
        tracing::info!(
            "[AccountService] Synced user {} with CRM ({} deals)",
            user_id,
            deal_count
        );
        Ok(CrmSyncOutcome {
            user: record.user,
            contact_properties: contact.properties,
            deal_count,
        })
    }
}
