//! Application wiring.
//!
//! Builds the file-backed repositories, the CRM client and the three stores
//! from one resolved [`CrewdeckPaths`] and [`RootConfig`].

use crewdeck_core::clock::Clock;
use crewdeck_core::config::RootConfig;
use crewdeck_core::crm::CrmGateway;
use crewdeck_core::error::Result;
use crewdeck_infrastructure::{
    CrewdeckPaths, JsonChatRepository, JsonEventRepository,
    JsonSessionRepository, JsonUserRepository, SecretStorage,
};
use crewdeck_interaction::HubSpotClient;
use std::sync::Arc;

use crate::account_service::AccountService;
use crate::chat_store::ChatStore;
use crate::event_store::EventStore;
use crate::session_store::SessionStore;

/// Everything a front end needs, wired together.
pub struct CrewdeckApp {
    pub paths: CrewdeckPaths,
    pub config: RootConfig,
    pub crm: Arc<dyn CrmGateway>,
    /// Whether a CRM access token was found.
    pub crm_configured: bool,
    pub accounts: Arc<AccountService>,
    pub session: Arc<SessionStore>,
    pub events: EventStore,
    pub chat: ChatStore,
}

impl CrewdeckApp {
    /// Wires every store over `paths`. The persisted session is restored and
    /// empty stores are seeded when `config.storage.seed_demo_data` is set.
    pub async fn bootstrap(
        paths: CrewdeckPaths,
        config: RootConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        tracing::debug!("[CrewdeckApp] Data directory: {}", paths.data_dir().display());

        let secrets = SecretStorage::new(&paths);
        let client = HubSpotClient::try_from_storage(&config.crm, &secrets)?;
        let crm_configured = client.is_configured();
        let crm: Arc<dyn CrmGateway> = Arc::new(client);

        let mut accounts = AccountService::new(Arc::new(JsonUserRepository::new(paths.users_file())))
            .with_clock(clock.clone())
            .link_contacts_on_signup(config.crm.create_contact_on_signup);
        if crm_configured {
            accounts = accounts.with_crm(crm.clone());
        }
        let accounts = Arc::new(accounts);

        let session = Arc::new(SessionStore::new(
            accounts.clone(),
            Arc::new(JsonSessionRepository::new(paths.session_file())),
        ));
        session.restore().await?;

        let seed = config.storage.seed_demo_data;
        let events = EventStore::load(
            Arc::new(JsonEventRepository::new(paths.events_file())),
            clock.clone(),
            seed,
        )
        .await?;
        let chat = ChatStore::load(
            Arc::new(JsonChatRepository::new(paths.chat_file())),
            session.clone(),
            clock,
            &config.chat,
            seed,
        )
        .await?;

        tracing::info!("[CrewdeckApp] Ready (crm configured: {})", crm_configured);
        Ok(Self {
            paths,
            config,
            crm,
            crm_configured,
            accounts,
            session,
            events,
            chat,
        })
    }
}
