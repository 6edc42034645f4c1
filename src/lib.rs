pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use crate::database::{
    ApplicationStore, DirectoryStore, NotificationStore, PgApplicationStore, PgDirectoryStore,
    PgNotificationStore,
};
use crate::error::Result;
use crate::services::{
    ai_service::AIService,
    application_service::ApplicationService,
    notification_service::NotificationService,
    scoring_service::{Scorer, ScoringSettings, ScoringTrigger},
    transition_service::TransitionEngine,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub application_service: ApplicationService,
    pub transition_engine: TransitionEngine,
    pub scoring_trigger: ScoringTrigger,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        let scorer = AIService::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            http_client,
        );
        let settings = ScoringSettings {
            concurrency: config.scoring_concurrency,
            timeout: Duration::from_secs(config.scoring_timeout_secs),
        };

        Ok(Self::from_parts(
            Arc::new(PgApplicationStore::new(pool.clone())),
            Arc::new(PgDirectoryStore::new(pool.clone())),
            Arc::new(PgNotificationStore::new(pool)),
            Arc::new(scorer),
            settings,
        ))
    }

    /// Wires the services over arbitrary collaborators.
    pub fn from_parts(
        applications: Arc<dyn ApplicationStore>,
        directory: Arc<dyn DirectoryStore>,
        notifications: Arc<dyn NotificationStore>,
        scorer: Arc<dyn Scorer>,
        settings: ScoringSettings,
    ) -> Self {
        let notification_service = NotificationService::new(notifications);
        let transition_engine =
            TransitionEngine::new(applications.clone(), Arc::new(notification_service.clone()));
        let scoring_trigger = ScoringTrigger::new(
            applications.clone(),
            directory.clone(),
            scorer,
            transition_engine.clone(),
            settings,
        );
        let application_service = ApplicationService::new(applications, directory);

        Self {
            application_service,
            transition_engine,
            scoring_trigger,
            notification_service,
        }
    }
}
