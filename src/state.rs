use crate::config::AppConfig;
use crate::services::ai::LlmProvider;
use crate::services::sessions::SessionStore;
use crate::store::AppointmentStore;

pub struct AppState {
    pub store: AppointmentStore,
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig, llm: Box<dyn LlmProvider>) -> Self {
        Self {
            store: AppointmentStore::new(&config.appointments_csv),
            sessions: SessionStore::new(config.session_ttl_minutes),
            config,
            llm,
        }
    }
}
