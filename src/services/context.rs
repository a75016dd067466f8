use sea_orm::DatabaseConnection;

use crate::{db::dao::DaoContext, services::schedule_service::ScheduleService, state::AppState};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn schedule(&self) -> ScheduleService {
        ScheduleService::new(self.daos.schedule())
    }
}
