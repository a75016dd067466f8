use sea_orm::DatabaseConnection;

use super::{DaoBase, ScheduleDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn schedule(&self) -> ScheduleDao {
        DaoBase::new(&self.db)
    }
}
