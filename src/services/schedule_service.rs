use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, error};

use crate::{
    db::{
        dao::{
            CategoryGroup, DailyStats, DaoLayerError, DayQuery, ListQuery, NewScheduleItem,
            OwnerScope, Page, PageRequest, PriorityGroup, ScheduleDao, SchedulePatch,
            SearchCriteria,
        },
        entities::schedule_item,
    },
    error::AppError,
};

/// Converts a repository failure for `op`, logging store errors before their
/// details are dropped from the client message.
fn app_error(op: &'static str) -> impl FnOnce(DaoLayerError) -> AppError {
    move |err| {
        if let DaoLayerError::Db(db_err) = &err {
            error!(op, error = %db_err, "schedule storage failure");
        }
        AppError::from(err)
    }
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

#[derive(Clone)]
pub struct ScheduleService {
    schedule_dao: ScheduleDao,
}

impl ScheduleService {
    pub fn new(schedule_dao: ScheduleDao) -> Self {
        Self { schedule_dao }
    }

    pub async fn add(
        &self,
        scope: OwnerScope,
        item: NewScheduleItem,
    ) -> Result<schedule_item::Model, AppError> {
        let item = NewScheduleItem {
            title: trimmed(item.title),
            category: trimmed(item.category),
            ..item
        };
        let created = self
            .schedule_dao
            .add(scope, item)
            .await
            .map_err(app_error("add"))?;
        debug!(owner_id = scope.owner_id(), id = created.id, "schedule item added");
        Ok(created)
    }

    pub async fn get(
        &self,
        id: i32,
        scope: OwnerScope,
    ) -> Result<schedule_item::Model, AppError> {
        self.schedule_dao
            .get_by_id(id, scope)
            .await
            .map_err(app_error("get_by_id"))?
            .ok_or_else(|| AppError::not_found(format!("Schedule item not found (id={id})")))
    }

    pub async fn update(
        &self,
        id: i32,
        scope: OwnerScope,
        patch: SchedulePatch,
    ) -> Result<schedule_item::Model, AppError> {
        let patch = SchedulePatch {
            title: patch.title.map(trimmed),
            category: patch.category.map(trimmed),
            ..patch
        };
        let updated = self
            .schedule_dao
            .update(id, scope, patch)
            .await
            .map_err(app_error("update"))?;
        debug!(owner_id = scope.owner_id(), id, "schedule item updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32, scope: OwnerScope) -> Result<(), AppError> {
        self.schedule_dao
            .delete(id, scope)
            .await
            .map_err(app_error("delete"))?;
        debug!(owner_id = scope.owner_id(), id, "schedule item deleted");
        Ok(())
    }

    pub async fn complete(&self, id: i32, scope: OwnerScope) -> Result<(), AppError> {
        self.schedule_dao
            .complete(id, scope)
            .await
            .map_err(app_error("complete"))?;
        debug!(owner_id = scope.owner_id(), id, "schedule item completed");
        Ok(())
    }

    pub async fn uncomplete(&self, id: i32, scope: OwnerScope) -> Result<(), AppError> {
        self.schedule_dao
            .uncomplete(id, scope)
            .await
            .map_err(app_error("uncomplete"))?;
        debug!(owner_id = scope.owner_id(), id, "schedule item reopened");
        Ok(())
    }

    pub async fn list_by_date(
        &self,
        scope: OwnerScope,
        query: DayQuery,
        page: PageRequest,
    ) -> Result<Page<schedule_item::Model>, AppError> {
        self.schedule_dao
            .get_by_date(scope, query, page)
            .await
            .map_err(app_error("get_by_date"))
    }

    pub async fn list_all(
        &self,
        scope: OwnerScope,
        query: ListQuery,
        page: PageRequest,
    ) -> Result<Page<schedule_item::Model>, AppError> {
        self.schedule_dao
            .get_all(scope, query, page)
            .await
            .map_err(app_error("get_all"))
    }

    pub async fn search(
        &self,
        scope: OwnerScope,
        criteria: SearchCriteria,
        page: PageRequest,
    ) -> Result<Page<schedule_item::Model>, AppError> {
        self.schedule_dao
            .search(scope, criteria, page)
            .await
            .map_err(app_error("search"))
    }

    pub async fn list_by_date_and_completion(
        &self,
        scope: OwnerScope,
        date: NaiveDate,
        is_completed: bool,
    ) -> Result<Vec<schedule_item::Model>, AppError> {
        self.schedule_dao
            .get_by_date_and_completion(scope, date, is_completed)
            .await
            .map_err(app_error("get_by_date_and_completion"))
    }

    pub async fn list_completed(
        &self,
        scope: OwnerScope,
    ) -> Result<Vec<schedule_item::Model>, AppError> {
        self.schedule_dao
            .get_completed(scope)
            .await
            .map_err(app_error("get_completed"))
    }

    pub async fn list_by_date_range(
        &self,
        scope: OwnerScope,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<schedule_item::Model>, AppError> {
        self.schedule_dao
            .get_by_date_range(scope, start, end)
            .await
            .map_err(app_error("get_by_date_range"))
    }

    pub async fn group_by_category(
        &self,
        scope: OwnerScope,
    ) -> Result<Vec<CategoryGroup>, AppError> {
        self.schedule_dao
            .group_by_category(scope)
            .await
            .map_err(app_error("group_by_category"))
    }

    pub async fn group_by_priority(
        &self,
        scope: OwnerScope,
    ) -> Result<Vec<PriorityGroup>, AppError> {
        self.schedule_dao
            .group_by_priority(scope)
            .await
            .map_err(app_error("group_by_priority"))
    }

    pub async fn daily_stats(
        &self,
        scope: OwnerScope,
        date: NaiveDate,
    ) -> Result<DailyStats, AppError> {
        self.schedule_dao
            .daily_stats(scope, date)
            .await
            .map_err(app_error("daily_stats"))
    }

    pub async fn monthly_stats(
        &self,
        scope: OwnerScope,
        year: i32,
        month: u32,
    ) -> Result<Vec<DailyStats>, AppError> {
        self.schedule_dao
            .monthly_stats(scope, year, month)
            .await
            .map_err(app_error("monthly_stats"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    use super::trimmed;
    use crate::{
        db::{dao::OwnerScope, entities::schedule_item},
        error::AppError,
        services::ServiceContext,
    };

    fn stored(title: &str) -> schedule_item::Model {
        let due_at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("timestamp should be valid");
        schedule_item::Model {
            id: 3,
            owner_id: 1,
            due_at,
            created_at: due_at,
            title: title.to_string(),
            content: String::new(),
            priority_level: 1,
            category: "work".to_string(),
            is_completed: false,
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(trimmed("  standup ".to_string()), "standup");
        assert_eq!(trimmed("standup".to_string()), "standup");
    }

    #[tokio::test]
    async fn get_miss_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<schedule_item::Model>::new()])
            .into_connection();
        let service = ServiceContext::new(&db).schedule();

        let err = service
            .get(3, OwnerScope::new(1))
            .await
            .expect_err("missing item");
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Schedule item not found (id=3)"));
    }

    #[tokio::test]
    async fn get_returns_owned_item() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored("standup")]])
            .into_connection();
        let service = ServiceContext::new(&db).schedule();

        let item = service
            .get(3, OwnerScope::new(1))
            .await
            .expect("item should load");
        assert_eq!(item.title, "standup");
    }

    #[tokio::test]
    async fn storage_failure_becomes_internal_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let service = ServiceContext::new(&db).schedule();

        let err = service
            .list_completed(OwnerScope::new(1))
            .await
            .expect_err("query should fail");
        assert!(matches!(err, AppError::Internal(ref m) if m == "Storage failure"));
    }
}
