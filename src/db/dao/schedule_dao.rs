use chrono::{NaiveDate, NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use super::base::{DaoBase, Page, PageRequest, find_page};
use super::error::{CompletionState, DaoLayerError, DaoResult};
use super::query::{
    DayQuery, ListQuery, ScheduleFilter, ScheduleOrder, SearchCriteria, day_bounds,
};
use super::scope::OwnerScope;
use crate::db::entities::{
    prelude::ScheduleItem,
    schedule_item::{self, Column},
};

#[derive(Clone)]
pub struct ScheduleDao {
    db: DatabaseConnection,
}

impl DaoBase for ScheduleDao {
    type Entity = ScheduleItem;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleItem {
    pub due_at: Option<NaiveDateTime>,
    pub title: String,
    pub content: String,
    pub priority_level: i32,
    pub category: String,
    /// Must be `false`; items always start active.
    pub is_completed: bool,
}

/// Field-level overwrite. `None` and blank `title`/`category` keep the stored
/// value; `Some("")` for `content` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulePatch {
    pub due_at: Option<NaiveDateTime>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority_level: Option<i32>,
    pub category: Option<String>,
}

impl SchedulePatch {
    pub fn merge_into(self, mut item: schedule_item::Model) -> schedule_item::Model {
        if let Some(due_at) = self.due_at {
            item.due_at = due_at;
        }
        if let Some(title) = self.title.filter(|title| !title.trim().is_empty()) {
            item.title = title;
        }
        if let Some(content) = self.content {
            item.content = content;
        }
        if let Some(priority_level) = self.priority_level {
            item.priority_level = priority_level;
        }
        if let Some(category) = self.category.filter(|category| !category.trim().is_empty()) {
            item.category = category;
        }
        item
    }
}

fn require_title(title: &str) -> DaoResult<()> {
    if title.trim().is_empty() {
        return Err(DaoLayerError::validation("Title required"));
    }
    Ok(())
}

impl ScheduleDao {
    pub async fn add(
        &self,
        scope: OwnerScope,
        item: NewScheduleItem,
    ) -> DaoResult<schedule_item::Model> {
        require_title(&item.title)?;
        let due_at = item
            .due_at
            .ok_or_else(|| DaoLayerError::validation("Due date required"))?;
        if item.is_completed {
            return Err(DaoLayerError::validation(
                "New schedule items cannot start completed",
            ));
        }

        let model = schedule_item::ActiveModel {
            owner_id: Set(scope.owner_id()),
            due_at: Set(due_at),
            created_at: Set(Utc::now().naive_utc()),
            title: Set(item.title),
            content: Set(item.content),
            priority_level: Set(item.priority_level),
            category: Set(item.category),
            is_completed: Set(false),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn get_by_id(
        &self,
        id: i32,
        scope: OwnerScope,
    ) -> DaoResult<Option<schedule_item::Model>> {
        Ok(ScheduleItem::find()
            .filter(scope.item(id))
            .one(&self.db)
            .await?)
    }

    pub async fn update(
        &self,
        id: i32,
        scope: OwnerScope,
        patch: SchedulePatch,
    ) -> DaoResult<schedule_item::Model> {
        let existing = self
            .get_by_id(id, scope)
            .await?
            .ok_or(DaoLayerError::NotFoundOrForbidden { id })?;

        let merged = patch.merge_into(existing);
        require_title(&merged.title)?;

        let changes = schedule_item::ActiveModel {
            due_at: Set(merged.due_at),
            title: Set(merged.title.clone()),
            content: Set(merged.content.clone()),
            priority_level: Set(merged.priority_level),
            category: Set(merged.category.clone()),
            ..Default::default()
        };
        let result = ScheduleItem::update_many()
            .set(changes)
            .filter(scope.item(id))
            .exec(&self.db)
            .await?;

        // Deleted between the read and the write.
        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFoundOrForbidden { id });
        }
        Ok(merged)
    }

    pub async fn delete(&self, id: i32, scope: OwnerScope) -> DaoResult<()> {
        let result = ScheduleItem::delete_many()
            .filter(scope.item(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFoundOrForbidden { id });
        }
        Ok(())
    }

    pub async fn complete(&self, id: i32, scope: OwnerScope) -> DaoResult<()> {
        self.transition(id, scope, true).await
    }

    pub async fn uncomplete(&self, id: i32, scope: OwnerScope) -> DaoResult<()> {
        self.transition(id, scope, false).await
    }

    /// Conditional `is_completed: !target -> target`. When no row moves, a
    /// scoped lookup tells a missing item apart from one already in `target`.
    async fn transition(&self, id: i32, scope: OwnerScope, target: bool) -> DaoResult<()> {
        let changes = schedule_item::ActiveModel {
            is_completed: Set(target),
            ..Default::default()
        };
        let result = ScheduleItem::update_many()
            .set(changes)
            .filter(scope.item(id).add(Column::IsCompleted.eq(!target)))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            return Ok(());
        }

        match self.get_by_id(id, scope).await? {
            None => Err(DaoLayerError::NotFound { id }),
            Some(item) => Err(DaoLayerError::AlreadyInState {
                id,
                state: CompletionState::from_flag(item.is_completed),
            }),
        }
    }

    pub async fn get_by_date(
        &self,
        scope: OwnerScope,
        query: DayQuery,
        page: PageRequest,
    ) -> DaoResult<Page<schedule_item::Model>> {
        let (start, end) = day_bounds(query.date)?;
        let select = ScheduleFilter::owned_by(scope)
            .due_within(start, end)
            .completed(query.is_completed)
            .priority(query.priority_level)
            .select();
        let order = ScheduleOrder::for_day(query.sort_mode, query.sort_by_priority);
        find_page(&self.db, order.apply(select), page).await
    }

    pub async fn get_all(
        &self,
        scope: OwnerScope,
        query: ListQuery,
        page: PageRequest,
    ) -> DaoResult<Page<schedule_item::Model>> {
        let select = ScheduleFilter::owned_by(scope)
            .priority(query.priority_level)
            .select();
        let order = ScheduleOrder::for_list(query.order_by, query.sort_by_priority);
        find_page(&self.db, order.apply(select), page).await
    }

    pub async fn search(
        &self,
        scope: OwnerScope,
        criteria: SearchCriteria,
        page: PageRequest,
    ) -> DaoResult<Page<schedule_item::Model>> {
        let select = criteria.into_filter(scope)?.select();
        find_page(&self.db, ScheduleOrder::NewestFirst.apply(select), page).await
    }

    pub async fn get_by_date_and_completion(
        &self,
        scope: OwnerScope,
        date: NaiveDate,
        is_completed: bool,
    ) -> DaoResult<Vec<schedule_item::Model>> {
        let (start, end) = day_bounds(date)?;
        let filter = ScheduleFilter::owned_by(scope)
            .due_within(start, end)
            .completed(Some(is_completed));
        self.list(filter, ScheduleOrder::DueAsc).await
    }

    pub async fn get_completed(&self, scope: OwnerScope) -> DaoResult<Vec<schedule_item::Model>> {
        let filter = ScheduleFilter::owned_by(scope).completed(Some(true));
        self.list(filter, ScheduleOrder::DueDesc).await
    }

    /// Items due within `[start, end]`.
    pub async fn get_by_date_range(
        &self,
        scope: OwnerScope,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DaoResult<Vec<schedule_item::Model>> {
        if start > end {
            return Err(DaoLayerError::validation(format!(
                "start ({start}) must not be after end ({end})"
            )));
        }
        let filter = ScheduleFilter::owned_by(scope).due_between(start, end);
        self.list(filter, ScheduleOrder::DueAsc).await
    }

    pub(super) async fn list(
        &self,
        filter: ScheduleFilter,
        order: ScheduleOrder,
    ) -> DaoResult<Vec<schedule_item::Model>> {
        Ok(order.apply(filter.select()).all(&self.db).await?)
    }
}
