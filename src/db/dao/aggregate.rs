use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    DatabaseBackend, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;

use super::base::DaoBase;
use super::error::DaoResult;
use super::query::{ScheduleFilter, ScheduleOrder, day_bounds, day_start, month_bounds};
use super::schedule_dao::ScheduleDao;
use super::scope::OwnerScope;
use crate::db::entities::{prelude::ScheduleItem, schedule_item};

const COMPLETED_SUM_SQL: &str = "COALESCE(SUM(CASE WHEN is_completed THEN 1 ELSE 0 END), 0)";
const TOTAL_SQL: &str = "COUNT(*)";
const DAY_CAST_SQL: &str = "CAST(due_at AS DATE)";
const DAY_FN_SQL: &str = "DATE(due_at)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub completed: u64,
    pub total: u64,
    /// `"completed/total"`
    pub status: String,
}

impl DailyStats {
    fn new(date: NaiveDate, completed: i64, total: i64) -> Self {
        let completed = u64::try_from(completed).unwrap_or_default();
        let total = u64::try_from(total).unwrap_or_default();
        Self {
            date,
            completed,
            total,
            status: format!("{completed}/{total}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<schedule_item::Model>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityGroup {
    pub priority_level: i32,
    pub items: Vec<schedule_item::Model>,
}

#[derive(Debug, FromQueryResult)]
struct Totals {
    completed_count: i64,
    total_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct DayTotals {
    day: NaiveDate,
    completed_count: i64,
    total_count: i64,
}

fn day_expr(backend: DatabaseBackend) -> &'static str {
    match backend {
        DatabaseBackend::Postgres => DAY_CAST_SQL,
        _ => DAY_FN_SQL,
    }
}

/// Buckets rows by key. Buckets come out in key order; rows keep their
/// incoming order inside a bucket.
fn bucket<K: Ord>(
    items: Vec<schedule_item::Model>,
    key: impl Fn(&schedule_item::Model) -> K,
) -> BTreeMap<K, Vec<schedule_item::Model>> {
    let mut groups: BTreeMap<K, Vec<schedule_item::Model>> = BTreeMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

impl ScheduleDao {
    pub async fn group_by_category(&self, scope: OwnerScope) -> DaoResult<Vec<CategoryGroup>> {
        let items = self
            .list(ScheduleFilter::owned_by(scope), ScheduleOrder::CategoryThenDue)
            .await?;
        Ok(bucket(items, |item| item.category.clone())
            .into_iter()
            .map(|(category, items)| CategoryGroup { category, items })
            .collect())
    }

    pub async fn group_by_priority(&self, scope: OwnerScope) -> DaoResult<Vec<PriorityGroup>> {
        let items = self
            .list(ScheduleFilter::owned_by(scope), ScheduleOrder::DueAsc)
            .await?;
        Ok(bucket(items, |item| item.priority_level)
            .into_iter()
            .map(|(priority_level, items)| PriorityGroup {
                priority_level,
                items,
            })
            .collect())
    }

    pub async fn daily_stats(&self, scope: OwnerScope, date: NaiveDate) -> DaoResult<DailyStats> {
        let (start, end) = day_bounds(date)?;
        let totals = ScheduleFilter::owned_by(scope)
            .due_within(start, end)
            .select()
            .select_only()
            .column_as(Expr::cust(COMPLETED_SUM_SQL), "completed_count")
            .column_as(Expr::cust(TOTAL_SQL), "total_count")
            .into_model::<Totals>()
            .one(self.db())
            .await?;

        Ok(match totals {
            Some(t) => DailyStats::new(date, t.completed_count, t.total_count),
            None => DailyStats::new(date, 0, 0),
        })
    }

    /// One entry per day of the month that has at least one item.
    pub async fn monthly_stats(
        &self,
        scope: OwnerScope,
        year: i32,
        month: u32,
    ) -> DaoResult<Vec<DailyStats>> {
        let (first, next) = month_bounds(year, month)?;
        let day = day_expr(self.db().get_database_backend());

        let rows = ScheduleItem::find()
            .select_only()
            .column_as(Expr::cust(day), "day")
            .column_as(Expr::cust(COMPLETED_SUM_SQL), "completed_count")
            .column_as(Expr::cust(TOTAL_SQL), "total_count")
            .filter(
                ScheduleFilter::owned_by(scope)
                    .due_within(day_start(first), day_start(next))
                    .into_condition(),
            )
            .group_by(Expr::cust(day))
            .order_by_asc(Expr::cust(day))
            .into_model::<DayTotals>()
            .all(self.db())
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| DailyStats::new(row.day, row.completed_count, row.total_count))
            .collect())
    }
}
