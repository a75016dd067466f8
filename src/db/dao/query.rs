use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{Condition, EntityTrait, Order, QueryFilter, QueryOrder, Select};
use serde::Deserialize;

use super::base::{ColumnFilter, CompareOp};
use super::error::{DaoLayerError, DaoResult};
use super::scope::OwnerScope;
use crate::db::entities::{prelude::ScheduleItem, schedule_item::Column};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

impl TryFrom<String> for SortDirection {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("unsupported sort direction '{value}', expected asc or desc")),
        }
    }
}

/// Ordering for the per-day view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateSortMode {
    #[default]
    Priority,
    PriorityThenCreatedAt,
}

/// Ordering for the full listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOrder {
    #[default]
    Priority,
    DateAsc,
    DateDesc,
}

/// Which text fields a search keyword is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    #[default]
    Any,
    Title,
    Content,
    Tag,
}

/// Fixed ORDER BY lists. Each one ends on `id` so page boundaries are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOrder {
    Priority(SortDirection),
    PriorityThenNewest,
    PriorityThenDue(SortDirection),
    DueAsc,
    DueDesc,
    NewestFirst,
    CategoryThenDue,
}

impl ScheduleOrder {
    pub fn for_day(mode: DateSortMode, direction: SortDirection) -> Self {
        match mode {
            DateSortMode::Priority => Self::Priority(direction),
            DateSortMode::PriorityThenCreatedAt => Self::PriorityThenNewest,
        }
    }

    pub fn for_list(order: ListOrder, direction: SortDirection) -> Self {
        match order {
            ListOrder::Priority => Self::PriorityThenDue(direction),
            ListOrder::DateAsc => Self::DueAsc,
            ListOrder::DateDesc => Self::DueDesc,
        }
    }

    pub fn columns(self) -> Vec<(Column, Order)> {
        match self {
            Self::Priority(direction) => vec![
                (Column::PriorityLevel, direction.order()),
                (Column::Id, Order::Asc),
            ],
            Self::PriorityThenNewest => vec![
                (Column::PriorityLevel, Order::Desc),
                (Column::CreatedAt, Order::Desc),
                (Column::Id, Order::Desc),
            ],
            Self::PriorityThenDue(direction) => vec![
                (Column::PriorityLevel, direction.order()),
                (Column::DueAt, Order::Asc),
                (Column::Id, Order::Asc),
            ],
            Self::DueAsc => vec![(Column::DueAt, Order::Asc), (Column::Id, Order::Asc)],
            Self::DueDesc => vec![(Column::DueAt, Order::Desc), (Column::Id, Order::Desc)],
            Self::NewestFirst => vec![(Column::CreatedAt, Order::Desc), (Column::Id, Order::Desc)],
            Self::CategoryThenDue => vec![
                (Column::Category, Order::Asc),
                (Column::DueAt, Order::Asc),
                (Column::Id, Order::Asc),
            ],
        }
    }

    pub fn apply(self, select: Select<ScheduleItem>) -> Select<ScheduleItem> {
        self.columns()
            .into_iter()
            .fold(select, |select, (column, order)| select.order_by(column, order))
    }
}

/// Conjunction of optional filters, always rooted at an owner scope.
#[derive(Debug, Clone)]
pub struct ScheduleFilter {
    condition: Condition,
}

impl ScheduleFilter {
    pub fn owned_by(scope: OwnerScope) -> Self {
        Self {
            condition: scope.condition(),
        }
    }

    fn and(mut self, filter: ColumnFilter<Column>) -> Self {
        self.condition = self.condition.add(filter.to_condition());
        self
    }

    /// `start <= due_at < end`
    pub fn due_within(self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.and(ColumnFilter::compare(Column::DueAt, CompareOp::Gte, start))
            .and(ColumnFilter::compare(Column::DueAt, CompareOp::Lt, end))
    }

    /// `start <= due_at <= end`
    pub fn due_between(self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.and(ColumnFilter::between(Column::DueAt, start, end))
    }

    pub fn created_within(self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        let filter = match start {
            Some(start) => self.and(ColumnFilter::compare(Column::CreatedAt, CompareOp::Gte, start)),
            None => self,
        };
        match end {
            Some(end) => filter.and(ColumnFilter::compare(Column::CreatedAt, CompareOp::Lt, end)),
            None => filter,
        }
    }

    pub fn completed(self, is_completed: Option<bool>) -> Self {
        match is_completed {
            Some(flag) => self.and(ColumnFilter::eq(Column::IsCompleted, flag)),
            None => self,
        }
    }

    pub fn priority(self, priority_level: Option<i32>) -> Self {
        match priority_level {
            Some(level) => self.and(ColumnFilter::eq(Column::PriorityLevel, level)),
            None => self,
        }
    }

    /// Blank keywords leave the filter untouched.
    pub fn keyword(mut self, keyword: &str, field: SearchField) -> Self {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self;
        }
        let columns: &[Column] = match field {
            SearchField::Any => &[Column::Title, Column::Content, Column::Category],
            SearchField::Title => &[Column::Title],
            SearchField::Content => &[Column::Content],
            SearchField::Tag => &[Column::Category],
        };
        let any = columns.iter().fold(Condition::any(), |any, column| {
            any.add(ColumnFilter::contains(*column, keyword).to_condition())
        });
        self.condition = self.condition.add(any);
        self
    }

    pub fn tag(self, tag: &str) -> Self {
        let tag = tag.trim();
        if tag.is_empty() {
            return self;
        }
        self.and(ColumnFilter::contains(Column::Category, tag))
    }

    pub fn into_condition(self) -> Condition {
        self.condition
    }

    pub fn select(self) -> Select<ScheduleItem> {
        ScheduleItem::find().filter(self.condition)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayQuery {
    pub date: NaiveDate,
    pub priority_level: Option<i32>,
    pub sort_by_priority: SortDirection,
    pub is_completed: Option<bool>,
    pub sort_mode: DateSortMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub priority_level: Option<i32>,
    pub sort_by_priority: SortDirection,
    pub order_by: ListOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub keyword: String,
    pub include_completed: bool,
    /// First calendar day (inclusive) of `created_at`.
    pub start_date: Option<NaiveDate>,
    /// Last calendar day (inclusive) of `created_at`.
    pub end_date: Option<NaiveDate>,
    pub priority_level: Option<i32>,
    pub tag: String,
    pub search_type: SearchField,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            include_completed: true,
            start_date: None,
            end_date: None,
            priority_level: None,
            tag: String::new(),
            search_type: SearchField::Any,
        }
    }
}

impl SearchCriteria {
    pub(crate) fn into_filter(self, scope: OwnerScope) -> DaoResult<ScheduleFilter> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(DaoLayerError::validation(format!(
                    "startDate ({start}) must not be after endDate ({end})"
                )));
            }
        }
        let created_from = self.start_date.map(day_start);
        let created_before = match self.end_date {
            Some(end) => Some(day_bounds(end)?.1),
            None => None,
        };
        let completion = if self.include_completed {
            None
        } else {
            Some(false)
        };

        Ok(ScheduleFilter::owned_by(scope)
            .keyword(&self.keyword, self.search_type)
            .tag(&self.tag)
            .completed(completion)
            .priority(self.priority_level)
            .created_within(created_from, created_before))
    }
}

pub(crate) fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Half-open `[date 00:00, next day 00:00)`.
pub(crate) fn day_bounds(date: NaiveDate) -> DaoResult<(NaiveDateTime, NaiveDateTime)> {
    let next = date
        .succ_opt()
        .ok_or_else(|| DaoLayerError::validation(format!("Date out of range: {date}")))?;
    Ok((day_start(date), day_start(next)))
}

/// First day of the month and first day of the following month.
pub(crate) fn month_bounds(year: i32, month: u32) -> DaoResult<(NaiveDate, NaiveDate)> {
    let invalid = || DaoLayerError::validation(format!("Invalid year/month: {year}-{month}"));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1).ok_or_else(invalid)?, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok((first, next))
}
