pub mod aggregate;
pub mod base;
pub mod context;
pub mod error;
pub mod query;
pub mod schedule_dao;
pub mod scope;

pub use aggregate::{CategoryGroup, DailyStats, PriorityGroup};
pub use base::{ColumnFilter, CompareOp, DaoBase, FilterOp, Page, PageRequest, find_page};
pub use context::DaoContext;
pub use error::{CompletionState, DaoLayerError, DaoResult};
pub use query::{
    DateSortMode, DayQuery, ListOrder, ListQuery, ScheduleFilter, ScheduleOrder, SearchCriteria,
    SearchField, SortDirection,
};
pub use schedule_dao::{NewScheduleItem, ScheduleDao, SchedulePatch};
pub use scope::OwnerScope;
