use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryResult, QuerySelect, Select, Value,
};

use super::error::{DaoLayerError, DaoResult};

const TOTAL_COUNT_ALIAS: &str = "total_count";
const WINDOW_COUNT_SQL: &str = "COUNT(*) OVER ()";
const MAX_SQL_INT: u64 = i64::MAX as u64;

pub trait DaoBase: Clone + Send + Sync + Sized {
    type Entity: EntityTrait + Send + Sync;

    fn new(db: &DatabaseConnection) -> Self;

    fn db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// LIMIT and OFFSET are bound as signed 64-bit integers, so both must fit
    /// in `i64`.
    pub fn new(page: u64, page_size: u64) -> DaoResult<Self> {
        let invalid = || DaoLayerError::InvalidPagination { page, page_size };
        if page == 0 || page_size == 0 || page_size > MAX_SQL_INT {
            return Err(invalid());
        }
        let offset = (page - 1).checked_mul(page_size).ok_or_else(invalid)?;
        if offset > MAX_SQL_INT {
            return Err(invalid());
        }
        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub has_next: bool,
}

impl<T> Page<T> {
    fn new(data: Vec<T>, request: PageRequest, total_count: u64) -> Self {
        let seen = request.offset().saturating_add(data.len() as u64);
        Self {
            data,
            page: request.page,
            page_size: request.page_size,
            total_count,
            has_next: seen < total_count,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            has_next: self.has_next,
        }
    }
}

/// A model row carrying the window count projected next to it.
struct Windowed<M> {
    model: M,
    total_count: i64,
}

impl<M: FromQueryResult> FromQueryResult for Windowed<M> {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            model: M::from_query_result(res, pre)?,
            total_count: res.try_get(pre, TOTAL_COUNT_ALIAS)?,
        })
    }
}

/// Fetches one page together with the total number of rows matching the
/// same predicate.
///
/// The total comes from `COUNT(*) OVER ()` in the page query itself. A page
/// past the end has no row to carry the window value, so only then is the
/// count re-issued against the unchanged select.
pub async fn find_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    request: PageRequest,
) -> DaoResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let rows = select
        .clone()
        .column_as(Expr::cust(WINDOW_COUNT_SQL), TOTAL_COUNT_ALIAS)
        .limit(request.page_size)
        .offset(request.offset())
        .into_model::<Windowed<E::Model>>()
        .all(db)
        .await?;

    let total_count = match rows.first() {
        Some(row) => u64::try_from(row.total_count).unwrap_or_default(),
        None if request.page > 1 => select.count(db).await?,
        None => 0,
    };

    let data = rows.into_iter().map(|row| row.model).collect();
    Ok(Page::new(data, request, total_count))
}

#[derive(Debug, Clone)]
pub enum FilterOp {
    Eq(Value),
    Compare { op: CompareOp, value: Value },
    Like { pattern: String, escape: char },
    Between { min: Value, max: Value },
}

#[derive(Debug, Clone, Copy)]
pub enum CompareOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone)]
pub struct ColumnFilter<C> {
    pub column: C,
    pub op: FilterOp,
}

impl<C> ColumnFilter<C>
where
    C: ColumnTrait + Copy + 'static,
{
    pub fn eq(column: C, value: impl Into<Value>) -> Self {
        Self {
            column,
            op: FilterOp::Eq(value.into()),
        }
    }

    pub fn compare(column: C, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            column,
            op: FilterOp::Compare {
                op,
                value: value.into(),
            },
        }
    }

    /// Case-insensitive substring match with LIKE wildcards in `needle` taken
    /// literally. Both sides are lower-cased, so Postgres and SQLite agree.
    pub fn contains(column: C, needle: &str) -> Self {
        Self {
            column,
            op: FilterOp::Like {
                pattern: contains_pattern(&needle.to_lowercase(), LIKE_ESCAPE),
                escape: LIKE_ESCAPE,
            },
        }
    }

    pub fn between(column: C, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self {
            column,
            op: FilterOp::Between {
                min: min.into(),
                max: max.into(),
            },
        }
    }

    pub fn to_condition(&self) -> Condition {
        let condition = Condition::all();
        match &self.op {
            FilterOp::Eq(value) => condition.add(ColumnTrait::eq(&self.column, value.clone())),
            FilterOp::Compare { op, value } => {
                let expr = Expr::col(self.column);
                let value = Expr::val(value.clone());
                let expr = match op {
                    CompareOp::Lt => expr.lt(value),
                    CompareOp::Lte => expr.lte(value),
                    CompareOp::Gt => expr.gt(value),
                    CompareOp::Gte => expr.gte(value),
                };
                condition.add(expr)
            }
            FilterOp::Like { pattern, escape } => condition.add(
                Expr::expr(Func::lower(Expr::col(self.column)))
                    .like(LikeExpr::new(pattern).escape(*escape)),
            ),
            FilterOp::Between { min, max } => condition.add(
                Expr::col(self.column).between(Expr::val(min.clone()), Expr::val(max.clone())),
            ),
        }
    }
}

const LIKE_ESCAPE: char = '\\';

fn contains_pattern(needle: &str, escape: char) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if ch == '%' || ch == '_' || ch == escape {
            pattern.push(escape);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
