use sea_orm::{ColumnTrait, Condition};

use crate::db::entities::schedule_item::Column;

/// Ownership predicate every repository access path is built from.
///
/// The repository has no method that reads or writes `schedule_items` without
/// one of these, so an item owned by someone else behaves exactly like a
/// missing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerScope {
    owner_id: i32,
}

impl OwnerScope {
    pub fn new(owner_id: i32) -> Self {
        Self { owner_id }
    }

    pub fn owner_id(&self) -> i32 {
        self.owner_id
    }

    /// `owner_id = ?`
    pub fn condition(&self) -> Condition {
        Condition::all().add(Column::OwnerId.eq(self.owner_id))
    }

    /// `owner_id = ? AND id = ?`
    pub fn item(&self, id: i32) -> Condition {
        self.condition().add(Column::Id.eq(id))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    use super::OwnerScope;
    use crate::db::entities::prelude::ScheduleItem;

    #[test]
    fn item_condition_scopes_by_owner_and_id() {
        let sql = ScheduleItem::find()
            .filter(OwnerScope::new(42).item(7))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""owner_id" = 42"#), "unexpected sql: {sql}");
        assert!(sql.contains(r#""id" = 7"#), "unexpected sql: {sql}");
    }
}
