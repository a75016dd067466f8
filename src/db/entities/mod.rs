#[allow(unused_imports)]
pub mod prelude {
    pub use super::schedule_item::Entity as ScheduleItem;
}

pub mod schedule_item;
