pub mod context;
pub mod schedule_service;

pub use context::ServiceContext;
pub use schedule_service::ScheduleService;
