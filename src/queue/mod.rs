pub mod driver;
pub mod job;
pub mod scheduler;

pub use driver::{CronReport, ProcessReport, QueueDriver, plan_fetch_indices};
pub use job::Job;
pub use scheduler::spawn_scheduler;
