pub mod backend;
pub mod config_store;
pub mod state_store;

pub use backend::{
    ItemTotalRepository, JobQueue, MirrorField, MirrorKey, PathCountRow, PathCounterRepository,
    QueryCache, QueuedJob, SeaOrmContentCatalog, SeaOrmStateStore, SeaOrmStorage,
};
pub use config_store::{ConfigItem, ConfigStore};
pub use state_store::{MemoryStateStore, StateStore};
