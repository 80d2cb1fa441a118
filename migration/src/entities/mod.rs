pub mod content_alias;
pub mod content_item;
pub mod counter_field;
pub mod counter_setting;
pub mod counter_state;
pub mod item_total;
pub mod path_counter;
pub mod query_cache;
pub mod queue_item;

pub use content_alias::Entity as ContentAliasEntity;
pub use content_item::Entity as ContentItemEntity;
pub use counter_field::Entity as CounterFieldEntity;
pub use counter_setting::Entity as CounterSettingEntity;
pub use counter_state::Entity as CounterStateEntity;
pub use item_total::Entity as ItemTotalEntity;
pub use path_counter::Entity as PathCounterEntity;
pub use query_cache::Entity as QueryCacheEntity;
pub use queue_item::Entity as QueueItemEntity;
