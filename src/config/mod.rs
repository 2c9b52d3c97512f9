//! Harvest configuration: types, typestate builder, accessors.

mod builder;
mod getters;
mod types;

pub use builder::{HarvestConfigBuilder, WithQuery, WithStorageDir};
pub use types::{HarvestConfig, SortStrategy};
