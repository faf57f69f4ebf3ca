//! Grouping and ordering of fetched items.
//!
//! - `GroupIdProvider` - Assigns a group id when an item is added
//! - `GroupingProvider` - Partitions a fetched batch into groups
//! - `OrderingProvider` - Orders the items inside a group
//! - `GroupingConfiguration` - Selects the strategy used by the monitor

mod configuration;
mod group_id;
mod ordering;
mod provider;

pub use configuration::{GroupingConfiguration, GroupingMode};
pub use group_id::{GroupIdProvider, NullGroupIdProvider, RandomGroupIdProvider};
pub use ordering::{FifoOrderingProvider, OrderingProvider};
pub use provider::{GroupIdGroupingProvider, GroupingProvider, SingleItemGroupingProvider};
