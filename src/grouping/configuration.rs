use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
    GroupIdGroupingProvider, GroupingProvider, OrderingProvider, SingleItemGroupingProvider,
};

/// How fetched items are partitioned into groups.
#[derive(Clone, Default)]
pub enum GroupingConfiguration {
    /// Group by `group_id`, FIFO within a group.
    #[default]
    Grouped,
    /// Every item is its own group.
    Ungrouped,
    /// Group by `group_id` with a custom intra-group order.
    CustomOrdering(Arc<dyn OrderingProvider>),
    /// Fully custom grouping.
    Custom(Arc<dyn GroupingProvider>),
}

impl GroupingConfiguration {
    pub fn grouping_provider(&self) -> Arc<dyn GroupingProvider> {
        match self {
            GroupingConfiguration::Grouped => Arc::new(GroupIdGroupingProvider::default()),
            GroupingConfiguration::Ungrouped => Arc::new(SingleItemGroupingProvider),
            GroupingConfiguration::CustomOrdering(ordering) => {
                Arc::new(GroupIdGroupingProvider::new(Arc::clone(ordering)))
            }
            GroupingConfiguration::Custom(provider) => Arc::clone(provider),
        }
    }
}

impl fmt::Debug for GroupingConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingConfiguration::Grouped => f.write_str("Grouped"),
            GroupingConfiguration::Ungrouped => f.write_str("Ungrouped"),
            GroupingConfiguration::CustomOrdering(_) => f.write_str("CustomOrdering(..)"),
            GroupingConfiguration::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// The serializable subset of [`GroupingConfiguration`], used by `OutboxConfig`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    #[default]
    Grouped,
    Ungrouped,
}

impl From<GroupingMode> for GroupingConfiguration {
    fn from(mode: GroupingMode) -> Self {
        match mode {
            GroupingMode::Grouped => GroupingConfiguration::Grouped,
            GroupingMode::Ungrouped => GroupingConfiguration::Ungrouped,
        }
    }
}
