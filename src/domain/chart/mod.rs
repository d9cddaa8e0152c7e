//! Chart aggregate: viewport, coordinate mapping, filters and value objects.

pub mod coords;
pub mod filters;
pub mod histogram;
pub mod tooltip;
pub mod value_objects;
pub mod viewport;

pub use coords::{CoordinateMapper, ValueDomain};
pub use filters::{CandleTypeFilter, ClusterFilter, FilterState};
pub use histogram::Histogram;
pub use tooltip::TooltipData;
pub use value_objects::*;
pub use viewport::{ViewportManager, ViewportRange};
