pub mod event;
pub mod node;
pub mod stats;
pub mod store;

pub use event::{Browser, HostEvent, SpecResult};
pub use node::Suite;
pub use stats::{Stats, StatsAggregator};
pub use store::{ResultStore, StoredFailure};
