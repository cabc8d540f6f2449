//! Issues: normalized view state, the synchronization store and its port

pub mod outcome;
pub mod ports;
pub mod store;
pub mod view;

pub use outcome::{FetchStatus, MutationResult};
pub use ports::IssueGateway;
pub use store::IssueStore;
pub use view::{IssueSet, IssueView};
