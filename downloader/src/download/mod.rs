//! Download module
//!
//! Paginated fetching with bounded retries, and the batch loop that saves
//! one CSV per symbol.

mod error;
pub mod fetcher;
pub mod orchestrator;
pub mod policy;
pub mod range;
pub mod report;

pub use error::*;
pub use fetcher::*;
pub use orchestrator::*;
pub use policy::*;
pub use range::*;
pub use report::*;
