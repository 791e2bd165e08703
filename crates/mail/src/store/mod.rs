//! Application state store
//!
//! The sync loop only depends on the [`StateSource`] trait; the in-memory
//! store is the implementation used by hosts and tests.

mod memory;
mod traits;

pub use memory::InMemoryAppStore;
pub use traits::StateSource;
