//! Store Module
//!
//! Durable, size-bounded key-value backends the slot cache mirrors into.

mod file;
mod memory;
mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::DurableStore;
