//! Remote directory store interface
//!
//! The narrow seam between the projection engine and whatever transport
//! actually talks to the wiki.

pub mod memory;
pub mod store;

pub use store::{HIERARCHY_SEPARATOR, LockAck, PageDescriptor, PageStore};
