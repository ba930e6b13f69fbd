//! wikifs - a virtual filesystem projection of a remote wiki.
//!
//! Presents the wiki's flat, colon-delimited page namespace as a
//! hierarchical file tree and maps filesystem primitives onto a remote
//! store whose only operations are whole-document fetch/store and named
//! locks. The mount process and the wire-level remote client live outside
//! this crate: hosts drive [`fs::WikiFs`] and supply any
//! [`remote::PageStore`] implementation.

pub mod config;
pub mod error;
pub mod fs;
pub mod remote;
pub mod resolve;
pub mod tree;

pub use config::WikiFsConfig;
pub use fs::WikiFs;
