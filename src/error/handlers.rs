//! Error handlers
//!
//! Maps filesystem errors onto the POSIX error-code space.

use crate::error::types::FsError;

/// Convert an error to the negative errno returned to the callback host
pub fn errno_for(err: &FsError) -> i32 {
    match err {
        FsError::NotFound(_) => -libc::ENOENT,
        FsError::NotImplemented(_) => -libc::ENOSYS,
        FsError::IsDirectory(_) => -libc::EISDIR,
        FsError::NotSupported(_) => -libc::EOPNOTSUPP,
        FsError::AlreadyExists(_) => -libc::EEXIST,
        FsError::NotEmpty(_) => -libc::ENOTEMPTY,
        FsError::Io(_) => -libc::EIO,
    }
}
