//! Host collaborators for [`crate::file_edit`].

pub mod dispatch;
pub mod fs;
