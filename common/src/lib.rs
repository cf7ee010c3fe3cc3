//! Functions, constants, types, and whatever else comes along, which are required by
//! more than one of the tools in this crate.
//!
pub mod constants;
pub mod file_copier;
pub mod logging;
pub mod spec_helper;
pub mod types;
pub mod zfs_file;
pub mod zfs_info;
