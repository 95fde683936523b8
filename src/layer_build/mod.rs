/// Layer build domain - pure types and services
///
/// Nothing in this module performs I/O outside the `FilesystemTree` port.
pub mod domain;
pub mod services;
