pub mod supported;
pub mod version_file;

pub use supported::{versions_in_group, GameVersion, SUPPORTED_VERSIONS, VERSION_GROUPS};
pub use version_file::{LibraryEntry, VersionJson};
