pub mod runtime;

pub use runtime::installed_runtime_names;
pub use runtime::java_exe;
pub use runtime::locate_java_binary;
pub use runtime::required_java_for_minecraft_version;
pub use runtime::runtime_root;
