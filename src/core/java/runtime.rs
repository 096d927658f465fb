use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

pub fn java_exe() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// Platform key used in the runtime directory layout of the official launcher.
pub fn runtime_platform() -> &'static str {
    match (std::env::consts::OS, std::env::consts::ARCH) {
        ("windows", "x86") => "windows-x86",
        ("windows", "aarch64") => "windows-arm64",
        ("windows", _) => "windows-x64",
        ("macos", "aarch64") => "mac-os-arm64",
        ("macos", _) => "mac-os",
        ("linux", "x86") => "linux-i386",
        _ => "linux",
    }
}

/// `<game_dir>/runtime`
pub fn runtimes_dir(game_dir: &Path) -> PathBuf {
    game_dir.join("runtime")
}

/// `<game_dir>/runtime/<name>/<platform>/<name>`
pub fn runtime_root(game_dir: &Path, name: &str) -> PathBuf {
    runtimes_dir(game_dir)
        .join(name)
        .join(runtime_platform())
        .join(name)
}

/// Find the Java launcher binary inside an unpacked runtime.
pub fn locate_java_binary(runtime_root: &Path) -> Option<PathBuf> {
    let candidates = [
        runtime_root.join("bin").join(java_exe()),
        runtime_root
            .join("jre.bundle")
            .join("Contents")
            .join("Home")
            .join("bin")
            .join(java_exe()),
        runtime_root
            .join("Contents")
            .join("Home")
            .join("bin")
            .join(java_exe()),
    ];

    if let Some(found) = candidates.iter().find(|path| path.is_file()) {
        return Some(found.clone());
    }

    if !runtime_root.is_dir() {
        return None;
    }
    find_java_binary_recursive(runtime_root)
}

fn find_java_binary_recursive(root: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(root).ok()?;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_file() {
            let is_java = path.file_name().and_then(|n| n.to_str()) == Some(java_exe());
            let in_bin = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                == Some("bin");
            if is_java && in_bin {
                return Some(path);
            }
        } else if file_type.is_dir() {
            if let Some(found) = find_java_binary_recursive(&path) {
                return Some(found);
            }
        }
    }
    None
}

/// Names of runtimes under `<game_dir>/runtime` that contain a Java binary.
pub fn installed_runtime_names(game_dir: &Path) -> HashSet<String> {
    let Ok(entries) = std::fs::read_dir(runtimes_dir(game_dir)) else {
        return HashSet::new();
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| {
            let found = locate_java_binary(&runtime_root(game_dir, name)).is_some();
            if !found {
                debug!("Runtime directory {} has no Java binary", name);
            }
            found
        })
        .collect()
}

/// Java major a release needs when its version file does not say.
pub fn required_java_for_minecraft_version(minecraft_version: &str) -> u32 {
    let mut parts = minecraft_version.split('.');
    let major = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(1);
    let minor = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(20);
    let patch = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(0);

    if major > 1 || minor >= 21 || (minor == 20 && patch >= 5) {
        21
    } else if minor >= 18 {
        17
    } else if minor == 17 {
        16
    } else {
        8
    }
}
