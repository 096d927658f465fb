// ─── Classpath & Natives ───
// Builds the Java classpath for an installed version and unpacks legacy
// native libraries next to it.

use std::collections::HashSet;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::VersionJson;

/// Platform-specific Java classpath separator.
pub fn get_classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

/// `<game_dir>/libraries`
pub fn libraries_dir(game_dir: &Path) -> PathBuf {
    game_dir.join("libraries")
}

/// `<game_dir>/versions/<id>/natives`
pub fn natives_dir(game_dir: &Path, version_id: &str) -> PathBuf {
    game_dir.join("versions").join(version_id).join("natives")
}

/// Jars that belong on the classpath, in declaration order, client jar last.
pub fn classpath_entries(game_dir: &Path, version_id: &str, version: &VersionJson) -> Vec<PathBuf> {
    let libs = libraries_dir(game_dir);
    let mut entries: Vec<PathBuf> = version
        .libraries
        .iter()
        .filter(|lib| lib.is_allowed_for_current_os())
        .filter_map(|lib| lib.artifact_path())
        .map(|relative| libs.join(relative))
        .collect();
    entries.push(VersionJson::client_jar_in(game_dir, version_id));
    dedup_preserving_order(&mut entries);
    entries
}

/// Native classifier jars for this OS (pre-1.19 layout).
pub fn native_jars(game_dir: &Path, version: &VersionJson) -> Vec<PathBuf> {
    let libs = libraries_dir(game_dir);
    version
        .libraries
        .iter()
        .filter(|lib| lib.is_allowed_for_current_os())
        .filter_map(|lib| lib.native_classifier_path())
        .map(|relative| libs.join(relative))
        .collect()
}

/// Joined classpath string for the `${classpath}` placeholder.
pub fn build_classpath(game_dir: &Path, version_id: &str, version: &VersionJson) -> String {
    classpath_entries(game_dir, version_id, version)
        .iter()
        .map(|entry| safe_path_str(entry))
        .collect::<Vec<_>>()
        .join(get_classpath_separator())
}

fn dedup_preserving_order(entries: &mut Vec<PathBuf>) {
    let mut seen = HashSet::new();
    entries.retain(|entry| {
        let key = if cfg!(target_os = "windows") {
            entry.to_string_lossy().to_lowercase()
        } else {
            entry.to_string_lossy().to_string()
        };
        seen.insert(key)
    });
}

/// Unpack the shared libraries of every jar in `jars` into `dest`.
/// Returns how many files were written.
pub fn extract_natives(jars: &[PathBuf], dest: &Path) -> LauncherResult<usize> {
    std::fs::create_dir_all(dest).map_err(LauncherError::io(dest))?;

    let mut extracted = 0;
    for jar in jars {
        let file = std::fs::File::open(jar).map_err(LauncherError::io(jar))?;
        let mut archive = match zip::ZipArchive::new(file) {
            Ok(archive) => archive,
            Err(err) => {
                warn!("Cannot open native JAR {:?}: {}", jar, err);
                continue;
            }
        };
        extracted += extract_archive_natives(&mut archive, dest)?;
    }
    Ok(extracted)
}

fn extract_archive_natives<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    dest: &Path,
) -> LauncherResult<usize> {
    let mut extracted = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();

        if entry.is_dir()
            || name.starts_with("META-INF")
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\')
        {
            continue;
        }

        let out_path = dest.join(&name);
        let mut out = std::fs::File::create(&out_path).map_err(LauncherError::io(&out_path))?;
        std::io::copy(&mut entry, &mut out).map_err(LauncherError::io(&out_path))?;
        debug!("Extracted native: {}", name);
        extracted += 1;
    }
    Ok(extracted)
}

/// Convert path to string, without the `\\?\` prefix Java chokes on.
pub fn safe_path_str(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let text = resolved.to_string_lossy().to_string();

    #[cfg(target_os = "windows")]
    {
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn version_json(raw: &str) -> VersionJson {
        serde_json::from_str(raw).unwrap()
    }

    fn write_jar(path: &Path, files: &[(&str, &[u8])]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, bytes) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn classpath_lists_allowed_libraries_then_client() {
        let game = Path::new("/game");
        let version = version_json(
            r#"{
                "mainClass": "net.minecraft.client.main.Main",
                "libraries": [
                    {"name": "a:a:1", "downloads": {"artifact": {"path": "a/a.jar"}}},
                    {"name": "b:b:1", "downloads": {"artifact": {"path": "b/b.jar"}},
                     "rules": [{"action": "allow", "os": {"name": "no-such-os"}}]},
                    {"name": "a:a:1", "downloads": {"artifact": {"path": "a/a.jar"}}}
                ]
            }"#,
        );

        let entries = classpath_entries(game, "1.20.1", &version);
        assert_eq!(
            entries,
            vec![
                game.join("libraries").join("a/a.jar"),
                game.join("versions").join("1.20.1").join("1.20.1.jar"),
            ]
        );

        let joined = build_classpath(game, "1.20.1", &version);
        assert_eq!(joined.matches(get_classpath_separator()).count(), 1);
    }

    #[test]
    fn natives_skip_metadata_and_nested_entries() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("lwjgl-natives.jar");
        write_jar(
            &jar,
            &[
                ("liblwjgl.so", b"elf"),
                ("META-INF/MANIFEST.MF", b"manifest"),
                ("nested/libother.so", b"elf"),
            ],
        );

        let dest = temp.path().join("natives");
        let count = extract_natives(&[jar], &dest).unwrap();

        assert_eq!(count, 1);
        assert!(dest.join("liblwjgl.so").is_file());
        assert!(!dest.join("META-INF").exists());
        assert!(!dest.join("nested").exists());
    }

    #[test]
    fn unreadable_native_jar_is_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("broken.jar");
        std::fs::write(&jar, b"not a zip").unwrap();

        let count = extract_natives(&[jar], &temp.path().join("natives")).unwrap();
        assert_eq!(count, 0);
    }
}
