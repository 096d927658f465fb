use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tracing::{debug, info, warn};

use super::arguments::{substitute_args, Placeholders};
use super::classpath::{self, safe_path_str};
use super::{Installer, LaunchOptions, ProgressReporter, RuntimeInfo};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::java;
use crate::core::version::VersionJson;

/// Works against a game directory the official launcher already populated.
/// Verifies files but never downloads them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalInstaller;

impl LocalInstaller {
    pub fn new() -> Self {
        Self
    }
}

/// Runtime component the official launcher uses for a Java major.
fn default_runtime_name(java_major: u32) -> &'static str {
    match java_major {
        0..=8 => "jre-legacy",
        9..=16 => "java-runtime-alpha",
        17 => "java-runtime-gamma",
        _ => "java-runtime-delta",
    }
}

struct RequiredFile {
    path: PathBuf,
    sha1: Option<String>,
}

fn required_files(game_dir: &Path, version_id: &str, version: &VersionJson) -> Vec<RequiredFile> {
    let client_sha1 = version
        .downloads
        .as_ref()
        .and_then(|d| d.client.as_ref())
        .map(|c| c.sha1.clone());

    let mut files: Vec<RequiredFile> = classpath::classpath_entries(game_dir, version_id, version)
        .into_iter()
        .map(|path| RequiredFile { path, sha1: None })
        .collect();
    if let Some(client) = files.last_mut() {
        client.sha1 = client_sha1;
    }
    files.extend(
        classpath::native_jars(game_dir, version)
            .into_iter()
            .map(|path| RequiredFile { path, sha1: None }),
    );
    files
}

fn sha1_file(path: &Path) -> LauncherResult<String> {
    let mut file = std::fs::File::open(path).map_err(LauncherError::io(path))?;
    let mut hasher = Sha1::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buf).map_err(LauncherError::io(path))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

impl Installer for LocalInstaller {
    fn resolve_runtime(&self, version_id: &str, game_dir: &Path) -> LauncherResult<RuntimeInfo> {
        let version = VersionJson::load(game_dir, version_id)?;
        let info = match version.java_version {
            Some(java_version) => RuntimeInfo {
                name: java_version.component,
                java_major: java_version.major_version,
            },
            None => {
                let java_major = java::required_java_for_minecraft_version(version_id);
                RuntimeInfo {
                    name: default_runtime_name(java_major).to_string(),
                    java_major,
                }
            }
        };
        debug!("Version {} wants runtime {:?}", version_id, info);
        Ok(info)
    }

    fn installed_runtimes(&self, game_dir: &Path) -> LauncherResult<HashSet<String>> {
        Ok(java::installed_runtime_names(game_dir))
    }

    fn install_runtime(
        &self,
        name: &str,
        game_dir: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> LauncherResult<()> {
        progress.set_status(&format!("Looking for runtime {name}"));
        if java::locate_java_binary(&java::runtime_root(game_dir, name)).is_some() {
            return Ok(());
        }
        Err(LauncherError::RuntimeUnavailable(format!(
            "{name} is not present in {:?}; start the game once from the official launcher to install it",
            game_dir.join("runtime")
        )))
    }

    fn executable_path(&self, name: &str, game_dir: &Path) -> Option<PathBuf> {
        java::locate_java_binary(&java::runtime_root(game_dir, name))
    }

    fn install_version(
        &self,
        version_id: &str,
        game_dir: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> LauncherResult<()> {
        progress.set_status(&format!("Checking files for {version_id}"));
        let version = VersionJson::load(game_dir, version_id)?;
        let files = required_files(game_dir, version_id, &version);

        progress.set_max(files.len() as u64);
        let mut missing: Vec<&Path> = Vec::new();
        for (index, file) in files.iter().enumerate() {
            if !file.path.is_file() {
                debug!("Missing {:?}", file.path);
                missing.push(&file.path);
            } else if let Some(expected) = &file.sha1 {
                let actual = sha1_file(&file.path)?;
                if !actual.eq_ignore_ascii_case(expected) {
                    return Err(LauncherError::Sha1Mismatch {
                        path: file.path.clone(),
                        expected: expected.clone(),
                        actual,
                    });
                }
            }
            progress.set_progress(index as u64 + 1);
        }

        if let Some(first) = missing.first() {
            warn!("{} of {} files missing for {}", missing.len(), files.len(), version_id);
            return Err(LauncherError::MissingFiles {
                version: version_id.to_string(),
                missing: missing.len(),
                first: first.to_path_buf(),
            });
        }

        let native_jars = classpath::native_jars(game_dir, &version);
        if !native_jars.is_empty() {
            progress.set_status("Extracting native libraries");
            let dest = classpath::natives_dir(game_dir, version_id);
            let count = classpath::extract_natives(&native_jars, &dest)?;
            debug!("Extracted {} native files into {:?}", count, dest);
        }

        progress.set_status(&format!("{version_id} ready"));
        info!("Verified {} files for {}", files.len(), version_id);
        Ok(())
    }

    fn build_command(
        &self,
        version_id: &str,
        game_dir: &Path,
        options: &LaunchOptions,
    ) -> LauncherResult<Vec<String>> {
        let version = VersionJson::load(game_dir, version_id)?;

        let class_path = classpath::build_classpath(game_dir, version_id, &version);
        let game_directory = safe_path_str(game_dir);
        let assets_root = safe_path_str(&game_dir.join("assets"));
        let natives_directory = safe_path_str(&classpath::natives_dir(game_dir, version_id));
        let library_directory = safe_path_str(&classpath::libraries_dir(game_dir));
        let version_type = version.version_type.as_deref().unwrap_or("release");
        let asset_index = version.asset_index_id().unwrap_or("legacy");

        let values = Placeholders::from([
            ("auth_player_name", options.username.as_str()),
            ("auth_uuid", options.uuid.as_str()),
            ("auth_access_token", options.token.as_str()),
            ("auth_session", options.token.as_str()),
            ("user_type", "msa"),
            ("user_properties", "{}"),
            ("version_name", version_id),
            ("version_type", version_type),
            ("game_directory", game_directory.as_str()),
            ("assets_root", assets_root.as_str()),
            ("game_assets", assets_root.as_str()),
            ("assets_index_name", asset_index),
            ("natives_directory", natives_directory.as_str()),
            ("launcher_name", options.launcher_name.as_str()),
            ("launcher_version", options.launcher_version.as_str()),
            ("classpath", class_path.as_str()),
            ("classpath_separator", classpath::get_classpath_separator()),
            ("library_directory", library_directory.as_str()),
            ("clientid", ""),
            ("auth_xuid", ""),
        ]);

        let mut argv = vec![options.executable_path.to_string_lossy().to_string()];
        argv.extend(substitute_args(&version.jvm_args(), &values));
        argv.push(version.main_class.clone());
        argv.extend(substitute_args(&version.game_args(), &values));
        Ok(argv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::installer::testing::RecordingProgress;

    const VERSION_ID: &str = "1.20.1";

    fn write(path: &Path, bytes: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    fn install_fixture(game_dir: &Path, client_sha1: &str) {
        let json = serde_json::json!({
            "id": VERSION_ID,
            "type": "release",
            "mainClass": "net.minecraft.client.main.Main",
            "assetIndex": {"id": "5"},
            "javaVersion": {"component": "java-runtime-gamma", "majorVersion": 17},
            "downloads": {"client": {"sha1": client_sha1}},
            "libraries": [
                {"name": "com.example:lib:1", "downloads": {"artifact": {"path": "com/example/lib-1.jar"}}}
            ],
            "arguments": {
                "game": [
                    "--username", "${auth_player_name}",
                    "--uuid", "${auth_uuid}",
                    "--accessToken", "${auth_access_token}",
                    "--userType", "${user_type}",
                    "--assetIndex", "${assets_index_name}",
                    {"rules": [{"action": "allow", "features": {"is_demo_user": true}}], "value": "--demo"},
                    "--quickPlayPath", "${quickPlayPath}"
                ],
                "jvm": [
                    "-Djava.library.path=${natives_directory}",
                    "-Dminecraft.launcher.brand=${launcher_name}",
                    "-cp", "${classpath}"
                ]
            }
        });
        write(
            &VersionJson::path_in(game_dir, VERSION_ID),
            json.to_string().as_bytes(),
        );
        write(&VersionJson::client_jar_in(game_dir, VERSION_ID), b"client");
        write(
            &game_dir.join("libraries").join("com/example/lib-1.jar"),
            b"lib",
        );
    }

    fn options() -> LaunchOptions {
        LaunchOptions {
            username: "Steve".into(),
            uuid: "uuid-1".into(),
            token: "tok".into(),
            executable_path: PathBuf::from("/rt/bin/java"),
            launcher_name: "Blocklaunch".into(),
            launcher_version: "0.1.0".into(),
        }
    }

    fn client_sha1() -> String {
        let mut hasher = Sha1::new();
        hasher.update(b"client");
        hex::encode(hasher.finalize())
    }

    #[test]
    fn resolves_runtime_from_version_file() {
        let temp = tempfile::tempdir().unwrap();
        install_fixture(temp.path(), &client_sha1());

        let info = LocalInstaller.resolve_runtime(VERSION_ID, temp.path()).unwrap();
        assert_eq!(
            info,
            RuntimeInfo {
                name: "java-runtime-gamma".into(),
                java_major: 17
            }
        );
    }

    #[test]
    fn missing_version_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let err = LocalInstaller
            .resolve_runtime(VERSION_ID, temp.path())
            .unwrap_err();
        assert!(matches!(err, LauncherError::VersionNotInstalled { .. }));
    }

    #[test]
    fn runtime_cannot_be_installed_offline() {
        let temp = tempfile::tempdir().unwrap();
        let mut progress = RecordingProgress::default();
        let err = LocalInstaller
            .install_runtime("java-runtime-gamma", temp.path(), &mut progress)
            .unwrap_err();
        assert!(matches!(err, LauncherError::RuntimeUnavailable(_)));
        assert!(LocalInstaller
            .executable_path("java-runtime-gamma", temp.path())
            .is_none());
    }

    #[test]
    fn install_version_verifies_every_file() {
        let temp = tempfile::tempdir().unwrap();
        install_fixture(temp.path(), &client_sha1());

        let mut progress = RecordingProgress::default();
        LocalInstaller
            .install_version(VERSION_ID, temp.path(), &mut progress)
            .unwrap();
        assert_eq!(progress.max, Some(2));
        assert_eq!(progress.last, Some(2));
        assert!(!progress.statuses.is_empty());
    }

    #[test]
    fn install_version_reports_missing_files() {
        let temp = tempfile::tempdir().unwrap();
        install_fixture(temp.path(), &client_sha1());
        std::fs::remove_file(temp.path().join("libraries").join("com/example/lib-1.jar")).unwrap();

        let err = LocalInstaller
            .install_version(VERSION_ID, temp.path(), &mut RecordingProgress::default())
            .unwrap_err();
        match err {
            LauncherError::MissingFiles { missing, .. } => assert_eq!(missing, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn install_version_rejects_corrupt_client() {
        let temp = tempfile::tempdir().unwrap();
        install_fixture(temp.path(), "0000000000000000000000000000000000000000");

        let err = LocalInstaller
            .install_version(VERSION_ID, temp.path(), &mut RecordingProgress::default())
            .unwrap_err();
        assert!(matches!(err, LauncherError::Sha1Mismatch { .. }));
    }

    #[test]
    fn command_substitutes_identity_and_drops_unresolved() {
        let temp = tempfile::tempdir().unwrap();
        install_fixture(temp.path(), &client_sha1());

        let argv = LocalInstaller
            .build_command(VERSION_ID, temp.path(), &options())
            .unwrap();

        assert_eq!(argv[0], "/rt/bin/java");
        assert!(argv.contains(&"-Dminecraft.launcher.brand=Blocklaunch".to_string()));

        let main = argv
            .iter()
            .position(|a| a == "net.minecraft.client.main.Main")
            .unwrap();
        let cp_flag = argv.iter().position(|a| a == "-cp").unwrap();
        assert!(cp_flag < main);
        assert!(argv[cp_flag + 1].ends_with("1.20.1.jar"));

        let game_args = &argv[main + 1..];
        assert_eq!(
            game_args,
            &[
                "--username",
                "Steve",
                "--uuid",
                "uuid-1",
                "--accessToken",
                "tok",
                "--userType",
                "msa",
                "--assetIndex",
                "5"
            ]
        );
    }
}
