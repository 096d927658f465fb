// ─── Version File ───
// Parses an installed Mojang version JSON and evaluates OS rules for
// libraries and launch arguments.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

/// A parsed `versions/<id>/<id>.json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: Option<String>,
    pub main_class: String,
    #[serde(default, rename = "type")]
    pub version_type: Option<String>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexInfo>,
    #[serde(default)]
    pub assets: Option<String>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    /// Legacy `minecraftArguments` field (pre-1.13).
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    pub component: String,
    pub major_version: u32,
}

#[derive(Debug, Deserialize)]
pub struct VersionDownloads {
    pub client: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub sha1: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetIndexInfo {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<serde_json::Value>,
    #[serde(default)]
    pub jvm: Vec<serde_json::Value>,
}

// ─── Library Entry with Rules ───

#[derive(Debug, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
    #[serde(default)]
    pub natives: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryDownloads {
    pub artifact: Option<LibDownloadArtifact>,
    #[serde(default)]
    pub classifiers: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub struct LibDownloadArtifact {
    pub path: String,
}

// ─── Rule Evaluation ───

#[derive(Debug, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
    /// Launcher features (`is_demo_user`, `has_custom_resolution`, ...).
    /// None of them are enabled by this launcher.
    #[serde(default)]
    pub features: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
}

impl Rule {
    fn matches_current_platform(&self) -> bool {
        if self.features.as_ref().is_some_and(|f| !f.is_empty()) {
            return false;
        }
        match &self.os {
            None => true,
            Some(os) => {
                let name_ok = os.name.as_deref().is_none_or(|n| n == current_os_name());
                let arch_ok = os.arch.as_deref().is_none_or(|a| a == current_arch_name());
                name_ok && arch_ok
            }
        }
    }
}

/// Mojang rules: no rules means allowed; otherwise start disallowed and let
/// every matching rule set the outcome, last match wins.
pub fn rules_allow(rules: Option<&[Rule]>) -> bool {
    let Some(rules) = rules else {
        return true;
    };

    let mut allowed = false;
    for rule in rules {
        if rule.matches_current_platform() {
            allowed = rule.action == RuleAction::Allow;
        }
    }
    allowed
}

impl LibraryEntry {
    pub fn is_allowed_for_current_os(&self) -> bool {
        rules_allow(self.rules.as_deref())
    }

    /// Relative path of the main artifact under `libraries/`.
    pub fn artifact_path(&self) -> Option<&str> {
        self.downloads
            .as_ref()?
            .artifact
            .as_ref()
            .map(|a| a.path.as_str())
    }

    /// Relative path of the native classifier jar for this OS, if the library
    /// ships natives the pre-1.19 way.
    pub fn native_classifier_path(&self) -> Option<String> {
        let natives = self.natives.as_ref()?;
        let arch = if cfg!(target_pointer_width = "64") {
            "64"
        } else {
            "32"
        };
        let classifier = natives
            .get(current_os_name())?
            .as_str()?
            .replace("${arch}", arch);
        let classifiers = self.downloads.as_ref()?.classifiers.as_ref()?;
        classifiers
            .get(&classifier)?
            .get("path")?
            .as_str()
            .map(ToString::to_string)
    }
}

/// Mojang OS name for the current platform.
pub fn current_os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

fn current_arch_name() -> &'static str {
    if cfg!(target_arch = "x86") {
        "x86"
    } else if cfg!(target_arch = "aarch64") {
        "arm64"
    } else {
        "x86_64"
    }
}

impl VersionJson {
    /// Path of the version JSON inside a game directory.
    pub fn path_in(game_dir: &Path, version_id: &str) -> PathBuf {
        game_dir
            .join("versions")
            .join(version_id)
            .join(format!("{version_id}.json"))
    }

    /// Path of the client jar inside a game directory.
    pub fn client_jar_in(game_dir: &Path, version_id: &str) -> PathBuf {
        game_dir
            .join("versions")
            .join(version_id)
            .join(format!("{version_id}.jar"))
    }

    /// Read and parse an installed version.
    pub fn load(game_dir: &Path, version_id: &str) -> LauncherResult<Self> {
        let path = Self::path_in(game_dir, version_id);
        if !path.is_file() {
            return Err(LauncherError::VersionNotInstalled {
                version: version_id.to_string(),
                path,
            });
        }
        let raw = std::fs::read_to_string(&path).map_err(LauncherError::io(&path))?;
        let parsed: VersionJson = serde_json::from_str(&raw)?;
        debug!(
            "Loaded version {} ({} libraries)",
            version_id,
            parsed.libraries.len()
        );
        Ok(parsed)
    }

    pub fn asset_index_id(&self) -> Option<&str> {
        self.asset_index
            .as_ref()
            .map(|a| a.id.as_str())
            .or(self.assets.as_deref())
    }

    /// Game arguments allowed on this platform, placeholders unresolved.
    pub fn game_args(&self) -> Vec<String> {
        match &self.arguments {
            Some(args) => args.game.iter().flat_map(extract_argument_values).collect(),
            None => match &self.minecraft_arguments {
                Some(s) => s.split_whitespace().map(ToString::to_string).collect(),
                None => vec![],
            },
        }
    }

    /// JVM arguments allowed on this platform, placeholders unresolved.
    /// Legacy versions carry none, so the classic trio is synthesized.
    pub fn jvm_args(&self) -> Vec<String> {
        match &self.arguments {
            Some(args) if !args.jvm.is_empty() => {
                args.jvm.iter().flat_map(extract_argument_values).collect()
            }
            _ => vec![
                "-Djava.library.path=${natives_directory}".into(),
                "-cp".into(),
                "${classpath}".into(),
            ],
        }
    }
}

fn extract_argument_values(value: &serde_json::Value) -> Vec<String> {
    if let Some(arg) = value.as_str() {
        return vec![arg.to_string()];
    }

    let Some(obj) = value.as_object() else {
        return vec![];
    };

    if let Some(rules) = obj.get("rules") {
        let parsed: Vec<Rule> = match serde_json::from_value(rules.clone()) {
            Ok(parsed) => parsed,
            Err(_) => return vec![],
        };
        if !rules_allow(Some(&parsed)) {
            return vec![];
        }
    }

    match obj.get("value") {
        Some(serde_json::Value::String(s)) => vec![s.clone()],
        Some(serde_json::Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str().map(ToString::to_string))
            .collect(),
        _ => vec![],
    }
}
