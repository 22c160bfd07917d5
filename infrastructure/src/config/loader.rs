//! Layered TOML configuration for streamchat.
//!
//! Later layers override earlier ones key by key.

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_FILES: [&str; 2] = ["streamchat.toml", ".streamchat.toml"];

/// Prefix of environment overrides, e.g. `STREAMCHAT_API__BASE_URL`.
const ENV_PREFIX: &str = "STREAMCHAT_";

/// Finds and merges the configuration layers
pub struct ConfigLoader;

impl ConfigLoader {
    /// Merge every layer into a [`FileConfig`].
    ///
    /// Strongest first:
    /// 1. `STREAMCHAT_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./streamchat.toml` or `./.streamchat.toml`
    /// 4. Global config: `$XDG_CONFIG_HOME/streamchat/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        // A missing explicit file is an error rather than silently skipped
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(Box::new(figment::Error::from(format!(
                "config file not found: {}",
                path.display()
            ))));
        }

        Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path.map(PathBuf::as_path),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(Box::new)
    }

    /// Compiled-in defaults, ignoring files and environment
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project, explicit].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment
    }

    /// `streamchat/config.toml` under the user config dir
    /// (`$XDG_CONFIG_HOME` on Linux).
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("streamchat").join("config.toml"))
    }

    /// First project file present in the working directory
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// List every source `load` would read, strongest first.
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        let mut sources: Vec<(&str, String, bool)> = vec![("env", format!("{}*", ENV_PREFIX), true)];

        if let Some(path) = config_path {
            sources.push(("explicit", path.display().to_string(), path.exists()));
        }
        match Self::project_config_path() {
            Some(path) => sources.push(("project", path.display().to_string(), true)),
            None => sources.push(("project", PROJECT_CONFIG_FILES.join(" | "), false)),
        }
        if let Some(path) = Self::global_config_path() {
            sources.push(("global", path.display().to_string(), path.exists()));
        }
        sources.push(("defaults", "compiled in".to_string(), true));

        println!("streamchat reads configuration from (strongest first):");
        for (label, location, present) in sources {
            let mark = if present { '*' } else { ' ' };
            println!("  {} {:<8} {}", mark, label, location);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config, FileConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("streamchat"));
    }

    #[test]
    fn test_explicit_file_overrides_project_and_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        let explicit = dir.path().join("explicit.toml");

        fs::write(
            &global,
            "[api]\nbase_url = \"https://global.example.com\"\nconnect_timeout_secs = 30\n",
        )
        .unwrap();
        fs::write(&project, "[api]\nbase_url = \"https://project.example.com\"\n").unwrap();
        fs::write(&explicit, "[session]\non_switch = \"cancel\"\n").unwrap();

        let config: FileConfig =
            ConfigLoader::figment(Some(&global), Some(&project), Some(&explicit))
                .extract()
                .unwrap();

        assert_eq!(config.api.base_url, "https://project.example.com");
        assert_eq!(config.api.connect_timeout_secs, 30);
        assert_eq!(config.session.on_switch, "cancel");
        assert_eq!(config.storage.key, "chatState");
    }

    #[test]
    fn test_missing_optional_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let config: FileConfig = ConfigLoader::figment(Some(&missing), Some(&missing), None)
            .extract()
            .unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = ConfigLoader::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[api\nbase_url = ").unwrap();

        let result: Result<FileConfig, _> = ConfigLoader::figment(Some(&path), None, None).extract();
        assert!(result.is_err());
    }
}
