use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use url::Url;
use wrapper_core::{endpoint::EndpointConfig, model::ModelCatalog};

use crate::{fs_ext::read_file_to_string, tui::event::EventDefinitions};

const APP_NAME: &str = "privacy_wrapper";
const CONFIG_PATH_VAR: &str = "PRIVACY_WRAPPER_CONFIG_PATH";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "privacy-wrapper.log";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log_file: LogFile,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub models: ModelCatalog,
    #[serde(default)]
    pub keymap: EventDefinitions,
}

impl Config {
    /// Load from `path`, then `$PRIVACY_WRAPPER_CONFIG_PATH`,
    /// then the XDG config dir. Only the XDG file may be absent.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from));

        let path = match explicit {
            Some(path) => path,
            None => match base_dirs()?.find_config_file(CONFIG_FILE_NAME) {
                Some(path) => path,
                None => return Ok(Config::default()),
            },
        };

        let contents = read_file_to_string(&path)?;
        Config::from_toml(&contents)
            .with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn with_base_url(mut self, base_url: Option<Url>) -> Self {
        if let Some(base_url) = base_url {
            self.endpoint.base_url = base_url;
        }
        self
    }
}

/// Where the JSON logs go. Defaults to the XDG state dir.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFile(Option<PathBuf>);

impl LogFile {
    pub fn path(&self) -> anyhow::Result<PathBuf> {
        match &self.0 {
            Some(path) => Ok(path.clone()),
            None => Ok(base_dirs()?.place_state_file(LOG_FILE_NAME)?),
        }
    }
}

fn base_dirs() -> anyhow::Result<xdg::BaseDirectories> {
    Ok(xdg::BaseDirectories::with_prefix(APP_NAME)?)
}

#[cfg(test)]
mod tests {
    use std::{io::Write as _, time::Duration};

    use pretty_assertions::assert_eq;

    use crate::tui::event::{Action, InputMode, KeyBinding};

    use super::*;

    const FULL: &str = r#"
        log_file = "/tmp/privacy-wrapper-test.log"

        [endpoint]
        base_url = "https://wrapper.example.com"
        query_path = "/v2/query"
        timeout_secs = 15

        [[models]]
        id = "meta-llama/Meta-Llama-3.1-8B-Instruct"
        label = "Llama 3.1 8B"

        [[models]]
        id = "meta-llama/Meta-Llama-3.1-70B-Instruct"
        label = "Llama 3.1 70B"

        [keymap.normal]
        x = "submit"
    "#;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config.endpoint, EndpointConfig::default());
        assert_eq!(config.models, ModelCatalog::default());
        assert_eq!(config.keymap, EventDefinitions::default());
    }

    #[test]
    fn full_file() {
        let config = Config::from_toml(FULL).unwrap();

        assert_eq!(
            config.log_file.path().unwrap(),
            PathBuf::from("/tmp/privacy-wrapper-test.log")
        );
        assert_eq!(
            config.endpoint.query_url().unwrap().as_str(),
            "https://wrapper.example.com/v2/query"
        );
        assert_eq!(config.endpoint.health_path, "/api/health");
        assert_eq!(config.endpoint.timeout, Duration::from_secs(15));
        assert_eq!(config.models.options().len(), 2);
        assert_eq!(
            config.models.default_model().as_str(),
            "meta-llama/Meta-Llama-3.1-8B-Instruct"
        );

        let submit: KeyBinding = "x".parse().unwrap();
        assert_eq!(
            config.keymap.0[&InputMode::Normal].0.get(&submit),
            Some(&Action::Submit)
        );
    }

    #[test]
    fn bad_key_binding_is_rejected() {
        let result = Config::from_toml(
            r#"
            [keymap.edit]
            "super-duper-x" = "quit"
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn duplicate_models_are_rejected() {
        let result = Config::from_toml(
            r#"
            [[models]]
            id = "gpt-4"
            [[models]]
            id = "gpt-4"
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.models.options().len(), 2);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = Config::load(Some(dir.path().join("missing.toml").as_path()));

        assert!(result.is_err());
    }

    #[test]
    fn base_url_override() {
        let url: Url = "http://127.0.0.1:9999".parse().unwrap();

        let config = Config::default().with_base_url(Some(url.clone()));

        assert_eq!(config.endpoint.base_url, url);
    }
}
