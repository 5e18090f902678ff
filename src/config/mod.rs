mod settings;
pub mod state;

pub use settings::{Config, ConverterSettings, ReportSettings, StoreSettings};
pub use state::{AttachmentEntry, State};

use crate::error::{ReportError, Result};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const STATE_FILE: &str = "attachments.toml";

/// Get the config directory path (~/.payments-report/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "payments-report") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.payments-report/
    let home = dirs_home().ok_or_else(|| {
        ReportError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".payments-report"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the attachment store directory against the config dir
pub fn resolve_store_dir(settings: &StoreSettings, config_dir: &Path) -> PathBuf {
    match settings.dir.as_deref() {
        Some(dir) => {
            let path = expand_path(dir);
            if path.is_relative() {
                config_dir.join(path)
            } else {
                path
            }
        }
        None => config_dir.join("attachments"),
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(ReportError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(ReportError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ReportError::ConfigParse { path, source: e })
}

/// Create the config directory with a template config.toml
pub fn init_config(config_dir: &Path) -> Result<()> {
    if config_dir.exists() {
        return Err(ReportError::AlreadyInitialized(config_dir.to_path_buf()));
    }

    fs::create_dir_all(config_dir)?;
    fs::create_dir_all(config_dir.join("attachments"))?;
    fs::write(config_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    Ok(())
}

/// Load the attachment index (empty if missing)
pub fn load_state(store_dir: &Path) -> Result<State> {
    let path = store_dir.join(STATE_FILE);
    if !path.exists() {
        return Ok(State::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ReportError::ConfigParse { path, source: e })
}

/// Save the attachment index. Readers see either the old or the new file.
pub fn save_state(store_dir: &Path, state: &State) -> Result<()> {
    let path = store_dir.join(STATE_FILE);
    let content = toml::to_string_pretty(state).map_err(|e| {
        ReportError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    let mut tmp = NamedTempFile::new_in(store_dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(&path).map_err(|e| e.error)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[report]
organization = "Empresa-Sucursal: Ing. Ramón Russo"
sheet_name = "Reporte de Pagos"
attachment_name = "Reporte_Pagos.pdf"
content_url = "/web/content"

[converter]
program = "libreoffice"   # or "soffice"
args = []                 # extra arguments placed before --headless
# timeout_secs = 120      # kill the converter after this many seconds
# work_dir = "/tmp"       # where temporary .xlsx/.pdf files are written

[store]
# dir = "~/reports"       # defaults to <config dir>/attachments
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn template_parses_to_defaults() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.report.attachment_name, "Reporte_Pagos.pdf");
        assert_eq!(config.report.content_url, "/web/content");
        assert_eq!(config.converter.program, "libreoffice");
        assert!(config.converter.timeout().is_none());
        assert!(config.store.dir.is_none());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("[converter]\nprogram = \"soffice\"\n").unwrap();
        assert_eq!(config.converter.program, "soffice");
        assert_eq!(config.report.sheet_name, "Reporte de Pagos");
    }

    #[test]
    fn init_then_load() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("cfg");
        init_config(&dir).unwrap();
        let config = load_config(&dir).unwrap();
        assert_eq!(resolve_store_dir(&config.store, &dir), dir.join("attachments"));

        let err = init_config(&dir).unwrap_err();
        assert!(matches!(err, ReportError::AlreadyInitialized(_)));
    }

    #[test]
    fn save_state_replaces_index_in_place() {
        let temp = TempDir::new().unwrap();
        let mut state = State::default();
        state.counter.last_id = 4;
        save_state(temp.path(), &state).unwrap();
        state.counter.last_id = 5;
        save_state(temp.path(), &state).unwrap();

        assert_eq!(load_state(temp.path()).unwrap().counter.last_id, 5);
        let files: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(files, [STATE_FILE]);
    }

    #[test]
    fn relative_store_dir_resolves_against_config_dir() {
        let settings = StoreSettings {
            dir: Some("out".to_string()),
        };
        assert_eq!(
            resolve_store_dir(&settings, Path::new("/etc/pr")),
            PathBuf::from("/etc/pr/out")
        );
    }
}
