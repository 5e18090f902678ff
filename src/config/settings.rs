use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ORGANIZATION: &str = "Empresa-Sucursal: Ing. Ramón Russo";
pub const DEFAULT_SHEET_NAME: &str = "Reporte de Pagos";
pub const DEFAULT_ATTACHMENT_NAME: &str = "Reporte_Pagos.pdf";
pub const DEFAULT_CONTENT_URL: &str = "/web/content";
pub const DEFAULT_CONVERTER: &str = "libreoffice";

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub converter: ConverterSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ReportSettings {
    /// Label printed under the date line
    pub organization: String,
    pub sheet_name: String,
    pub attachment_name: String,
    /// Route the host serves attachments from
    pub content_url: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            attachment_name: DEFAULT_ATTACHMENT_NAME.to_string(),
            content_url: DEFAULT_CONTENT_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ConverterSettings {
    pub program: String,
    /// Arguments placed before the conversion flags
    pub args: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub work_dir: Option<String>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_CONVERTER.to_string(),
            args: Vec::new(),
            timeout_secs: None,
            work_dir: None,
        }
    }
}

impl ConverterSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn work_dir(&self) -> Option<PathBuf> {
        self.work_dir.as_deref().map(super::expand_path)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct StoreSettings {
    /// Attachment directory; relative paths resolve against the config dir
    pub dir: Option<String>,
}
