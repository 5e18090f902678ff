use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::config::ConverterSettings;
use crate::error::{ReportError, Result};
use crate::pdf::Converter;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Converts spreadsheets to PDF with a headless office suite
/// (`libreoffice --headless --convert-to pdf --outdir <dir> <file>`)
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
    work_dir: Option<PathBuf>,
}

impl OfficeConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            work_dir: None,
        }
    }

    pub fn from_settings(settings: &ConverterSettings) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
            timeout: settings.timeout(),
            work_dir: settings.work_dir(),
        }
    }

    /// Arguments placed before the conversion flags
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Kill the converter if it runs longer than `timeout`.
    ///
    /// Only the spawned process is killed. A launcher such as `libreoffice`
    /// that forks `soffice.bin` may leave that child running; point
    /// `program` at the `soffice` binary itself when a timeout matters.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Directory for the temporary input and output files
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, input: &Path, out_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(out_dir)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }

    fn run(&self, input: &Path, out_dir: &Path) -> Result<()> {
        debug!(program = %self.program, input = %input.display(), "running document converter");

        let mut child = self.command(input, out_dir).spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ReportError::ConverterNotFound(self.program.clone())
            } else {
                ReportError::ConverterLaunch {
                    program: self.program.clone(),
                    source: e,
                }
            }
        })?;

        // drained while waiting so a chatty converter never blocks on a full pipe
        let stderr_pipe = child.stderr.take();
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut pipe) = stderr_pipe {
                let _ = pipe.read_to_end(&mut buf);
            }
            buf
        });

        let status = match self.timeout {
            Some(limit) => self.wait_with_timeout(&mut child, limit)?,
            None => child.wait()?,
        };
        let stderr = reader.join().unwrap_or_default();

        if !status.success() {
            warn!(program = %self.program, %status, "document converter failed");
            return Err(ReportError::ConversionFailed {
                program: self.program.clone(),
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn wait_with_timeout(&self, child: &mut Child, limit: Duration) -> Result<ExitStatus> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if started.elapsed() >= limit {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ReportError::ConversionTimeout {
                    program: self.program.clone(),
                    secs: limit.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Removes the converter's output file when dropped
struct OutputFile(PathBuf);

impl Drop for OutputFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.0) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %self.0.display(), "failed to remove converted file: {e}");
            }
        }
    }
}

impl Converter for OfficeConverter {
    fn convert(&self, spreadsheet: &[u8]) -> Result<Vec<u8>> {
        let dir = self.work_dir.clone().unwrap_or_else(std::env::temp_dir);

        let mut file = tempfile::Builder::new()
            .prefix("payments-report-")
            .suffix(".xlsx")
            .tempfile_in(&dir)?;
        file.write_all(spreadsheet)?;
        file.flush()?;
        // closed but still deleted on drop, so the converter can open it anywhere
        let input: TempPath = file.into_temp_path();
        let output = OutputFile(input.with_extension("pdf"));

        self.run(&input, &dir)?;

        if !output.0.exists() {
            return Err(ReportError::ConvertedFileMissing(output.0.clone()));
        }
        let pdf = fs::read(&output.0)?;
        debug!(bytes = pdf.len(), "converted spreadsheet to pdf");
        Ok(pdf)
    }
}
