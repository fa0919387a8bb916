// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ghostscript delegate: one subprocess per operation.
//
// Input and output go through uniquely named temporary files that are removed
// when this module returns, whatever the outcome. The child is polled against
// a deadline and killed when it overruns.

use std::ffi::OsString;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use pressproof_core::config::RenderConfig;
use pressproof_core::error::{PreflightError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::traits::Renderer;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Longest stderr excerpt carried into an error.
const STDERR_LIMIT: usize = 2048;

/// Operations with a fixed argument set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ConvertToCmyk,
    FlattenTransparency,
    ResampleImages { target_dpi: u32 },
    MakePdfx1a,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConvertToCmyk => "convert_to_cmyk",
            Self::FlattenTransparency => "flatten_transparency",
            Self::ResampleImages { .. } => "resample_images",
            Self::MakePdfx1a => "make_pdfx1a",
        }
    }

    /// Operation-specific switches, placed between the common switches and
    /// the file arguments.
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::ConvertToCmyk => cmyk_args(),
            Self::FlattenTransparency => vec!["-dHaveTransparency=false".to_string()],
            Self::ResampleImages { target_dpi } => {
                let mut args = Vec::with_capacity(9);
                for kind in ["Color", "Gray", "Mono"] {
                    args.push(format!("-dDownsample{kind}Images=true"));
                    args.push(format!("-d{kind}ImageResolution={target_dpi}"));
                }
                args.push("-dColorImageDownsampleType=/Bicubic".to_string());
                args.push("-dGrayImageDownsampleType=/Bicubic".to_string());
                args
            }
            Self::MakePdfx1a => {
                let mut args = vec!["-dPDFX".to_string()];
                args.extend(cmyk_args());
                args
            }
        }
    }
}

fn cmyk_args() -> Vec<String> {
    vec![
        "-sColorConversionStrategy=CMYK".to_string(),
        "-dProcessColorModel=/DeviceCMYK".to_string(),
    ]
}

/// Full argument list for one invocation.
pub fn command_args(operation: Operation, input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-dNOPAUSE", "-dBATCH", "-dSAFER", "-dQUIET", "-sDEVICE=pdfwrite"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.extend(operation.args().into_iter().map(OsString::from));

    let mut output_arg = OsString::from("-sOutputFile=");
    output_arg.push(output.as_os_str());
    args.push(output_arg);
    args.push(input.as_os_str().to_owned());
    args
}

/// Runs Ghostscript (or a compatible `pdfwrite` engine) as a subprocess.
#[derive(Debug, Clone)]
pub struct GhostscriptRenderer {
    config: RenderConfig,
}

impl Default for GhostscriptRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl GhostscriptRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn binary(&self) -> &str {
        &self.config.binary
    }

    /// Whether `<binary> --version` runs and exits successfully.
    pub fn is_available(&self) -> bool {
        self.version().is_ok()
    }

    /// The engine's version string.
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.config.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|err| self.spawn_error(err))?;
        if !output.status.success() {
            return Err(self.failure(output.status, &output.stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run one operation on `pdf`, returning the engine's output bytes.
    #[instrument(skip(self, pdf), fields(binary = %self.config.binary, bytes_len = pdf.len()))]
    pub fn run(&self, operation: Operation, pdf: &[u8]) -> Result<Vec<u8>> {
        let job = Uuid::new_v4();
        let mut input = self.temp_file(&format!("pressproof-{job}-in-"))?;
        input.write_all(pdf)?;
        input.flush()?;
        let output = self.temp_file(&format!("pressproof-{job}-out-"))?;
        let mut stderr = match &self.config.temp_dir {
            Some(dir) => tempfile::tempfile_in(dir)?,
            None => tempfile::tempfile()?,
        };

        let args = command_args(operation, input.path(), output.path());
        debug!(?args, "spawning renderer");
        let started = Instant::now();
        let child = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr.try_clone()?))
            .spawn()
            .map_err(|err| self.spawn_error(err))?;

        let status = self.wait_with_deadline(child)?;
        if !status.success() {
            let captured = read_stderr(&mut stderr);
            warn!(?status, operation = operation.name(), "renderer failed");
            return Err(self.failure(status, &captured));
        }

        let bytes = std::fs::read(output.path())?;
        if bytes.is_empty() {
            return Err(PreflightError::ExternalToolFailed {
                tool: self.config.binary.clone(),
                code: status.code(),
                stderr: "renderer produced no output".to_string(),
            });
        }
        info!(
            operation = operation.name(),
            out_len = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "renderer finished"
        );
        Ok(bytes)
    }

    fn temp_file(&self, prefix: &str) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(".pdf");
        let file = match &self.config.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }

    fn wait_with_deadline(&self, mut child: std::process::Child) -> Result<ExitStatus> {
        let deadline = Instant::now() + Duration::from_secs(self.config.timeout_secs);
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!(timeout_secs = self.config.timeout_secs, "renderer timed out, killing");
                // The child may have exited between the poll and the kill.
                let _ = child.kill();
                let _ = child.wait();
                return Err(PreflightError::ExternalToolTimeout {
                    tool: self.config.binary.clone(),
                    seconds: self.config.timeout_secs,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn spawn_error(&self, err: std::io::Error) -> PreflightError {
        match err.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                PreflightError::ExternalToolUnavailable(format!("{}: {err}", self.config.binary))
            }
            _ => PreflightError::Io(err),
        }
    }

    fn failure(&self, status: ExitStatus, stderr: &[u8]) -> PreflightError {
        let text = String::from_utf8_lossy(stderr);
        let text = text.trim();
        let excerpt: String = text.chars().take(STDERR_LIMIT).collect();
        PreflightError::ExternalToolFailed {
            tool: self.config.binary.clone(),
            code: status.code(),
            stderr: excerpt,
        }
    }
}

fn read_stderr(file: &mut File) -> Vec<u8> {
    let mut buf = Vec::new();
    if file.seek(SeekFrom::Start(0)).is_ok() {
        let _ = file.read_to_end(&mut buf);
    }
    buf
}

impl Renderer for GhostscriptRenderer {
    fn name(&self) -> &str {
        "ghostscript"
    }

    fn convert_to_cmyk(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        self.run(Operation::ConvertToCmyk, pdf)
    }

    fn flatten_transparency(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        self.run(Operation::FlattenTransparency, pdf)
    }

    fn resample_images(&self, pdf: &[u8], target_dpi: u32) -> Result<Vec<u8>> {
        self.run(Operation::ResampleImages { target_dpi }, pdf)
    }

    fn make_pdfx1a(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        self.run(Operation::MakePdfx1a, pdf)
    }
}
