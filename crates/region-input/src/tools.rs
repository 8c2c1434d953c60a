//! External raster tools.
//!
//! Conversion and subsetting are delegated to `gdal_translate`. The
//! [`ToolRunner`] trait is the only place a process is spawned, so tests
//! can swap in a fake that writes the expected files itself.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::SubsetWindow;
use crate::error::{RegionInputError, Result};

/// Runs an external program to completion.
///
/// Implementations block until the program exits and report a non-zero
/// exit as an error. There is no timeout.
pub trait ToolRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<()>;
}

/// [`ToolRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<()> {
        debug!(program, args = %args.join(" "), "Running external tool");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| RegionInputError::Command {
                program: program.to_string(),
                args: args.to_vec(),
                reason: format!("could not start: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RegionInputError::Command {
                program: program.to_string(),
                args: args.to_vec(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}

/// One `gdal_translate` invocation producing a NetCDF file.
#[derive(Debug, Clone)]
pub struct Translate {
    input: PathBuf,
    output: PathBuf,
    creation_options: Vec<String>,
    window: Option<SubsetWindow>,
}

impl Translate {
    /// Full-extent conversion of `input` to NetCDF at `output`.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            creation_options: Vec::new(),
            window: None,
        }
    }

    /// Add a `-co KEY=VALUE` creation option.
    pub fn creation_option(mut self, option: &str) -> Self {
        self.creation_options.push(option.to_string());
        self
    }

    /// Ask the driver to write 2-D `lon`/`lat` variables.
    pub fn with_lonlat(self) -> Self {
        self.creation_option("WRITE_LONLAT=YES")
    }

    /// Restrict the output to a pixel window.
    pub fn window(mut self, window: SubsetWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Argument list, program name excluded.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-of".to_string(), "netCDF".to_string()];
        for option in &self.creation_options {
            args.push("-co".to_string());
            args.push(option.clone());
        }
        if let Some(window) = &self.window {
            args.extend(window.to_args());
        }
        args.push(self.input.display().to_string());
        args.push(self.output.display().to_string());
        args
    }

    /// Run the conversion and confirm the output file exists.
    pub fn run(&self, runner: &dyn ToolRunner, program: &str) -> Result<PathBuf> {
        runner.run(program, &self.args())?;
        if !self.output.exists() {
            return Err(RegionInputError::MissingOutput(self.output.clone()));
        }
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_conversion_args() {
        let args = Translate::new("in.tif", "out.nc").args();
        assert_eq!(args, vec!["-of", "netCDF", "in.tif", "out.nc"]);
    }

    #[test]
    fn test_subset_args() {
        let args = Translate::new("full.nc", "sub.nc")
            .window(SubsetWindow::default())
            .args();
        assert_eq!(
            args,
            vec!["-of", "netCDF", "-srcwin", "915", "292", "10", "10", "full.nc", "sub.nc"]
        );
    }

    #[test]
    fn test_lonlat_creation_options() {
        let args = Translate::new("full.nc", "ref.nc")
            .with_lonlat()
            .creation_option("GDAL_NETCDF_BOTTOMUP=YES")
            .args();
        assert_eq!(
            args,
            vec![
                "-of",
                "netCDF",
                "-co",
                "WRITE_LONLAT=YES",
                "-co",
                "GDAL_NETCDF_BOTTOMUP=YES",
                "full.nc",
                "ref.nc"
            ]
        );
    }

    #[test]
    fn test_missing_program_is_command_error() {
        let err = ProcessRunner
            .run("region-input-no-such-program", &["x".to_string()])
            .unwrap_err();
        assert!(matches!(err, RegionInputError::Command { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_command_error() {
        let err = ProcessRunner.run("false", &[]).unwrap_err();
        match err {
            RegionInputError::Command { program, .. } => assert_eq!(program, "false"),
            other => panic!("unexpected error: {}", other),
        }
        assert!(ProcessRunner.run("true", &[]).is_ok());
    }

    #[test]
    fn test_missing_output_detected() {
        struct NoOp;
        impl ToolRunner for NoOp {
            fn run(&self, _program: &str, _args: &[String]) -> Result<()> {
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never.nc");
        let err = Translate::new("in.tif", &out)
            .run(&NoOp, "gdal_translate")
            .unwrap_err();
        assert!(matches!(err, RegionInputError::MissingOutput(p) if p == out));
    }
}
