use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};

/// Installs requirement strings into the target Python environment.
pub trait DependencyInstaller {
    /// Install `dependencies`, upgrading already installed ones when `upgrade` is set.
    fn install(&self, dependencies: &[String], upgrade: bool) -> Result<()>;
}

/// Installer that shells out to `python -m pip install`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipInstaller {
    python: PathBuf,
}

impl Default for PipInstaller {
    fn default() -> Self {
        PipInstaller::new("python")
    }
}

impl PipInstaller {
    /// Use the given interpreter.
    pub fn new(python: impl Into<PathBuf>) -> Self {
        PipInstaller {
            python: python.into(),
        }
    }

    /// Build the pip invocation without running it.
    pub fn command(&self, dependencies: &[String], upgrade: bool) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.args(["-m", "pip", "install"]);
        if upgrade {
            cmd.arg("-U");
        }
        cmd.args(dependencies);
        cmd
    }
}

impl DependencyInstaller for PipInstaller {
    fn install(&self, dependencies: &[String], upgrade: bool) -> Result<()> {
        let status = self
            .command(dependencies, upgrade)
            .status()
            .map_err(|e| Error::io(&self.python, e))?;
        if !status.success() {
            return Err(Error::InstallFailed(format!("pip exited with {status}")));
        }
        Ok(())
    }
}

/// Install dependencies through `installer`. An empty list is a no-op.
pub fn install_dependencies(
    installer: &dyn DependencyInstaller,
    dependencies: &[String],
    upgrade: bool,
) -> Result<()> {
    if dependencies.is_empty() {
        tracing::debug!("no dependencies to install");
        return Ok(());
    }
    tracing::info!(count = dependencies.len(), upgrade, "installing dependencies");
    installer.install(dependencies, upgrade)
}
