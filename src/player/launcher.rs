use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::{Error, Result};

/// How a player process finished, decoupled from `std::process::ExitStatus`
/// so fakes do not have to fabricate one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerExit {
    pub success: bool,
    pub code: Option<i32>,
}

/// A live external-player process.
#[async_trait]
pub trait ProcessHandle: Send {
    fn id(&self) -> Option<u32>;

    /// Wait for the process to exit. Runs off the caller's main context.
    async fn wait(&mut self) -> std::io::Result<PlayerExit>;

    /// Ask the process to shut down gracefully. Best effort; callers
    /// follow up with `kill` after a grace period.
    fn terminate(&self);

    async fn kill(&mut self) -> std::io::Result<()>;
}

/// Spawns an external player on an ordered list of file paths.
#[async_trait]
pub trait PlayerLauncher: Send + Sync {
    async fn spawn(&self, playlist: &[PathBuf]) -> Result<Box<dyn ProcessHandle>>;
}

/// Production launcher: one configured command, playlist appended as
/// positional arguments. Works with any player that accepts a list of
/// files and plays them in order.
pub struct CommandLauncher {
    command: String,
    args: Vec<String>,
}

impl CommandLauncher {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

#[async_trait]
impl PlayerLauncher for CommandLauncher {
    async fn spawn(&self, playlist: &[PathBuf]) -> Result<Box<dyn ProcessHandle>> {
        let mut cmd = Command::new(&self.command);

        // Keep the player's output off our stdio
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        for arg in &self.args {
            cmd.arg(arg);
        }
        for path in playlist {
            cmd.arg(path);
        }

        debug!(command = %self.command, files = playlist.len(), "Launching player");

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::PlayerNotFound(self.command.clone())
            } else {
                Error::PlayerLaunch(e.to_string())
            }
        })?;

        Ok(Box::new(CommandHandle { child }))
    }
}

struct CommandHandle {
    child: Child,
}

#[async_trait]
impl ProcessHandle for CommandHandle {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> std::io::Result<PlayerExit> {
        let status = self.child.wait().await?;
        Ok(PlayerExit {
            success: status.success(),
            code: status.code(),
        })
    }

    fn terminate(&self) {
        #[cfg(unix)]
        {
            if let Some(pid) = self.child.id() {
                debug!(pid, "Sending SIGTERM to player");
                let _ = std::process::Command::new("kill")
                    .args(["-TERM", &pid.to_string()])
                    .status();
            }
        }
        // Elsewhere the grace-timeout kill path takes over
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill().await
    }
}
