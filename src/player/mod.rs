pub mod launcher;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::watch::WatchStateStore;
use launcher::{PlayerLauncher, ProcessHandle};

/// How long a stopped player may take to exit before it is force-killed.
const STOP_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Playing,
    Stopped,
    Ended,
    Errored,
}

/// Owns at most one external-player process and its monitor task.
///
/// `play` spawns the player on a playlist tail and hands the child to a
/// single monitor; the monitor is the only writer of the terminal phases
/// and of the watch record for the run. `stop` cancels the monitor and
/// returns only once the process is gone, so back-to-back `play` calls
/// never race a dying player.
pub struct PlaybackSession {
    launcher: Arc<dyn PlayerLauncher>,
    store: Arc<WatchStateStore>,
    phase: Arc<Mutex<SessionPhase>>,
    monitor: Option<Monitor>,
}

struct Monitor {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PlaybackSession {
    pub fn new(launcher: Arc<dyn PlayerLauncher>, store: Arc<WatchStateStore>) -> Self {
        Self {
            launcher,
            store,
            phase: Arc::new(Mutex::new(SessionPhase::Idle)),
            monitor: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.lock().unwrap()
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == SessionPhase::Playing
    }

    /// Play `episode_paths[start_index..]`, skipping files that no longer
    /// exist on disk. An empty filtered playlist (or a start index past its
    /// end) is a reported no-op, not an error.
    pub async fn play(
        &mut self,
        series: &str,
        episode_paths: &[PathBuf],
        start_index: usize,
    ) -> Result<()> {
        self.stop().await?;

        let playlist: Vec<PathBuf> = episode_paths
            .iter()
            .filter(|p| p.exists())
            .cloned()
            .collect();
        if playlist.is_empty() {
            warn!(series = %series, "None of the episodes exist on disk, nothing to play");
            return Ok(());
        }
        if start_index >= playlist.len() {
            warn!(
                series = %series,
                start_index,
                available = playlist.len(),
                "Start index is past the end of the playlist, nothing to play"
            );
            return Ok(());
        }

        let start_episode = basename(&playlist[start_index]);

        let handle = match self.launcher.spawn(&playlist[start_index..]).await {
            Ok(handle) => handle,
            Err(e) => {
                self.set_phase(SessionPhase::Errored);
                return Err(e);
            }
        };

        info!(
            series = %series,
            episode = %start_episode,
            queued = playlist.len() - start_index,
            "Playback started"
        );
        self.set_phase(SessionPhase::Playing);

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(run_monitor(
            handle,
            cancel_rx,
            Arc::clone(&self.phase),
            Arc::clone(&self.store),
            series.to_string(),
            start_episode,
        ));
        self.monitor = Some(Monitor {
            cancel: cancel_tx,
            task,
        });
        Ok(())
    }

    /// Tear down any running playback: graceful terminate, bounded wait,
    /// force-kill on timeout. The watch record is saved exactly as on a
    /// natural end. Safe no-op when idle.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(Monitor { cancel, task }) = self.monitor.take() else {
            return Ok(());
        };

        // A finished monitor has already dropped its receiver; that is fine
        let _ = cancel.send(());
        if let Err(e) = task.await {
            error!("Playback monitor task failed: {e}");
        }
        self.set_phase(SessionPhase::Idle);
        Ok(())
    }

    /// Wait for the current playlist run to end on its own.
    pub async fn wait(&mut self) -> Result<()> {
        let Some(Monitor { cancel, task }) = self.monitor.take() else {
            return Ok(());
        };

        let result = task.await;
        // Held across the await: dropping the sender early would read as a
        // cancellation in the monitor
        drop(cancel);
        if let Err(e) = result {
            error!("Playback monitor task failed: {e}");
        }
        Ok(())
    }

    /// No control channel to an opaque external process.
    pub fn set_rate(&self, _rate: f64) -> Result<()> {
        Err(Error::ControlUnsupported("playback rate"))
    }

    pub fn skip(&self, _seconds: i64) -> Result<()> {
        Err(Error::ControlUnsupported("seeking"))
    }

    pub fn pause_resume(&self) -> Result<()> {
        Err(Error::ControlUnsupported("pause/resume"))
    }

    fn set_phase(&self, phase: SessionPhase) {
        *self.phase.lock().unwrap() = phase;
    }
}

async fn run_monitor(
    mut handle: Box<dyn ProcessHandle>,
    cancel: oneshot::Receiver<()>,
    phase: Arc<Mutex<SessionPhase>>,
    store: Arc<WatchStateStore>,
    series: String,
    episode: String,
) {
    tokio::select! {
        exit = handle.wait() => {
            let next = match exit {
                Ok(exit) if exit.success => {
                    info!(series = %series, "Player exited");
                    SessionPhase::Ended
                }
                Ok(exit) => {
                    warn!(series = %series, code = ?exit.code, "Player exited with failure");
                    SessionPhase::Errored
                }
                Err(e) => {
                    error!(series = %series, "Failed waiting on player: {e}");
                    SessionPhase::Errored
                }
            };
            *phase.lock().unwrap() = next;
            record(&store, &series, &episode);
        }
        _ = cancel => {
            handle.terminate();
            match tokio::time::timeout(STOP_GRACE, handle.wait()).await {
                Ok(_) => debug!(series = %series, "Player exited after terminate"),
                Err(_) => {
                    warn!(series = %series, "Player did not exit in time, killing");
                    if let Err(e) = handle.kill().await {
                        error!(series = %series, "Failed to kill player: {e}");
                    }
                    let _ = handle.wait().await;
                }
            }
            *phase.lock().unwrap() = SessionPhase::Stopped;
            record(&store, &series, &episode);
        }
    }
}

// Watch-state failures degrade to a log line, never into playback handling
fn record(store: &WatchStateStore, series: &str, episode: &str) {
    if let Err(e) = store.save(series, episode, 0) {
        error!(series = %series, "Failed to save watch record: {e}");
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
