//! Encoder process supervisor.
//!
//! The supervisor owns at most one encoder process and drives it through
//! `Idle -> Starting -> Running -> {ExitedClean | Crashed} -> RestartPending
//! -> Starting`. Every transition happens under a single async mutex, which
//! also covers manifest replacement.
//!
//! Process exits are not handled by callbacks. A watcher task per process
//! sends an [`SupervisorEvent::Exited`] message to the supervisor's event
//! loop, carrying the process generation and the `armed` flag as it was
//! when the process died. `stop()` clears that flag before signalling, so a
//! requested exit can never be mistaken for a crash.
//!
//! Deferred starts are plain sleeping tasks that post
//! [`SupervisorEvent::RestartDue`] with the restart token current when they
//! were scheduled. Any later `stop()`, `start()` or reschedule bumps the
//! token, so a stale timer fires into a no-op.
//!
//! Status is read from a snapshot published on a `watch` channel after
//! every transition, so readers never queue behind a slow stop.

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr};
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tracing::{debug, error, info, warn};

use radio_models::{EncoderState, EncoderStatus, ExitInfo};

use crate::config::EncoderConfig;
use crate::error::MediaResult;
use crate::fs_utils::write_atomic;
use crate::launcher::{EncoderLauncher, FfmpegLauncher};
use crate::metrics;

/// Messages delivered to the supervisor's event loop.
#[derive(Debug)]
enum SupervisorEvent {
    /// A supervised process terminated.
    Exited {
        generation: u64,
        exit: ExitInfo,
        armed: bool,
    },
    /// A deferred start is due.
    RestartDue { token: u64 },
}

/// Handle to the live encoder process.
struct ProcessHandle {
    pid: Option<u32>,
    generation: u64,
    /// Shared with the watcher; cleared before a requested termination
    armed: Arc<AtomicBool>,
    /// Asks the watcher to SIGKILL the process
    kill_tx: Option<oneshot::Sender<()>>,
    /// Resolves once the watcher has reaped the process
    exited_rx: oneshot::Receiver<ExitInfo>,
    started_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    state: EncoderState,
    armed: bool,
    process: Option<ProcessHandle>,
    generation: u64,
    restart_token: u64,
    restart_count: u64,
    last_exit: Option<ExitInfo>,
}

struct Shared {
    config: EncoderConfig,
    launcher: Arc<dyn EncoderLauncher>,
    inner: Mutex<Inner>,
    events: mpsc::UnboundedSender<SupervisorEvent>,
    status: watch::Sender<EncoderStatus>,
}

/// Owner of the encoder subprocess.
///
/// Cloning is cheap; clones share the same process handle.
#[derive(Clone)]
pub struct Supervisor {
    shared: Arc<Shared>,
}

impl Supervisor {
    /// Create a supervisor and spawn its event loop.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(config: EncoderConfig, launcher: Arc<dyn EncoderLauncher>) -> Self {
        let (events, events_rx) = mpsc::unbounded_channel();
        let inner = Inner::default();
        let (status, _) = watch::channel(inner.snapshot());
        let shared = Arc::new(Shared {
            config,
            launcher,
            inner: Mutex::new(inner),
            events,
            status,
        });

        tokio::spawn(run_event_loop(Arc::downgrade(&shared), events_rx));

        Self { shared }
    }

    /// Create a supervisor that launches the configured ffmpeg binary.
    pub fn with_ffmpeg(config: EncoderConfig) -> Self {
        let launcher = Arc::new(FfmpegLauncher::new(config.clone()));
        Self::new(config, launcher)
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.shared.config
    }

    /// Launch the encoder against the current manifest.
    ///
    /// A no-op while a process is already live.
    pub async fn start(&self) -> MediaResult<()> {
        let mut inner = self.shared.inner.lock().await;
        let result = self.shared.start_locked(&mut inner);
        self.shared.publish(&inner);
        result
    }

    /// Disarm and terminate the current process, if any.
    ///
    /// Also cancels a pending restart. Returns once the process is gone.
    pub async fn stop(&self) {
        let mut inner = self.shared.inner.lock().await;
        self.shared.stop_locked(&mut inner).await;
        self.shared.publish(&inner);
    }

    /// Stop, then start again after `delay`.
    pub async fn restart_with_delay(&self, delay: Duration) -> MediaResult<()> {
        let mut inner = self.shared.inner.lock().await;
        let result = self.shared.restart_locked(&mut inner, delay).await;
        self.shared.publish(&inner);
        result
    }

    /// Atomically replace the manifest without touching the process.
    pub async fn write_manifest(&self, manifest: &str) -> MediaResult<()> {
        let _inner = self.shared.inner.lock().await;
        write_atomic(self.shared.config.manifest_path()?, manifest).await
    }

    /// Replace the manifest and restart the encoder on it, as one step.
    pub async fn reload(&self, manifest: &str, delay: Duration) -> MediaResult<()> {
        let mut inner = self.shared.inner.lock().await;
        write_atomic(self.shared.config.manifest_path()?, manifest).await?;
        let result = self.shared.restart_locked(&mut inner, delay).await;
        self.shared.publish(&inner);
        result
    }

    /// Replace the manifest, and restart onto it only if the encoder is armed.
    ///
    /// Returns whether a restart happened. A disarmed encoder stays down.
    pub async fn reload_if_armed(&self, manifest: &str, delay: Duration) -> MediaResult<bool> {
        let mut inner = self.shared.inner.lock().await;
        write_atomic(self.shared.config.manifest_path()?, manifest).await?;
        if !inner.armed {
            debug!("Encoder disarmed, manifest replaced without restart");
            return Ok(false);
        }
        let result = self.shared.restart_locked(&mut inner, delay).await;
        self.shared.publish(&inner);
        result.map(|()| true)
    }

    /// Latest published snapshot of the process handle.
    pub fn status(&self) -> EncoderStatus {
        self.shared.status.borrow().clone()
    }

    /// Receive a new snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<EncoderStatus> {
        self.shared.status.subscribe()
    }
}

impl Inner {
    fn snapshot(&self) -> EncoderStatus {
        EncoderStatus {
            state: self.state,
            pid: self.process.as_ref().and_then(|p| p.pid),
            armed: self.armed,
            last_exit_code: self.last_exit.and_then(|e| e.code),
            last_exit_signal: self.last_exit.and_then(|e| e.signal),
            restart_count: self.restart_count,
            started_at: self.process.as_ref().map(|p| p.started_at),
        }
    }
}

impl Shared {
    fn publish(&self, inner: &Inner) {
        self.status.send_replace(inner.snapshot());
    }

    fn start_locked(&self, inner: &mut Inner) -> MediaResult<()> {
        if inner.process.is_some() {
            debug!(state = %inner.state, "Encoder already running, start is a no-op");
            return Ok(());
        }

        let (manifest, endpoint) = match self.config.launch_target() {
            Ok(target) => target,
            Err(e) => {
                inner.state = EncoderState::Idle;
                inner.armed = false;
                error!("Cannot start encoder: {}", e);
                return Err(e);
            }
        };

        // Supersedes any deferred start still sleeping.
        inner.restart_token += 1;
        inner.state = EncoderState::Starting;

        let mut child = match self.launcher.launch(manifest, endpoint) {
            Ok(child) => child,
            Err(e) => {
                inner.state = EncoderState::Idle;
                inner.armed = false;
                metrics::record_launch_failure();
                error!("Encoder launch failed: {}", e);
                return Err(e);
            }
        };

        inner.generation += 1;
        let generation = inner.generation;
        let pid = child.id();
        let armed = Arc::new(AtomicBool::new(true));
        let (kill_tx, kill_rx) = oneshot::channel();
        let (exited_tx, exited_rx) = oneshot::channel();

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr, generation));
        }
        tokio::spawn(watch_process(
            child,
            generation,
            Arc::clone(&armed),
            kill_rx,
            exited_tx,
            self.events.clone(),
        ));

        inner.process = Some(ProcessHandle {
            pid,
            generation,
            armed,
            kill_tx: Some(kill_tx),
            exited_rx,
            started_at: Utc::now(),
        });
        inner.state = EncoderState::Running;
        inner.armed = true;

        metrics::record_start();
        info!(
            pid = ?pid,
            generation,
            manifest = %manifest.display(),
            "Encoder started"
        );
        Ok(())
    }

    async fn stop_locked(&self, inner: &mut Inner) {
        // Disarm before signalling.
        inner.armed = false;
        inner.restart_token += 1;

        if let Some(mut process) = inner.process.take() {
            process.armed.store(false, Ordering::SeqCst);
            // Readers see the disarm while the process winds down.
            self.status.send_modify(|status| status.armed = false);
            if let Some(exit) = self.terminate(&mut process).await {
                inner.last_exit = Some(exit);
            }
            metrics::record_exit("stopped");
            info!(pid = ?process.pid, generation = process.generation, "Encoder stopped");
        } else if inner.state == EncoderState::RestartPending {
            info!("Pending encoder restart cancelled");
        }

        inner.state = EncoderState::Idle;
    }

    /// SIGINT, wait up to the stop timeout, then SIGKILL.
    async fn terminate(&self, process: &mut ProcessHandle) -> Option<ExitInfo> {
        if let Ok(exit) = process.exited_rx.try_recv() {
            return Some(exit);
        }

        if let Some(raw) = process.pid.and_then(|pid| i32::try_from(pid).ok()) {
            if let Err(e) = kill(Pid::from_raw(raw), Signal::SIGINT) {
                debug!(pid = raw, "Interrupt not delivered: {}", e);
            }
        }

        let timeout = self.config.stop_timeout;
        match tokio::time::timeout(timeout, &mut process.exited_rx).await {
            Ok(result) => return result.ok(),
            Err(_) => {
                warn!(
                    pid = ?process.pid,
                    "Encoder still running {:?} after interrupt, killing",
                    timeout
                );
            }
        }

        if let Some(kill_tx) = process.kill_tx.take() {
            let _ = kill_tx.send(());
        }
        (&mut process.exited_rx).await.ok()
    }

    async fn restart_locked(&self, inner: &mut Inner, delay: Duration) -> MediaResult<()> {
        // Never tear down a live stream for a start that cannot happen.
        self.config.launch_target()?;

        self.stop_locked(inner).await;

        if delay.is_zero() {
            return self.start_locked(inner);
        }

        self.schedule_restart_locked(inner, delay, "reload");
        info!(delay_ms = delay.as_millis() as u64, "Encoder restart scheduled");
        Ok(())
    }

    fn schedule_restart_locked(&self, inner: &mut Inner, delay: Duration, reason: &'static str) {
        inner.restart_token += 1;
        let token = inner.restart_token;
        inner.state = EncoderState::RestartPending;
        inner.armed = true;
        metrics::record_restart_scheduled(reason);

        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(SupervisorEvent::RestartDue { token });
        });
    }

    async fn handle_exit(&self, generation: u64, exit: ExitInfo, armed: bool) {
        let mut inner = self.inner.lock().await;

        if inner.process.as_ref().map(|p| p.generation) != Some(generation) {
            debug!(generation, %exit, "Exit of a superseded encoder process");
            return;
        }
        inner.process = None;
        inner.last_exit = Some(exit);

        if !armed || !inner.armed {
            info!(generation, %exit, "Encoder exited while disarmed");
            metrics::record_exit("stopped");
            inner.state = EncoderState::Idle;
            inner.armed = false;
            self.publish(&inner);
            return;
        }

        let backoff = self.config.restart_backoff;
        if exit.is_clean() {
            inner.state = EncoderState::ExitedClean;
            metrics::record_exit("clean");
            warn!(generation, "Encoder exited on its own, restarting in {:?}", backoff);
        } else {
            inner.state = EncoderState::Crashed;
            metrics::record_exit("crash");
            warn!(generation, %exit, "Encoder crashed, restarting in {:?}", backoff);
        }

        self.schedule_restart_locked(&mut inner, backoff, "crash");
        self.publish(&inner);
    }

    async fn handle_restart_due(&self, token: u64) {
        let mut inner = self.inner.lock().await;

        if !inner.armed
            || inner.state != EncoderState::RestartPending
            || inner.restart_token != token
        {
            debug!(token, "Restart timer fired after cancellation, ignoring");
            return;
        }

        inner.restart_count += 1;
        info!(restart = inner.restart_count, "Restarting encoder");
        if let Err(e) = self.start_locked(&mut inner) {
            error!("Encoder restart failed: {}", e);
        }
        self.publish(&inner);
    }
}

async fn run_event_loop(shared: Weak<Shared>, mut events: mpsc::UnboundedReceiver<SupervisorEvent>) {
    while let Some(event) = events.recv().await {
        let Some(shared) = shared.upgrade() else {
            break;
        };
        match event {
            SupervisorEvent::Exited {
                generation,
                exit,
                armed,
            } => shared.handle_exit(generation, exit, armed).await,
            SupervisorEvent::RestartDue { token } => shared.handle_restart_due(token).await,
        }
    }
    debug!("Supervisor event loop finished");
}

/// Reap one process and report how it ended.
async fn watch_process(
    mut child: Child,
    generation: u64,
    armed: Arc<AtomicBool>,
    kill_rx: oneshot::Receiver<()>,
    exited_tx: oneshot::Sender<ExitInfo>,
    events: mpsc::UnboundedSender<SupervisorEvent>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        // Kill requested, or the supervisor is gone.
        _ = kill_rx => {
            let _ = child.start_kill();
            child.wait().await
        }
    };

    let exit = match status {
        Ok(status) => exit_info(status),
        Err(e) => {
            warn!(generation, "Failed to wait for encoder: {}", e);
            ExitInfo {
                code: None,
                signal: None,
            }
        }
    };

    let armed = armed.load(Ordering::SeqCst);
    let _ = exited_tx.send(exit);
    let _ = events.send(SupervisorEvent::Exited {
        generation,
        exit,
        armed,
    });
}

fn exit_info(status: ExitStatus) -> ExitInfo {
    ExitInfo {
        code: status.code(),
        signal: status.signal(),
    }
}

/// Forward encoder stderr into the log.
async fn forward_stderr(stderr: ChildStderr, generation: u64) {
    let mut lines = BufReader::new(stderr).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if looks_like_error(line) {
            warn!(generation, "encoder: {}", line);
        } else {
            debug!(generation, "encoder: {}", line);
        }
    }
}

fn looks_like_error(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.contains("error") || lower.contains("failed") || lower.contains("invalid")
}
