//! FIFO serializer: the single task that owns a [`LiveSession`].
//!
//! ```text
//!   RuntimeHandle (Clone, Send+Sync)   mpsc (FIFO)    serializer task
//!   ┌──────────────────────────┐   ────────────▶   ┌─────────────────────────┐
//!   │ .seek() .play() .edit()  │                   │ LiveSession             │
//!   │ .undo() .notify() ...    │   ◀────────────   │   SnapshotStack         │
//!   └──────────────────────────┘     oneshot       │   Projection            │
//!              ▲                                   │ ticker (while ticking)  │
//!              └──── watch<RuntimeStatus> ──────── └─────────────────────────┘
//! ```
//!
//! Tasks run one at a time, in submission order, each to completion. Pausing bumps an epoch
//! before its own task is queued; tasks submitted under an older epoch are dropped unstarted and
//! their callers get [`RuntimeError::Cancelled`]. While playing or recording, a ticker queues at
//! most one tick at a time; a tick that would pile up behind a busy queue is skipped and the
//! elapsed time is picked up by the next one.
//!
//! A task that fails while mutating state moves the runtime to [`RuntimeStatus::Failed`]; it is
//! never retried. Loading a session is the only way out.

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError, RuntimeStatus};
use crate::host::Host;
use crate::recorder::Notification;
use crate::session::{EditCommand, LiveSession, Progress};
use replay_core::{ContentSource, Projection, Snapshot, SurfaceSelection};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

type Task = Box<dyn FnOnce(&mut Serializer) + Send>;

enum Job {
    Run(Task),
    Tick,
}

struct Envelope {
    epoch: u64,
    job: Job,
}

#[derive(Debug, Default)]
struct Shared {
    epoch: AtomicU64,
    tick_queued: AtomicBool,
}

/// Handle to a live runtime. Cheap to clone; the runtime stops when every handle is dropped.
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: mpsc::UnboundedSender<Envelope>,
    shared: Arc<Shared>,
    status: watch::Receiver<RuntimeStatus>,
}

impl std::fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("status", &*self.status.borrow())
            .field("epoch", &self.shared.epoch.load(Ordering::Relaxed))
            .finish()
    }
}

impl RuntimeHandle {
    /// Validate `config` and start an empty, paused runtime on the current tokio runtime.
    pub fn spawn(
        config: RuntimeConfig,
        host: impl Host + 'static,
        content: Arc<dyn ContentSource + Send + Sync>,
    ) -> Result<Self> {
        config.validate()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(RuntimeStatus::Paused);
        let shared = Arc::new(Shared::default());

        let serializer = Serializer {
            session: LiveSession::new(config, Box::new(host), content),
            tx: tx.downgrade(),
            shared: Arc::clone(&shared),
            status: status_tx,
            ticker: None,
            last_tick: None,
        };
        tokio::spawn(serializer.run(rx));
        debug!("runtime started");

        Ok(Self { tx, shared, status })
    }

    /// Latest published status.
    pub fn status(&self) -> RuntimeStatus {
        self.status.borrow().clone()
    }

    /// A receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<RuntimeStatus> {
        self.status.clone()
    }

    async fn submit<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut LiveSession) -> Result<T> + Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let task: Task = Box::new(move |serializer: &mut Serializer| {
            let result = f(&mut serializer.session);
            if let Err(err) = &result
                && err.is_fatal()
            {
                serializer.session.fail(err.to_string());
            }
            // Publish before replying so callers observe the new status.
            serializer.settle();
            let _ = reply.send(result);
        });
        let epoch = self.shared.epoch.load(Ordering::Acquire);
        self.tx
            .send(Envelope {
                epoch,
                job: Job::Run(task),
            })
            .map_err(|_| RuntimeError::Shutdown)?;
        rx.await.map_err(|_| RuntimeError::Cancelled)?
    }

    /// Replace the session and apply everything at clock 0.
    pub async fn load(&self, snapshot: Snapshot) -> Result<()> {
        self.submit(move |session| session.load(snapshot)).await
    }

    /// Read a session document and load it.
    pub async fn open(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        self.submit(move |session| session.open(&path)).await
    }

    /// Save the current snapshot and mark it clean.
    pub async fn save(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        self.submit(move |session| session.save(&path)).await
    }

    /// Seek; returns the clock the runtime landed on.
    pub async fn seek(&self, clock: f64) -> Result<f64> {
        self.submit(move |session| session.seek(clock)).await
    }

    /// Start playback.
    pub async fn play(&self) -> Result<()> {
        self.submit(LiveSession::play).await
    }

    /// Start recording at the current clock.
    pub async fn record(&self) -> Result<()> {
        self.submit(LiveSession::record).await
    }

    /// Drop every queued task, then stop playing or recording.
    pub async fn pause(&self) -> Result<()> {
        let epoch = self.shared.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(epoch, "pause requested");
        self.submit(LiveSession::pause).await
    }

    /// Record a host notification.
    pub async fn notify(&self, notification: Notification) -> Result<()> {
        self.submit(move |session| session.notify(notification)).await
    }

    /// Apply an edit.
    pub async fn edit(&self, command: EditCommand) -> Result<()> {
        self.submit(move |session| session.edit(command)).await
    }

    /// Undo one step; `false` if there is nothing to undo.
    pub async fn undo(&self) -> Result<bool> {
        self.submit(LiveSession::undo).await
    }

    /// Redo one step; `false` if there is nothing to redo.
    pub async fn redo(&self) -> Result<bool> {
        self.submit(LiveSession::redo).await
    }

    /// Change the surface selection.
    pub async fn set_surface_selection(&self, selection: Option<SurfaceSelection>) -> Result<()> {
        self.submit(move |session| {
            session.set_surface_selection(selection);
            Ok(())
        })
        .await
    }

    /// Status, clock and history depth.
    pub async fn progress(&self) -> Result<Progress> {
        self.submit(|session| Ok(session.progress())).await
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.submit(|session| Ok(Arc::clone(session.current()))).await
    }

    /// A copy of the live projection.
    pub async fn projection(&self) -> Result<Projection> {
        self.submit(|session| Ok(session.projection().clone())).await
    }
}

struct Serializer {
    session: LiveSession,
    tx: mpsc::WeakUnboundedSender<Envelope>,
    shared: Arc<Shared>,
    status: watch::Sender<RuntimeStatus>,
    ticker: Option<JoinHandle<()>>,
    last_tick: Option<Instant>,
}

impl Serializer {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Envelope>) {
        while let Some(Envelope { epoch, job }) = rx.recv().await {
            let stale = epoch < self.shared.epoch.load(Ordering::Acquire);
            match job {
                Job::Tick => {
                    self.shared.tick_queued.store(false, Ordering::Release);
                    if stale {
                        trace!(epoch, "dropped queued tick");
                    } else {
                        self.tick();
                    }
                }
                Job::Run(task) => {
                    if stale {
                        // Dropping the task drops its reply sender.
                        debug!(epoch, "dropped queued task");
                    } else {
                        task(&mut self);
                    }
                }
            }
            self.settle();
        }
        self.stop_ticker();
        debug!("runtime stopped");
    }

    fn settle(&mut self) {
        self.sync_ticker();
        self.publish_status();
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = self.last_tick.map(|last| now - last).unwrap_or_default();
        self.last_tick = Some(now);
        if let Err(err) = self.session.tick(elapsed) {
            warn!(%err, "tick failed");
            self.session.fail(err.to_string());
        }
    }

    fn sync_ticker(&mut self) {
        let ticking = self.session.status().is_ticking();
        if ticking && self.ticker.is_none() {
            self.last_tick = Some(Instant::now());
            self.ticker = Some(self.spawn_ticker());
            trace!("ticker started");
        } else if !ticking && self.ticker.is_some() {
            self.stop_ticker();
            trace!("ticker stopped");
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.last_tick = None;
        self.shared.tick_queued.store(false, Ordering::Release);
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let shared = Arc::clone(&self.shared);
        let period = self.session.config().tick_interval();
        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if shared.tick_queued.swap(true, Ordering::AcqRel) {
                    trace!("previous tick still queued, skipping");
                    continue;
                }
                let Some(tx) = tx.upgrade() else { break };
                let epoch = shared.epoch.load(Ordering::Acquire);
                if tx.send(Envelope { epoch, job: Job::Tick }).is_err() {
                    break;
                }
            }
        })
    }

    fn publish_status(&self) {
        let status = self.session.status();
        self.status.send_if_modified(|published| {
            if *published == *status {
                false
            } else {
                debug!(from = %published, to = %status, "status changed");
                *published = status.clone();
                true
            }
        });
    }
}

impl Drop for Serializer {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
