//! The editing session: sole owner of a user's `ResumeState`.
//!
//! Lifecycle: `start` hydrates once (gallery seed, else stored state, else the default
//! starter), then every successful `dispatch` schedules a debounced save. Save failures are
//! logged and reported through `SyncStatus`; they never touch the in-memory state.
//!
//! Writes of one session go through a single writer lock and a save that has been superseded
//! skips its write, so the last write to land is always the newest state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::builder::catalog::Catalog;
use crate::builder::ids::IdGenerator;
use crate::builder::model::ResumeState;
use crate::builder::reducer::{reduce, Action, ReduceError, ReducerEnv};
use crate::models::user::UserId;
use crate::persistence::debounce::Debouncer;
use crate::persistence::store::ResumeStore;

/// Outcome of the most recent save, as shown to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
    /// Nothing changed since hydration.
    Idle,
    /// A save is scheduled or in flight.
    Pending,
    Saved { at: DateTime<Utc> },
    Failed { message: String },
}

impl SyncStatus {
    /// Whether the session holds edits that storage may not have.
    pub fn is_unsaved(&self) -> bool {
        matches!(self, SyncStatus::Pending | SyncStatus::Failed { .. })
    }
}

/// Status tagged with the generation of the newest save.
struct SyncTracker {
    generation: u64,
    status: SyncStatus,
}

type SharedTracker = Arc<StdMutex<SyncTracker>>;

/// Collaborators and timings shared by every session.
#[derive(Clone)]
pub struct SessionDeps {
    pub store: Arc<dyn ResumeStore>,
    pub catalog: Arc<Catalog>,
    pub ids: Arc<dyn IdGenerator>,
    pub debounce: Duration,
    /// How long a session may go unused before the registry evicts it.
    pub idle_ttl: Duration,
}

pub struct EditingSession {
    user: UserId,
    state: ResumeState,
    hydrated: bool,
    deps: SessionDeps,
    saver: Debouncer,
    sync: SharedTracker,
    writer: Arc<Mutex<()>>,
}

impl EditingSession {
    /// Creates a session and hydrates it.
    ///
    /// With a `seed` (a gallery pick) the seed is loaded and saved after the debounce window.
    /// Otherwise the stored resume is fetched once; absence or a failed fetch falls back to the
    /// default starter for `email`.
    pub async fn start(
        user: UserId,
        email: Option<&str>,
        seed: Option<ResumeState>,
        deps: SessionDeps,
    ) -> Self {
        let mut session = Self {
            user,
            state: deps.catalog.default_state(email),
            hydrated: false,
            saver: Debouncer::new(deps.debounce),
            sync: Arc::new(StdMutex::new(SyncTracker {
                generation: 0,
                status: SyncStatus::Idle,
            })),
            writer: Arc::new(Mutex::new(())),
            deps,
        };

        match seed {
            Some(seed) => {
                session.hydrate_with(seed);
                session.hydrated = true;
                session.schedule_save();
            }
            None => {
                if let Some(stored) = session.fetch_stored().await {
                    session.hydrate_with(stored);
                }
                session.hydrated = true;
            }
        }

        session
    }

    async fn fetch_stored(&self) -> Option<ResumeState> {
        match self.deps.store.get(self.user).await {
            Ok(Some(state)) => {
                info!("Hydrated resume for user {}", self.user);
                Some(state)
            }
            Ok(None) => {
                info!("No saved resume for user {}, starting fresh", self.user);
                None
            }
            Err(e) => {
                warn!("Failed to fetch resume for user {}: {e}", self.user);
                None
            }
        }
    }

    fn hydrate_with(&mut self, mut state: ResumeState) {
        let renamed = state.data.repair_ids(self.deps.ids.as_ref());
        if renamed > 0 {
            warn!(
                "Reassigned {renamed} duplicate item id(s) while loading resume for user {}",
                self.user
            );
        }
        if let Err(e) = self.apply(Action::LoadDocument(state)) {
            warn!("Discarded unloadable resume for user {}: {e}", self.user);
        }
    }

    fn apply(&mut self, action: Action) -> Result<(), ReduceError> {
        let env = ReducerEnv {
            catalog: &self.deps.catalog,
            ids: self.deps.ids.as_ref(),
        };
        self.state = reduce(&self.state, action, &env)?;
        Ok(())
    }

    pub fn state(&self) -> &ResumeState {
        &self.state
    }

    pub fn sync_status(&self) -> SyncStatus {
        lock(&self.sync).status.clone()
    }

    /// Applies one action. On error the state is unchanged and nothing is scheduled.
    pub fn dispatch(&mut self, action: Action) -> Result<&ResumeState, ReduceError> {
        self.apply(action)?;
        if self.hydrated {
            self.schedule_save();
        }
        Ok(&self.state)
    }

    /// Cancels any waiting save and writes the current state now, after any write in flight.
    pub async fn flush(&mut self) -> SyncStatus {
        self.saver.cancel();
        self.save_job().run().await;
        self.sync_status()
    }

    /// Makes storage hold this session's state before the session is let go: flushes when the
    /// newest edit is not known to be stored, otherwise returns the current status untouched.
    pub async fn settle(&mut self) -> SyncStatus {
        let status = self.sync_status();
        if status.is_unsaved() {
            self.flush().await
        } else {
            status
        }
    }

    fn schedule_save(&mut self) {
        let job = self.save_job();
        self.saver.schedule(job.run());
        debug!(
            "Save for user {} scheduled in {:?}",
            self.user,
            self.saver.delay()
        );
    }

    /// Snapshots the state for a new save and makes it the newest generation.
    fn save_job(&self) -> SaveJob {
        let generation = {
            let mut guard = lock(&self.sync);
            guard.generation += 1;
            guard.status = SyncStatus::Pending;
            guard.generation
        };
        SaveJob {
            store: Arc::clone(&self.deps.store),
            user: self.user,
            state: self.state.clone(),
            tracker: Arc::clone(&self.sync),
            writer: Arc::clone(&self.writer),
            generation,
        }
    }
}

fn lock(tracker: &SharedTracker) -> std::sync::MutexGuard<'_, SyncTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One outbound write of a state snapshot.
struct SaveJob {
    store: Arc<dyn ResumeStore>,
    user: UserId,
    state: ResumeState,
    tracker: SharedTracker,
    writer: Arc<Mutex<()>>,
    generation: u64,
}

impl SaveJob {
    fn is_current(&self) -> bool {
        lock(&self.tracker).generation == self.generation
    }

    async fn run(self) {
        let _turn = self.writer.lock().await;
        if !self.is_current() {
            debug!("Skipping superseded save for user {}", self.user);
            return;
        }

        let status = match self.store.put(self.user, &self.state).await {
            Ok(_) => {
                debug!("Saved resume for user {}", self.user);
                SyncStatus::Saved { at: Utc::now() }
            }
            Err(e) => {
                warn!("Failed to auto-save resume for user {}: {e}", self.user);
                SyncStatus::Failed {
                    message: e.to_string(),
                }
            }
        };

        let mut guard = lock(&self.tracker);
        if guard.generation == self.generation {
            guard.status = status;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

pub type SharedSession = Arc<Mutex<EditingSession>>;

struct Entry {
    session: SharedSession,
    touched: Instant,
}

/// One live editing session per user.
pub struct SessionRegistry {
    deps: SessionDeps,
    sessions: Mutex<HashMap<UserId, Entry>>,
}

impl SessionRegistry {
    pub fn new(deps: SessionDeps) -> Self {
        Self {
            deps,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the user's session, hydrating a new one on first access.
    pub async fn open(&self, user: UserId, email: &str) -> SharedSession {
        if let Some(entry) = self.sessions.lock().await.get_mut(&user) {
            entry.touched = Instant::now();
            return Arc::clone(&entry.session);
        }

        let session = EditingSession::start(user, Some(email), None, self.deps.clone()).await;
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.entry(user).or_insert_with(|| Entry {
            session: Arc::new(Mutex::new(session)),
            touched: Instant::now(),
        });
        Arc::clone(&entry.session)
    }

    /// Replaces the user's session. The old one is settled first, waiting out any save in
    /// flight, so the rehydration reads its edits. The registry stays locked throughout so no
    /// `open` can hydrate from storage in between.
    pub async fn restart(
        &self,
        user: UserId,
        email: &str,
        seed: Option<ResumeState>,
    ) -> SharedSession {
        let mut sessions = self.sessions.lock().await;
        if let Some(previous) = sessions.remove(&user) {
            previous.session.lock().await.settle().await;
        }

        let session = EditingSession::start(user, Some(email), seed, self.deps.clone()).await;
        let shared = Arc::new(Mutex::new(session));
        sessions.insert(
            user,
            Entry {
                session: Arc::clone(&shared),
                touched: Instant::now(),
            },
        );
        shared
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Settles and drops sessions unused for `idle_ttl`. Sessions still referenced by a request
    /// are kept, as are sessions whose final save failed. Returns how many were evicted.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        let idle: Vec<UserId> = sessions
            .iter()
            .filter(|(_, entry)| {
                now.duration_since(entry.touched) >= self.deps.idle_ttl
                    && Arc::strong_count(&entry.session) == 1
            })
            .map(|(user, _)| *user)
            .collect();

        let mut evicted = 0;
        for user in idle {
            let Some(session) = sessions.get(&user).map(|e| Arc::clone(&e.session)) else {
                continue;
            };
            let status = session.lock().await.settle().await;
            if let SyncStatus::Failed { message } = status {
                warn!("Keeping idle session for user {user}, final save failed: {message}");
                continue;
            }
            sessions.remove(&user);
            evicted += 1;
        }
        evicted
    }

    /// Runs `evict_idle` periodically until the registry is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let every = (self.deps.idle_ttl / 4).max(Duration::from_secs(1));
        let registry: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                let evicted = registry.evict_idle().await;
                if evicted > 0 {
                    info!(
                        "Evicted {evicted} idle session(s), {} still active",
                        registry.active_count().await
                    );
                }
            }
        })
    }
}
