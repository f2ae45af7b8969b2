// file: src/index/gateway.rs
// description: shared index session with lazy open, single-flight reopen and bounded queries
// reference: https://docs.rs/tokio/latest/tokio/sync/index.html

use super::{ExtractedText, IndexEngine, IndexSession, NativeRecord, QueryOptions, QueryOutcome};
use crate::error::{AdapterError, Result};
use crate::models::SortOrder;
use crate::utils::OperationTimer;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

#[derive(Default)]
enum SlotState {
    #[default]
    Unopened,
    Open(Arc<dyn IndexSession>),
    Failed(AdapterError),
}

/// The current session, stamped with how many open attempts produced it.
#[derive(Default)]
struct SessionSlot {
    generation: u64,
    state: SlotState,
}

impl SessionSlot {
    fn outcome(&self) -> Result<(u64, Arc<dyn IndexSession>)> {
        match &self.state {
            SlotState::Open(session) => Ok((self.generation, Arc::clone(session))),
            SlotState::Failed(err) => Err(err.clone()),
            SlotState::Unopened => Err(AdapterError::IndexUnavailable(
                "index session has not been opened".to_string(),
            )),
        }
    }
}

pub struct IndexGateway {
    engine: Box<dyn IndexEngine>,
    slot: RwLock<SessionSlot>,
    reopen_lock: Mutex<()>,
    query_timeout: Duration,
}

impl IndexGateway {
    pub fn new(engine: impl IndexEngine + 'static, query_timeout: Duration) -> Self {
        Self {
            engine: Box::new(engine),
            slot: RwLock::new(SessionSlot::default()),
            reopen_lock: Mutex::new(()),
            query_timeout,
        }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Opens the session if needed; used to fail fast at startup.
    pub async fn probe(&self) -> Result<()> {
        self.session().await.map(|_| ())
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<QueryOutcome> {
        self.execute(
            query,
            QueryOptions {
                limit,
                sort: SortOrder::Relevance,
            },
        )
        .await
    }

    pub async fn recent(&self, query: &str, limit: usize) -> Result<QueryOutcome> {
        self.execute(
            query,
            QueryOptions {
                limit,
                sort: SortOrder::ModifiedDescending,
            },
        )
        .await
    }

    pub async fn execute(&self, query: &str, options: QueryOptions) -> Result<QueryOutcome> {
        let timer = OperationTimer::new("index query");

        let mut outcome = self
            .with_session(|session| async move { session.query(query, &options).await })
            .await?;
        outcome.records.truncate(options.limit);

        timer.finish_with_count(outcome.records.len());
        Ok(outcome)
    }

    /// Resolves one indexed document and reads its text.
    pub async fn fetch_document(
        &self,
        path: &Path,
        max_bytes: usize,
    ) -> Result<(NativeRecord, ExtractedText)> {
        let timer = OperationTimer::new("document fetch");

        let fetched = self
            .with_session(|session| async move {
                let record = session
                    .lookup(path)
                    .await?
                    .ok_or_else(|| AdapterError::DocumentNotFound(path.display().to_string()))?;
                let text = session.read_content(&record, max_bytes).await?;
                Ok((record, text))
            })
            .await?;

        timer.finish();
        Ok(fetched)
    }

    /// Runs `op` against the current session, reopening and retrying once
    /// when the engine reports the session stale.
    async fn with_session<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(Arc<dyn IndexSession>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let (generation, session) = self.session().await?;

        match self.bounded(op(session)).await {
            Err(err) if err.is_stale() => {
                warn!("{}; reopening the index session once", err);
                let (_, fresh) = self.reopen(generation).await?;
                self.bounded(op(fresh)).await.map_err(AdapterError::settle_stale)
            }
            other => other,
        }
    }

    async fn bounded<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.query_timeout, operation)
            .await
            .map_err(|_| {
                warn!("Index operation exceeded {:?}", self.query_timeout);
                AdapterError::QueryTimeout(self.query_timeout.as_millis() as u64)
            })?
    }

    async fn session(&self) -> Result<(u64, Arc<dyn IndexSession>)> {
        let (observed, current) = {
            let slot = self.slot.read().await;
            match &slot.state {
                SlotState::Open(session) => (slot.generation, Some(Arc::clone(session))),
                SlotState::Unopened | SlotState::Failed(_) => (slot.generation, None),
            }
        };

        // Checked after the guard drops; the check touches the filesystem.
        if let Some(session) = current {
            if !session.is_stale().await {
                return Ok((observed, session));
            }
            debug!("Index changed on disk since the session was opened");
        }

        self.reopen(observed).await
    }

    /// Single-flight open. Callers that observed the same generation queue
    /// here; the first one opens, the rest share its outcome.
    async fn reopen(&self, observed: u64) -> Result<(u64, Arc<dyn IndexSession>)> {
        let _guard = self.reopen_lock.lock().await;

        {
            let slot = self.slot.read().await;
            if slot.generation != observed {
                debug!("Index session already reopened by a concurrent call");
                return slot.outcome();
            }
        }

        info!("Opening {} index session", self.engine.name());
        let opened = self.bounded(self.engine.open()).await;

        let mut slot = self.slot.write().await;
        slot.generation += 1;
        slot.state = match &opened {
            Ok(session) => SlotState::Open(Arc::clone(session)),
            Err(err) => {
                error!("Failed to open index session: {}", err);
                SlotState::Failed(err.clone())
            }
        };

        opened.map(|session| (slot.generation, session))
    }
}
