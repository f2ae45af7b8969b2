// file: src/index/memory.rs
// description: in-memory index engine used to exercise the gateway and tools in tests
// reference: internal test support

use super::{
    ExtractedText, IndexEngine, IndexSession, NativeRecord, QueryOptions, QueryOutcome,
    read_document_text,
};
use crate::error::{AdapterError, Result};
use crate::models::SortOrder;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub(crate) struct MemoryState {
    records: Mutex<Vec<NativeRecord>>,
    queries: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
    stale_check_delay: Mutex<Option<Duration>>,
    opens: AtomicUsize,
    generation: AtomicU64,
    fail_open: AtomicBool,
    stale_failures: AtomicUsize,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryEngine {
    state: Arc<MemoryState>,
}

impl MemoryEngine {
    pub fn with_records(records: Vec<NativeRecord>) -> Self {
        let engine = Self::default();
        *engine.state.records.lock().unwrap() = records;
        engine
    }

    pub fn opens(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.queries.lock().unwrap().clone()
    }

    /// Makes every open session report itself stale.
    pub fn touch_index(&self) {
        self.state.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn fail_open(&self, fail: bool) {
        self.state.fail_open.store(fail, Ordering::SeqCst);
    }

    /// The next `count` queries fail as if the database changed mid-read.
    pub fn fail_queries_stale(&self, count: usize) {
        self.state.stale_failures.store(count, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn set_stale_check_delay(&self, delay: Duration) {
        *self.state.stale_check_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl IndexEngine for MemoryEngine {
    fn name(&self) -> &str {
        "memory"
    }

    async fn open(&self) -> Result<Arc<dyn IndexSession>> {
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;

        if self.state.fail_open.load(Ordering::SeqCst) {
            return Err(AdapterError::IndexUnavailable(
                "memory index offline".to_string(),
            ));
        }

        Ok(Arc::new(MemorySession {
            state: Arc::clone(&self.state),
            generation: self.state.generation.load(Ordering::SeqCst),
        }))
    }
}

struct MemorySession {
    state: Arc<MemoryState>,
    generation: u64,
}

#[async_trait]
impl IndexSession for MemorySession {
    async fn query(&self, query: &str, options: &QueryOptions) -> Result<QueryOutcome> {
        let delay = *self.state.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let remaining = self.state.stale_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.state.stale_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AdapterError::StaleSession("DatabaseModified".to_string()));
        }

        self.state.queries.lock().unwrap().push(query.to_string());

        let groups = parse_groups(query);
        let mut matches: Vec<NativeRecord> = self
            .state
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| {
                groups
                    .iter()
                    .all(|group| group.iter().any(|condition| matches(record, condition)))
            })
            .cloned()
            .collect();

        if options.sort == SortOrder::ModifiedDescending {
            matches.sort_by_key(|record| std::cmp::Reverse(mtime(record)));
        }

        let total = matches.len() as u64;
        matches.truncate(options.limit);

        Ok(QueryOutcome {
            total: Some(total),
            records: matches,
        })
    }

    async fn lookup(&self, path: &Path) -> Result<Option<NativeRecord>> {
        let url = format!("file://{}", path.display());
        Ok(self
            .state
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.get("url") == Some(url.as_str()))
            .cloned())
    }

    async fn read_content(&self, record: &NativeRecord, max_bytes: usize) -> Result<ExtractedText> {
        read_document_text(record, max_bytes).await
    }

    async fn is_stale(&self) -> bool {
        let delay = *self.state.stale_check_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.state.generation.load(Ordering::SeqCst) != self.generation
    }
}

/// Splits a compiled query into AND-ed groups of OR-ed conditions.
fn parse_groups(query: &str) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut pending_or = false;

    for raw in query.split_whitespace() {
        let token = raw.trim_matches(|c| c == '(' || c == ')');
        match token {
            "" | "AND" => {}
            "OR" => pending_or = true,
            _ => {
                match groups.last_mut() {
                    Some(group) if pending_or => group.push(token.to_string()),
                    _ => groups.push(vec![token.to_string()]),
                }
                pending_or = false;
            }
        }
    }

    groups
}

fn matches(record: &NativeRecord, condition: &str) -> bool {
    if condition == "dir:/" {
        return true;
    }

    if let Some(range) = condition.strip_prefix("date:") {
        let (from, to) = range.split_once('/').unwrap_or((range, ""));
        let Some(day) = mtime(record)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive())
        else {
            return false;
        };
        let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
        return parse(from).is_none_or(|from| day >= from) && parse(to).is_none_or(|to| day <= to);
    }

    if let Some(mime) = condition.strip_prefix("mime:") {
        let actual = record.get("mtype").unwrap_or_default();
        return match mime.strip_suffix('*') {
            Some(prefix) => actual.starts_with(prefix),
            None => actual == mime,
        };
    }

    let needle = condition.to_lowercase();
    ["title", "filename", "abstract"]
        .iter()
        .filter_map(|field| record.get(field))
        .any(|value| value.to_lowercase().contains(&needle))
}

fn mtime(record: &NativeRecord) -> Option<i64> {
    record.get("mtime").and_then(|v| v.parse().ok())
}
