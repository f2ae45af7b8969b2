// file: src/index/recoll.rs
// description: recoll engine adapter driving the recollq query front end
// reference: https://www.recoll.org/manpages/recollq.1.html

use super::output::RecollOutputParser;
use super::{
    ExtractedText, IndexEngine, IndexSession, NativeRecord, QueryOptions, QueryOutcome,
    RECORD_FIELDS, read_document_text,
};
use crate::config::IndexConfig;
use crate::error::{AdapterError, Result};
use crate::models::{QueryClause, SearchRequest, SortOrder};
use crate::query::QueryTranslator;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::process::Command;
use tracing::{debug, info, warn};

const LOOKUP_LIMIT: usize = 50;
const LOOKUP_CEILING: usize = 5_000;
const DEFAULT_DB_DIR: &str = "xapiandb";

/// Engine messages meaning the database moved under us.
const STALE_MARKERS: &[&str] = &[
    "DatabaseModified",
    "DatabaseOpening",
    "DatabaseNotFound",
    "Can't open index",
];

#[derive(Debug, Clone)]
pub struct RecollEngine {
    program: PathBuf,
    confdir: PathBuf,
    dbdir: Option<PathBuf>,
    stemming_language: Option<String>,
}

impl RecollEngine {
    pub fn new(program: impl Into<PathBuf>, confdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            confdir: confdir.into(),
            dbdir: None,
            stemming_language: None,
        }
    }

    pub fn from_config(config: &IndexConfig) -> Result<Self> {
        let mut engine = Self::new(&config.recollq_path, config.resolve_confdir()?);
        engine.dbdir = config.dbdir.clone();
        engine.stemming_language = config.stemming_language.clone();
        Ok(engine)
    }

    pub fn confdir(&self) -> &Path {
        &self.confdir
    }

    /// Database location: explicit override, then `dbdir` from
    /// `recoll.conf`, then the engine default under the config directory.
    pub async fn resolve_dbdir(&self) -> PathBuf {
        if let Some(dbdir) = &self.dbdir {
            return dbdir.clone();
        }

        let conf_file = self.confdir.join("recoll.conf");
        if let Ok(contents) = tokio::fs::read_to_string(&conf_file).await
            && let Some(value) = read_conf_value(&contents, "dbdir")
        {
            return self.anchor(value);
        }

        self.confdir.join(DEFAULT_DB_DIR)
    }

    fn anchor(&self, value: &str) -> PathBuf {
        let path = Path::new(value);
        if let Ok(rest) = path.strip_prefix("~")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.confdir.join(path)
        }
    }
}

#[async_trait]
impl IndexEngine for RecollEngine {
    fn name(&self) -> &str {
        "recoll"
    }

    async fn open(&self) -> Result<Arc<dyn IndexSession>> {
        let confdir_meta = tokio::fs::metadata(&self.confdir).await.map_err(|e| {
            AdapterError::IndexUnavailable(format!(
                "Recoll configuration directory {}: {}",
                self.confdir.display(),
                e
            ))
        })?;

        if !confdir_meta.is_dir() {
            return Err(AdapterError::IndexUnavailable(format!(
                "{} is not a directory",
                self.confdir.display()
            )));
        }

        let dbdir = self.resolve_dbdir().await;
        let fingerprint = fingerprint(&dbdir).await.map_err(|e| {
            AdapterError::IndexUnavailable(format!(
                "Recoll index database {}: {}",
                dbdir.display(),
                e
            ))
        })?;

        tokio::fs::read_dir(&dbdir).await.map_err(|e| {
            AdapterError::IndexUnavailable(format!(
                "cannot read index database {}: {}",
                dbdir.display(),
                e
            ))
        })?;

        info!("Opened Recoll index at {}", dbdir.display());

        Ok(Arc::new(RecollSession {
            program: self.program.clone(),
            confdir: self.confdir.clone(),
            dbdir,
            fingerprint,
            stemming_language: self.stemming_language.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct RecollSession {
    program: PathBuf,
    confdir: PathBuf,
    dbdir: PathBuf,
    fingerprint: Option<SystemTime>,
    stemming_language: Option<String>,
}

impl RecollSession {
    pub fn dbdir(&self) -> &Path {
        &self.dbdir
    }

    fn command(&self, query: &str, options: &QueryOptions) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-c")
            .arg(&self.confdir)
            .arg("-F")
            .arg(RECORD_FIELDS.join(" "))
            .arg("-n")
            .arg(options.limit.to_string());

        if options.sort == SortOrder::ModifiedDescending {
            command.args(["-S", "mtime", "-D"]);
        }

        if let Some(language) = &self.stemming_language {
            command.arg("-s").arg(language);
        }

        // A leading '-' would be read as an option; the engine trims the space.
        if query.starts_with('-') {
            command.arg(format!(" {query}"));
        } else {
            command.arg(query);
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl IndexSession for RecollSession {
    async fn query(&self, query: &str, options: &QueryOptions) -> Result<QueryOutcome> {
        debug!("Running recollq with limit {}: {}", options.limit, query);

        let output = self.command(query, options).output().await.map_err(|e| {
            AdapterError::IndexUnavailable(format!(
                "cannot run {}: {}",
                self.program.display(),
                e
            ))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr, &stdout));
        }

        Ok(RecollOutputParser::new(RECORD_FIELDS).parse(&stdout, options.limit))
    }

    async fn lookup(&self, path: &Path) -> Result<Option<NativeRecord>> {
        let (Some(name), Some(parent)) = (path.file_name(), path.parent()) else {
            return Ok(None);
        };

        let clause = QueryClause::And(vec![
            QueryClause::Field {
                name: "filename".to_string(),
                value: name.to_string_lossy().into_owned(),
            },
            QueryClause::Field {
                name: "dir".to_string(),
                value: parent.to_string_lossy().into_owned(),
            },
        ]);
        let query =
            QueryTranslator::translate(&SearchRequest::new(LOOKUP_LIMIT).with_clause(clause))?;

        let url = format!("file://{}", path.display());
        let mut limit = LOOKUP_LIMIT;

        // Same-named files under one parent can outrank the exact match, so
        // widen to the reported total when the first page misses it.
        loop {
            let outcome = self
                .query(
                    &query,
                    &QueryOptions {
                        limit,
                        sort: SortOrder::Relevance,
                    },
                )
                .await?;

            let seen = outcome.records.len();
            let total = outcome
                .total
                .map(|t| usize::try_from(t).unwrap_or(usize::MAX));

            if let Some(record) = outcome
                .records
                .into_iter()
                .find(|record| record.get("url") == Some(url.as_str()))
            {
                return Ok(Some(record));
            }

            match total {
                Some(total) if total > seen && limit < LOOKUP_CEILING => {
                    limit = total.min(LOOKUP_CEILING);
                    debug!("Widening lookup for {} to {} hits", path.display(), limit);
                }
                _ => return Ok(None),
            }
        }
    }

    async fn read_content(&self, record: &NativeRecord, max_bytes: usize) -> Result<ExtractedText> {
        read_document_text(record, max_bytes).await
    }

    async fn is_stale(&self) -> bool {
        match fingerprint(&self.dbdir).await {
            Ok(current) => current != self.fingerprint,
            Err(e) => {
                warn!("Index database {} unreadable: {}", self.dbdir.display(), e);
                true
            }
        }
    }
}

async fn fingerprint(dbdir: &Path) -> std::io::Result<Option<SystemTime>> {
    let metadata = tokio::fs::metadata(dbdir).await?;
    if !metadata.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not a directory",
        ));
    }
    Ok(metadata.modified().ok())
}

fn classify_failure(stderr: &str, stdout: &str) -> AdapterError {
    let message = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };

    if STALE_MARKERS
        .iter()
        .any(|marker| stderr.contains(marker) || stdout.contains(marker))
    {
        return AdapterError::StaleSession(message.to_string());
    }

    if message.contains("DatabaseCorrupt") {
        return AdapterError::IndexUnavailable(message.to_string());
    }

    AdapterError::QueryExecution(if message.is_empty() {
        "recollq exited with an error".to_string()
    } else {
        message.to_string()
    })
}

fn read_conf_value<'a>(contents: &'a str, key: &str) -> Option<&'a str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(name, _)| name.trim() == key)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn index_dirs() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let confdir = temp.path().join("recoll");
        std::fs::create_dir_all(confdir.join(DEFAULT_DB_DIR)).unwrap();
        (temp, confdir)
    }

    #[test]
    fn test_read_conf_value() {
        let conf = "# comment\ntopdirs = ~/Documents\n dbdir = /var/cache/recoll \n";
        assert_eq!(read_conf_value(conf, "dbdir"), Some("/var/cache/recoll"));
        assert_eq!(read_conf_value(conf, "topdirs"), Some("~/Documents"));
        assert_eq!(read_conf_value(conf, "missing"), None);
    }

    #[tokio::test]
    async fn test_resolve_dbdir_from_recoll_conf() {
        let (_temp, confdir) = index_dirs();
        std::fs::write(confdir.join("recoll.conf"), "dbdir = altdb\n").unwrap();

        let engine = RecollEngine::new("recollq", &confdir);
        assert_eq!(engine.resolve_dbdir().await, confdir.join("altdb"));
    }

    #[tokio::test]
    async fn test_resolve_dbdir_defaults_under_confdir() {
        let (_temp, confdir) = index_dirs();
        let engine = RecollEngine::new("recollq", &confdir);
        assert_eq!(engine.resolve_dbdir().await, confdir.join(DEFAULT_DB_DIR));
    }

    #[tokio::test]
    async fn test_open_missing_confdir_is_unavailable() {
        let engine = RecollEngine::new("recollq", "/nonexistent/recoll/config");
        let err = engine.open().await.err().unwrap();
        assert!(matches!(err, AdapterError::IndexUnavailable(_)));
    }

    #[tokio::test]
    async fn test_open_missing_database_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let engine = RecollEngine::new("recollq", temp.path());
        let err = engine.open().await.err().unwrap();
        assert!(matches!(err, AdapterError::IndexUnavailable(_)));
    }

    #[tokio::test]
    async fn test_session_goes_stale_when_database_removed() {
        let (_temp, confdir) = index_dirs();
        let engine = RecollEngine::new("recollq", &confdir);
        let session = engine.open().await.unwrap();
        assert!(!session.is_stale().await);

        std::fs::remove_dir_all(confdir.join(DEFAULT_DB_DIR)).unwrap();
        assert!(session.is_stale().await);
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let (_temp, confdir) = index_dirs();
        let engine = RecollEngine::new("/nonexistent/bin/recollq", &confdir);
        let session = engine.open().await.unwrap();

        let err = session
            .query(
                "yubikey",
                &QueryOptions {
                    limit: 5,
                    sort: SortOrder::Relevance,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::IndexUnavailable(_)));
    }

    #[test]
    fn test_classify_failure() {
        assert!(classify_failure("Xapian::DatabaseModifiedError: reopen", "").is_stale());
        assert!(matches!(
            classify_failure("Query string interpretation failed: syntax", ""),
            AdapterError::QueryExecution(_)
        ));
        assert!(matches!(
            classify_failure("", "DatabaseCorruptError"),
            AdapterError::IndexUnavailable(_)
        ));
        assert!(matches!(classify_failure("", ""), AdapterError::QueryExecution(_)));
    }

    #[cfg(unix)]
    mod fake_recollq {
        use super::*;
        use base64::Engine as _;
        use base64::engine::general_purpose::STANDARD;
        use std::os::unix::fs::PermissionsExt;

        fn install_script(dir: &Path, body: &str) -> PathBuf {
            let script = dir.join("recollq");
            std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
            script
        }

        fn encoded_line(url: &str, mtype: &str, text: &str) -> String {
            let values = [url, "n", "t", mtype, "10", "1733011200", "90%", text];
            values
                .iter()
                .map(|v| STANDARD.encode(v))
                .collect::<Vec<_>>()
                .join(" ")
        }

        #[tokio::test]
        async fn test_query_decodes_engine_output() {
            let (temp, confdir) = index_dirs();
            let output = format!(
                "Recoll query: ((yubikey))\n2 results\n{}\n{}",
                encoded_line("file:///notes/a.md", "text/markdown", "yubikey setup"),
                encoded_line("file:///notes/b.md", "text/markdown", "yubikey backup"),
            );
            let script = install_script(temp.path(), &format!("printf '%s\\n' '{}'", output.replace('\n', "' '")));

            let session = RecollEngine::new(script, &confdir).open().await.unwrap();
            let outcome = session
                .query(
                    "yubikey",
                    &QueryOptions {
                        limit: 1,
                        sort: SortOrder::Relevance,
                    },
                )
                .await
                .unwrap();

            assert_eq!(outcome.total, Some(2));
            assert_eq!(outcome.records.len(), 1);
            assert_eq!(outcome.records[0].get("url"), Some("file:///notes/a.md"));
        }

        #[tokio::test]
        async fn test_lookup_widens_past_same_named_files() {
            let (temp, confdir) = index_dirs();
            let mut lines = vec![
                "Recoll query: ((filename:notes.txt))".to_string(),
                "60 results".to_string(),
            ];
            for i in 0..59 {
                let url = format!("file:///archive/{i}/notes.txt");
                lines.push(encoded_line(&url, "text/plain", "old"));
            }
            lines.push(encoded_line("file:///home/notes.txt", "text/plain", "current"));
            std::fs::write(temp.path().join("output"), lines.join("\n") + "\n").unwrap();

            let calls = temp.path().join("calls");
            let script = install_script(
                temp.path(),
                &format!(
                    "echo \"$*\" >> '{}'\ncat '{}'",
                    calls.display(),
                    temp.path().join("output").display()
                ),
            );

            let session = RecollEngine::new(script, &confdir).open().await.unwrap();
            let record = session
                .lookup(Path::new("/home/notes.txt"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(record.get("url"), Some("file:///home/notes.txt"));

            let calls = std::fs::read_to_string(calls).unwrap();
            assert_eq!(calls.lines().count(), 2);
            assert!(calls.lines().nth(1).unwrap().contains("-n 60"));
        }

        #[tokio::test]
        async fn test_lookup_without_exact_match_is_none() {
            let (temp, confdir) = index_dirs();
            let output = format!(
                "Recoll query: ((filename:notes.txt))\n1 results\n{}\n",
                encoded_line("file:///archive/notes.txt", "text/plain", "old")
            );
            std::fs::write(temp.path().join("output"), output).unwrap();
            let script = install_script(
                temp.path(),
                &format!("cat '{}'", temp.path().join("output").display()),
            );

            let session = RecollEngine::new(script, &confdir).open().await.unwrap();
            let found = session.lookup(Path::new("/home/notes.txt")).await.unwrap();
            assert!(found.is_none());
        }

        #[tokio::test]
        async fn test_database_error_is_stale() {
            let (temp, confdir) = index_dirs();
            let script = install_script(
                temp.path(),
                "echo 'Xapian::DatabaseModifiedError: The revision being read has been discarded' >&2\nexit 1",
            );

            let session = RecollEngine::new(script, &confdir).open().await.unwrap();
            let err = session
                .query(
                    "yubikey",
                    &QueryOptions {
                        limit: 5,
                        sort: SortOrder::Relevance,
                    },
                )
                .await
                .unwrap_err();
            assert!(err.is_stale());
        }
    }
}
