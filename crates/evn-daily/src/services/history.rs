//! Run History Tracker
//!
//! Cron-mode wrapper around one pipeline execution:
//! `Start → BackupPrevious → ExecutePipeline → Success|Failure → Notify → End`.
//!
//! Only the execute step decides the exit status. Backup, sweep and
//! notification problems are logged and otherwise ignored.

use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::adapters::{JsonOutputStore, RunLog};
use crate::config::HistoryConfig;
use crate::domain::{PipelineError, PORTAL_DATE_FORMAT};
use crate::ports::PipelineRunner;

/// Log marker of a successful run
pub const SUCCESS_MARKER: &str = "[CRON] Run succeeded";
/// Log marker of a failed run
pub const FAILURE_MARKER: &str = "[CRON] Run failed";

const BACKUP_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Trailing lines of a failed run's output kept in the run log
const OUTPUT_TAIL_LINES: usize = 3;

/// Phases of a supervised run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Start,
    BackupPrevious,
    ExecutePipeline,
    Success,
    Failure,
    Notify,
    End,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::BackupPrevious => "BACKUP_PREVIOUS",
            Self::ExecutePipeline => "EXECUTE_PIPELINE",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Notify => "NOTIFY",
            Self::End => "END",
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one supervised run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    /// Consecutive failures including this run
    pub streak: usize,
    pub alert_raised: bool,
    pub backup: Option<PathBuf>,
    pub removed_backups: usize,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }
}

/// Consecutive failure markers at the end of the log.
///
/// Scans the last `scan_lines` lines backwards and stops at the first
/// success marker.
pub fn count_consecutive_failures<S: AsRef<str>>(lines: &[S], scan_lines: usize) -> usize {
    let start = lines.len().saturating_sub(scan_lines);
    let mut streak = 0;

    for line in lines[start..].iter().rev() {
        let line = line.as_ref();
        if line.contains(SUCCESS_MARKER) {
            break;
        }
        if line.contains(FAILURE_MARKER) {
            streak += 1;
        }
    }

    streak
}

pub struct RunHistoryTracker {
    config: HistoryConfig,
    runner: Arc<dyn PipelineRunner>,
    log: RunLog,
    output: JsonOutputStore,
}

impl RunHistoryTracker {
    pub fn new(config: HistoryConfig, runner: Arc<dyn PipelineRunner>) -> Self {
        Self {
            log: RunLog::new(config.log_path.clone()),
            output: JsonOutputStore::new(config.output_path.clone()),
            config,
            runner,
        }
    }

    /// One full supervised run
    pub async fn run(&self) -> RunOutcome {
        self.run_at(Local::now()).await
    }

    /// Supervised run with `now` used for the backup name and sweep age
    pub async fn run_at(&self, now: DateTime<Local>) -> RunOutcome {
        self.enter(RunPhase::Start);
        self.note(&"=".repeat(60));
        self.note("🤖 [CRON] EVN daily collector started");

        self.enter(RunPhase::BackupPrevious);
        let backup = match self.backup_previous(now) {
            Ok(backup) => backup,
            Err(e) => {
                self.note(&format!("⚠️ [CRON] Backup failed: {}", e));
                None
            }
        };
        let removed_backups = self.sweep_backups(SystemTime::from(now));

        self.enter(RunPhase::ExecutePipeline);
        let success = match self.execute().await {
            Ok(()) => {
                self.enter(RunPhase::Success);
                self.note(&format!("✅ {}", SUCCESS_MARKER));
                true
            }
            Err(e) => {
                self.enter(RunPhase::Failure);
                self.note(&format!("❌ {}: {}", FAILURE_MARKER, e));
                false
            }
        };

        self.enter(RunPhase::Notify);
        let streak = self.failure_streak();
        let alert_raised = streak >= self.config.alert_threshold;
        if alert_raised {
            tracing::error!(streak, "🚨 Pipeline failed {} times in a row", streak);
            self.note(&format!("🚨 [CRON] ALERT: {} consecutive failures", streak));
        } else if success {
            self.note("✅ [CRON] Operating normally");
        }

        self.enter(RunPhase::End);
        self.note(&format!(
            "🏁 [CRON] Finished: {}",
            if success { "SUCCESS" } else { "FAILURE" }
        ));
        self.note(&"=".repeat(60));

        RunOutcome {
            success,
            streak,
            alert_raised,
            backup,
            removed_backups,
        }
    }

    /// Copy the current output to a timestamped backup, if there is one
    pub fn backup_previous(&self, now: DateTime<Local>) -> Result<Option<PathBuf>, PipelineError> {
        let source = self.output.path();
        if !self.output.exists() {
            return Ok(None);
        }

        let target = backup_path(source, now);
        fs::copy(source, &target).map_err(|e| PipelineError::persistence(&target, e))?;
        self.note(&format!("💾 [CRON] Backed up previous output to {}", target.display()));
        Ok(Some(target))
    }

    /// Delete backups whose modification time is older than the
    /// retention window. Returns how many were removed.
    pub fn sweep_backups(&self, now: SystemTime) -> usize {
        let output = self.output.path();
        let dir = parent_dir(output);
        let Some(stem) = output.file_stem().and_then(|s| s.to_str()) else {
            return 0;
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.note(&format!("⚠️ [CRON] Cleanup failed: {}", e));
                return 0;
            }
        };

        let retention = self.config.retention();
        let mut removed = 0;

        for entry in entries.flatten() {
            let path = entry.path();
            if !is_backup_of(&path, stem) {
                continue;
            }

            let expired = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > retention);
            if !expired {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    removed += 1;
                    self.note(&format!("🗑️ [CRON] Removed old backup {}", path.display()));
                }
                Err(e) => {
                    self.note(&format!("⚠️ [CRON] Could not remove {}: {}", path.display(), e));
                }
            }
        }

        removed
    }

    async fn execute(&self) -> Result<(), PipelineError> {
        self.note("🔌 [CRON] Running acquisition pipeline");

        let timeout = self.config.run_timeout();
        let exit = tokio::time::timeout(timeout, self.runner.execute())
            .await
            .map_err(|_| PipelineError::Timeout {
                secs: timeout.as_secs(),
            })??;

        if !exit.is_success() {
            let stdout = output_tail(&exit.stdout, OUTPUT_TAIL_LINES);
            if !stdout.is_empty() {
                self.note(&format!("📋 [CRON] STDOUT: {}", stdout));
            }
            return Err(PipelineError::RunnerFailed {
                code: exit.code,
                stderr: output_tail(&exit.stderr, OUTPUT_TAIL_LINES),
            });
        }

        let document = self.output.read()?;
        self.note(&format!("📊 [CRON] Data: {}", document.headline()));
        if let Some(latest) = document.latest() {
            self.note(&format!(
                "⚡ [CRON] Latest day: {} - {} kWh",
                latest.date.format(PORTAL_DATE_FORMAT),
                latest.consumption_kwh
            ));
        }
        Ok(())
    }

    fn failure_streak(&self) -> usize {
        match self.log.tail(self.config.scan_lines) {
            Ok(lines) => count_consecutive_failures(lines.as_slice(), self.config.scan_lines),
            Err(e) => {
                tracing::warn!("⚠️  Could not read run log: {}", e);
                0
            }
        }
    }

    fn enter(&self, phase: RunPhase) {
        tracing::debug!(%phase, "Cron phase");
    }

    fn note(&self, message: &str) {
        if let Err(e) = self.log.append(message) {
            tracing::warn!("⚠️  Could not write run log: {}", e);
        }
    }
}

/// Last `n` non-blank lines of captured output
fn output_tail(output: &str, n: usize) -> String {
    let lines: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// `{dir}/{stem}_{YYYYMMDD_HHMMSS}.json`
pub fn backup_path(output: &Path, now: DateTime<Local>) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent_dir(output).join(format!("{}_{}.json", stem, now.format(BACKUP_STAMP_FORMAT)))
}

fn is_backup_of(path: &Path, stem: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix(stem))
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|stamp| NaiveDateTime::parse_from_str(stamp, BACKUP_STAMP_FORMAT).is_ok())
}
