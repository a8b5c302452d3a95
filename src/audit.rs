//! Consistency auditing.
//!
//! XP is the only stored truth; level and rank are derived from it. The
//! `Auditor` recomputes those derived values from raw XP and reports any
//! claim that disagrees. It never corrects anything: callers decide
//! whether to reject, log or resync. Every check can also be appended to
//! an `AuditSink` so the trail outlives the process.

use crate::curve::CurveGenerator;
use crate::rank::RankTable;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Which XP snapshot a rank claim was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Snapshot {
    Before,
    After,
}

/// A disagreement between stored or claimed values and their recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "alert", rename_all = "snake_case")]
pub enum ConsistencyAlert {
    RankMismatch {
        snapshot: Snapshot,
        claimed: String,
        calculated: String,
    },
    XpDecreased {
        before: u64,
        after: u64,
    },
    XpLedgerMismatch {
        expected: u64,
        actual: u64,
    },
}

impl std::fmt::Display for ConsistencyAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsistencyAlert::RankMismatch {
                snapshot,
                claimed,
                calculated,
            } => write!(
                f,
                "rank {:?} claimed {} but XP resolves to {}",
                snapshot, claimed, calculated
            ),
            ConsistencyAlert::XpDecreased { before, after } => {
                write!(f, "XP decreased from {} to {}", before, after)
            }
            ConsistencyAlert::XpLedgerMismatch { expected, actual } => {
                write!(f, "XP ledger expected {} but found {}", expected, actual)
            }
        }
    }
}

/// Result of `Auditor::validate_rank_against_xp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankValidation {
    pub is_valid: bool,
    pub claimed_rank: String,
    pub calculated_rank: String,
    pub calculated_level: u32,
    /// Rank the caller should use instead, when the claim is wrong.
    pub correction: Option<String>,
}

/// Result of `Auditor::audit_xp_progression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAudit {
    pub passed: bool,
    pub expected_xp: u64,
    /// `current - (previous + gained)`, saturated to the `i64` range.
    pub discrepancy: i64,
}

/// Result of `Auditor::verify_rank_transition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTransitionAudit {
    pub is_legitimate: bool,
    pub alerts: Vec<ConsistencyAlert>,
}

/// One entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum AuditEvent {
    RankValidation {
        total_xp: u64,
        prestige: u32,
        result: RankValidation,
    },
    XpProgression {
        previous_xp: u64,
        gained_xp: u64,
        current_xp: u64,
        result: XpAudit,
    },
    RankTransition {
        old_rank: String,
        new_rank: String,
        xp_before: u64,
        xp_after: u64,
        prestige: u32,
        result: RankTransitionAudit,
    },
}

/// Append-only destination for audit events.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> std::io::Result<()>;
}

/// Writes one JSON document per line to any writer (file, socket, pipe).
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> AuditSink for JsonLinesSink<W> {
    fn record(&self, event: &AuditEvent) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

/// Keeps events in memory; intended for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl AuditSink for MemorySink {
    fn record(&self, event: &AuditEvent) -> std::io::Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Stateless verifier over a curve and a rank table.
///
/// # Examples
///
/// ```rust
/// use zzlevel::{EngineConfig, ProgressionEngine};
///
/// let engine = ProgressionEngine::new(EngineConfig::default()).unwrap();
/// let auditor = engine.auditor();
///
/// let check = auditor.validate_rank_against_xp("S", 1500, 0);
/// assert!(!check.is_valid);
/// assert_eq!(check.correction.as_deref(), Some("F"));
///
/// assert!(auditor.audit_xp_progression(100, 50, 150).passed);
/// ```
pub struct Auditor<'a> {
    curve: &'a CurveGenerator,
    ranks: &'a RankTable,
    sink: Option<&'a dyn AuditSink>,
}

impl<'a> Auditor<'a> {
    pub fn new(curve: &'a CurveGenerator, ranks: &'a RankTable) -> Self {
        Self {
            curve,
            ranks,
            sink: None,
        }
    }

    /// Record every check to `sink`.
    pub fn with_sink(mut self, sink: &'a dyn AuditSink) -> Self {
        self.sink = Some(sink);
        self
    }

    fn rank_for(&self, total_xp: u64, prestige: u32) -> (u32, &'a str) {
        let level = self.curve.thresholds(prestige).level_for_xp(total_xp);
        (level, self.ranks.rank_from_level(level).name.as_str())
    }

    fn emit(&self, event: AuditEvent) {
        if let Some(sink) = self.sink {
            if let Err(err) = sink.record(&event) {
                log::warn!("failed to record audit event: {}", err);
            }
        }
    }

    /// Compare a claimed rank with the rank derived from `total_xp`.
    pub fn validate_rank_against_xp(
        &self,
        claimed_rank: &str,
        total_xp: u64,
        prestige: u32,
    ) -> RankValidation {
        let (calculated_level, calculated) = self.rank_for(total_xp, prestige);
        let is_valid = claimed_rank == calculated;
        if !is_valid {
            log::warn!(
                "rank claim {} does not match {} (level {}, {} XP, prestige {})",
                claimed_rank,
                calculated,
                calculated_level,
                total_xp,
                prestige
            );
        }

        let result = RankValidation {
            is_valid,
            claimed_rank: claimed_rank.to_string(),
            calculated_rank: calculated.to_string(),
            calculated_level,
            correction: (!is_valid).then(|| calculated.to_string()),
        };
        self.emit(AuditEvent::RankValidation {
            total_xp,
            prestige,
            result: result.clone(),
        });
        result
    }

    /// Check that `current_xp == previous_xp + gained_xp` exactly.
    pub fn audit_xp_progression(&self, previous_xp: u64, gained_xp: u64, current_xp: u64) -> XpAudit {
        let expected = i128::from(previous_xp) + i128::from(gained_xp);
        let difference = i128::from(current_xp) - expected;
        let discrepancy = difference.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
        let passed = difference == 0;
        if !passed {
            log::warn!(
                "XP ledger mismatch: {} + {} != {} (off by {})",
                previous_xp,
                gained_xp,
                current_xp,
                discrepancy
            );
        }

        let result = XpAudit {
            passed,
            expected_xp: previous_xp.saturating_add(gained_xp),
            discrepancy,
        };
        self.emit(AuditEvent::XpProgression {
            previous_xp,
            gained_xp,
            current_xp,
            result,
        });
        result
    }

    /// Check both ends of a rank change against their XP snapshots.
    pub fn verify_rank_transition(
        &self,
        old_rank: &str,
        new_rank: &str,
        xp_before: u64,
        xp_after: u64,
        prestige: u32,
    ) -> RankTransitionAudit {
        let mut alerts = Vec::new();

        let (_, before) = self.rank_for(xp_before, prestige);
        if old_rank != before {
            alerts.push(ConsistencyAlert::RankMismatch {
                snapshot: Snapshot::Before,
                claimed: old_rank.to_string(),
                calculated: before.to_string(),
            });
        }

        let (_, after) = self.rank_for(xp_after, prestige);
        if new_rank != after {
            alerts.push(ConsistencyAlert::RankMismatch {
                snapshot: Snapshot::After,
                claimed: new_rank.to_string(),
                calculated: after.to_string(),
            });
        }

        if xp_after < xp_before {
            alerts.push(ConsistencyAlert::XpDecreased {
                before: xp_before,
                after: xp_after,
            });
        }

        for alert in &alerts {
            log::warn!("rank transition {} -> {}: {}", old_rank, new_rank, alert);
        }

        let result = RankTransitionAudit {
            is_legitimate: alerts.is_empty(),
            alerts,
        };
        self.emit(AuditEvent::RankTransition {
            old_rank: old_rank.to_string(),
            new_rank: new_rank.to_string(),
            xp_before,
            xp_after,
            prestige,
            result: result.clone(),
        });
        result
    }
}
