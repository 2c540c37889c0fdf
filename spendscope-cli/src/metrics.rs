//! Run metrics: categorization latency and conflicts, stability hashes,
//! and LLM inference stats, flushed as a JSON snapshot per run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use spendscope_core::RuleMatch;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStats {
    pub timestamp: String,
    pub total_time_seconds: f64,
    pub transaction_count: usize,
    pub time_per_transaction_ms: f64,
    pub conflict_count: usize,
    pub conflict_rate_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictEvent {
    pub vendor: String,
    pub category: String,
    pub matched_rules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmStat {
    pub question: String,
    pub duration_seconds: f64,
    pub response_words: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub generated_at: String,
    pub categorization_metrics: CategorizationMetrics,
    pub conflicts: Conflicts,
    pub hash_stability: HashStability,
    pub llm_metrics: LlmMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategorizationMetrics {
    pub details: Vec<BatchStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Conflicts {
    pub total_conflicts: usize,
    pub details: Vec<ConflictEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HashStability {
    pub hashes: HashMap<String, String>,
    pub instability_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmMetrics {
    pub details: Vec<LlmStat>,
}

/// Truncated sha256 over the full categorization decision. The same vendor
/// producing a different hash across runs means the rule set (or its
/// ordering) changed underneath us.
pub fn stability_hash(vendor: &str, category: &str, rule_id: &str, priority: i32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{vendor}|{category}|{rule_id}|{priority}"));
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..16].to_string()
}

pub struct RunMetrics {
    batches: Vec<BatchStats>,
    conflicts: Vec<ConflictEvent>,
    hashes: HashMap<String, String>,
    instability_count: usize,
    llm: Vec<LlmStat>,
    batch_started: Option<Instant>,
    batch_count: usize,
    batch_conflicts: usize,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
            conflicts: Vec::new(),
            hashes: HashMap::new(),
            instability_count: 0,
            llm: Vec::new(),
            batch_started: None,
            batch_count: 0,
            batch_conflicts: 0,
        }
    }

    pub fn start_categorization(&mut self) {
        self.batch_started = Some(Instant::now());
        self.batch_count = 0;
        self.batch_conflicts = 0;
    }

    /// Record one vendor's traced classification. A multi-rule match counts
    /// as a conflict but never changes the outcome.
    pub fn record_classification(&mut self, vendor: &str, result: &RuleMatch) {
        self.batch_count += 1;
        if result.matched.len() > 1 {
            self.batch_conflicts += 1;
            self.conflicts.push(ConflictEvent {
                vendor: vendor.to_string(),
                category: result.category.clone(),
                matched_rules: result.matched.clone(),
            });
        }

        let hash = stability_hash(
            vendor,
            &result.category,
            result.rule_id.as_deref().unwrap_or("-"),
            result.priority.unwrap_or(0),
        );
        let key = vendor.to_uppercase();
        match self.hashes.get(&key) {
            Some(prev) if prev != &hash => {
                self.instability_count += 1;
                eprintln!("Warning: hash instability for {vendor} ({prev} -> {hash})");
            }
            Some(_) => {}
            None => {
                self.hashes.insert(key, hash);
            }
        }
    }

    pub fn finish_categorization(&mut self) {
        let Some(started) = self.batch_started.take() else {
            return;
        };
        let elapsed = started.elapsed().as_secs_f64();
        let count = self.batch_count;
        self.batches.push(BatchStats {
            timestamp: chrono::Utc::now().to_rfc3339(),
            total_time_seconds: elapsed,
            transaction_count: count,
            time_per_transaction_ms: if count > 0 {
                elapsed / count as f64 * 1000.0
            } else {
                0.0
            },
            conflict_count: self.batch_conflicts,
            conflict_rate_percent: if count > 0 {
                self.batch_conflicts as f64 / count as f64 * 100.0
            } else {
                0.0
            },
        });
    }

    pub fn record_llm(&mut self, question: &str, duration_seconds: f64, response: &str) {
        self.llm.push(LlmStat {
            question: question.to_string(),
            duration_seconds,
            response_words: response.split_whitespace().count(),
        });
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generated_at: chrono::Utc::now().to_rfc3339(),
            categorization_metrics: CategorizationMetrics {
                details: self.batches.clone(),
            },
            conflicts: Conflicts {
                total_conflicts: self.conflicts.len(),
                details: self.conflicts.clone(),
            },
            hash_stability: HashStability {
                hashes: self.hashes.clone(),
                instability_count: self.instability_count,
            },
            llm_metrics: LlmMetrics {
                details: self.llm.clone(),
            },
        }
    }

    /// Write `metrics_YYYYMMDD_HHMMSS.json` into `dir`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("metrics_{stamp}.json"));
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

/// Newest metrics snapshot in `dir`, if any.
pub fn latest_snapshot(dir: &Path) -> Result<Option<Snapshot>> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    if !dir.exists() {
        return Ok(None);
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !(name.starts_with("metrics_") && name.ends_with(".json")) {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().is_none_or(|(t, _)| modified > *t) {
            newest = Some((modified, entry.path()));
        }
    }
    let Some((_, path)) = newest else {
        return Ok(None);
    };
    let s = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    Ok(Some(serde_json::from_str(&s)?))
}

pub fn print_summary(snapshot: &Snapshot) {
    println!("Metrics snapshot from {}", snapshot.generated_at);
    for batch in &snapshot.categorization_metrics.details {
        println!(
            "  categorization: {} transactions in {:.3}s ({:.2} ms each), {} conflicts ({:.1}%)",
            batch.transaction_count,
            batch.total_time_seconds,
            batch.time_per_transaction_ms,
            batch.conflict_count,
            batch.conflict_rate_percent,
        );
    }
    println!("  conflicts recorded: {}", snapshot.conflicts.total_conflicts);
    println!(
        "  stability hashes: {} tracked, {} instabilities",
        snapshot.hash_stability.hashes.len(),
        snapshot.hash_stability.instability_count,
    );
    for llm in &snapshot.llm_metrics.details {
        println!(
            "  llm: {:.1}s, {} words — {}",
            llm.duration_seconds, llm.response_words, llm.question
        );
    }
}
