//! In-process dynamic rule engine with optional JSON persistence.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::rules::store::RuleStore;
use crate::rules::types::{RedirectRule, RuleId, RuleUpdate, StoreError, StoreResult};

/// Default cap on dynamic rules, matching the browser's limit.
pub const DEFAULT_MAX_RULES: usize = 30_000;

/// A rule store that keeps rules in memory.
///
/// Batches are validated in full before anything changes: a rejected batch
/// leaves the store exactly as it was.
#[derive(Debug)]
pub struct InMemoryRuleStore {
    rules: Mutex<BTreeMap<RuleId, RedirectRule>>,
    max_rules: usize,
    persistence_path: Option<PathBuf>,
}

impl InMemoryRuleStore {
    /// Create a new empty store.
    pub fn new(max_rules: usize) -> Self {
        Self {
            rules: Mutex::new(BTreeMap::new()),
            max_rules,
            persistence_path: None,
        }
    }

    /// Create a store seeded with `rules`.
    pub fn with_rules(rules: impl IntoIterator<Item = RedirectRule>) -> Self {
        let store = Self::new(DEFAULT_MAX_RULES);
        if let Ok(mut map) = store.rules.lock() {
            map.extend(rules.into_iter().map(|rule| (rule.id, rule)));
        }
        store
    }

    /// Load from file if it exists; every committed batch is written back.
    pub fn load_from_file(path: impl AsRef<Path>, max_rules: usize) -> std::io::Result<Self> {
        let path = path.as_ref();
        let mut map = BTreeMap::new();
        if path.exists() {
            let file = File::open(path)?;
            let rules: Vec<RedirectRule> = serde_json::from_reader(BufReader::new(file))?;
            map.extend(rules.into_iter().map(|rule| (rule.id, rule)));
            tracing::info!(path = %path.display(), count = map.len(), "Loaded dynamic rules");
        }

        Ok(Self {
            rules: Mutex::new(map),
            max_rules,
            persistence_path: Some(path.to_path_buf()),
        })
    }

    /// Number of rules currently stored.
    pub fn len(&self) -> usize {
        self.rules.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply(
        &self,
        current: &BTreeMap<RuleId, RedirectRule>,
        update: RuleUpdate,
    ) -> StoreResult<BTreeMap<RuleId, RedirectRule>> {
        let mut next = current.clone();
        for id in &update.remove_rule_ids {
            // Unknown ids are ignored, as the browser engine does.
            next.remove(id);
        }

        let mut added = HashSet::new();
        for rule in update.add_rules {
            if rule.id.0 < 1 {
                return Err(StoreError::InvalidId(rule.id));
            }
            if next.contains_key(&rule.id) || !added.insert(rule.id) {
                return Err(StoreError::DuplicateId(rule.id));
            }
            next.insert(rule.id, rule);
        }

        if next.len() > self.max_rules {
            return Err(StoreError::QuotaExceeded {
                limit: self.max_rules,
            });
        }

        Ok(next)
    }

    /// Write the snapshot to a sibling temp file, then rename it over the
    /// target. The previous file survives any failure before the rename.
    fn save_to_file(&self, rules: &BTreeMap<RuleId, RedirectRule>) -> StoreResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let persist_err = |e: &dyn std::fmt::Display| StoreError::Persistence(e.to_string());

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| persist_err(&e))?;

        let snapshot: Vec<&RedirectRule> = rules.values().collect();
        let mut writer = BufWriter::new(tmp);
        serde_json::to_writer_pretty(&mut writer, &snapshot).map_err(|e| persist_err(&e))?;
        writer.flush().map_err(|e| persist_err(&e))?;
        let tmp = writer.into_inner().map_err(|e| persist_err(e.error()))?;
        tmp.as_file().sync_all().map_err(|e| persist_err(&e))?;

        tmp.persist(path).map_err(|e| persist_err(&e.error))?;
        Ok(())
    }
}

impl Default for InMemoryRuleStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RULES)
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn get_dynamic_rules(&self) -> StoreResult<Vec<RedirectRule>> {
        let rules = self
            .rules
            .lock()
            .map_err(|_| StoreError::Unavailable("rule table lock poisoned".to_string()))?;
        Ok(rules.values().cloned().collect())
    }

    async fn update_dynamic_rules(&self, update: RuleUpdate) -> StoreResult<()> {
        let mut rules = self
            .rules
            .lock()
            .map_err(|_| StoreError::Unavailable("rule table lock poisoned".to_string()))?;

        let next = self.apply(&rules, update)?;
        self.save_to_file(&next)?;
        *rules = next;
        Ok(())
    }
}
