//! Token usage accounting keyed by agent-model pair and day.

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    fs::operations::{backup_aside, write_full},
    utils::time::date_to_day_name,
};

const LEDGER_FILE: &str = "token-usage.json";

/// Usage accumulated for one `{agent}-{model}` key. `total` always equals
/// the sum of the day buckets; there is no decrement operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgentUsage {
    pub total: u64,
    pub days: BTreeMap<String, u64>,
}

/// Ledger of token consumption, persisted as a single JSON file. Constructed
/// once at command start and passed by reference to whoever spends tokens;
/// every increment flushes the whole file.
pub struct UsageLedger {
    path: PathBuf,
    usage: BTreeMap<String, AgentUsage>,
}

impl UsageLedger {
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(LEDGER_FILE);
        let usage = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Usage ledger {path:?} is corrupt ({e}), resetting it");
                    match backup_aside(&path, "corrupt") {
                        Ok(backup) => warn!("Corrupt ledger copied to {backup:?}"),
                        Err(e) => warn!("Could not back up corrupt ledger: {e:?}"),
                    }
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, usage })
    }

    fn agent_key(agent: &str, model: &str) -> String {
        format!("{agent}-{model}")
    }

    /// Adds `tokens` to both the running total and the bucket for `day`,
    /// then persists the whole ledger.
    pub async fn increment(
        &mut self,
        agent: &str,
        model: &str,
        tokens: u64,
        day: NaiveDate,
    ) -> Result<()> {
        let entry = self
            .usage
            .entry(Self::agent_key(agent, model))
            .or_default();
        entry.total += tokens;
        *entry.days.entry(date_to_day_name(day)).or_default() += tokens;

        self.flush().await
    }

    /// Returns usage for a key, or None when the pair never spent tokens.
    /// Callers must treat None as "no usage yet", not as zero.
    pub fn get(&self, agent: &str, model: &str) -> Option<&AgentUsage> {
        self.usage.get(&Self::agent_key(agent, model))
    }

    pub fn all(&self) -> &BTreeMap<String, AgentUsage> {
        &self.usage
    }

    pub async fn flush(&self) -> Result<()> {
        let pretty = serde_json::to_string_pretty(&self.usage)?;
        write_full(&self.path, pretty.as_bytes()).await?;
        Ok(())
    }
}
