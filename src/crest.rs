use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{DashboardConfig, DEFAULT_CREST_URL_TEMPLATE};

/// Returned for names missing from the table.
pub const UNKNOWN_CREST_ID: &str = "0";

const BUILTIN_CREST_IDS: &[(&str, &str)] = &[
    ("Manchester United", "1"),
    ("Manchester City", "43"),
    ("Liverpool", "14"),
    ("Chelsea", "8"),
    ("Arsenal", "3"),
    ("Tottenham Hotspur", "6"),
    ("Newcastle United", "4"),
    ("West Ham United", "21"),
    ("Aston Villa", "7"),
    ("Brighton and Hove Albion", "36"),
    ("Everton", "11"),
    ("Nottingham Forest", "17"),
    ("Crystal Palace", "31"),
    ("Fulham", "54"),
    ("Brentford", "94"),
    ("Wolverhampton Wanderers", "39"),
    ("Burnley", "90"),
    ("Sheffield United", "49"),
    ("Luton Town", "102"),
    ("AFC Bournemouth", "91"),
    ("Leicester City", "13"),
    ("Southampton", "20"),
    ("Ipswich Town", "5"),
];

/// Team full name -> crest id, plus the URL template the id is substituted into.
#[derive(Debug, Clone)]
pub struct CrestTable {
    ids: HashMap<String, String>,
    url_template: String,
}

impl Default for CrestTable {
    fn default() -> Self {
        Self::builtin(DEFAULT_CREST_URL_TEMPLATE)
    }
}

impl CrestTable {
    pub fn new(ids: HashMap<String, String>, url_template: impl Into<String>) -> Self {
        Self {
            ids,
            url_template: url_template.into(),
        }
    }

    pub fn builtin(url_template: impl Into<String>) -> Self {
        let ids = BUILTIN_CREST_IDS
            .iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect();
        Self::new(ids, url_template)
    }

    /// Built-in table, extended by `CREST_TABLE_PATH` when configured.
    /// A broken override file is reported and skipped.
    pub fn from_config(cfg: &DashboardConfig) -> Self {
        let mut table = Self::builtin(cfg.crest_url_template.clone());
        if let Some(path) = cfg.crest_table_path.as_deref() {
            match load_overrides(path) {
                Ok(extra) => {
                    log::info!("loaded {} crest ids from {}", extra.len(), path.display());
                    table.extend(extra);
                }
                Err(err) => log::warn!("ignoring crest table {}: {err:#}", path.display()),
            }
        }
        table
    }

    pub fn extend(&mut self, extra: HashMap<String, String>) {
        self.ids.extend(extra);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn crest_id(&self, team_name: &str) -> &str {
        self.ids
            .get(team_name)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CREST_ID)
    }

    pub fn crest_url(&self, team_name: &str) -> Option<String> {
        let id = self.crest_id(team_name);
        if id == UNKNOWN_CREST_ID {
            return None;
        }
        Some(self.url_template.replace("{id}", id))
    }
}

fn load_overrides(path: &Path) -> Result<HashMap<String, String>> {
    let raw = fs::read_to_string(path).context("read crest table")?;
    let value: HashMap<String, serde_json::Value> =
        serde_json::from_str(&raw).context("crest table must be a JSON object")?;
    value
        .into_iter()
        .map(|(name, id)| {
            let id = match id {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                other => return Err(anyhow::anyhow!("bad crest id for {name}: {other}")),
            };
            Ok((name, id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{CrestTable, UNKNOWN_CREST_ID};

    #[test]
    fn known_team_builds_badge_url() {
        let table = CrestTable::default();
        assert_eq!(
            table.crest_url("Arsenal").as_deref(),
            Some("https://resources.premierleague.com/premierleague/badges/t3.svg")
        );
    }

    #[test]
    fn unknown_team_maps_to_sentinel_and_no_url() {
        let table = CrestTable::default();
        assert_eq!(table.crest_id("Real Madrid"), UNKNOWN_CREST_ID);
        assert!(table.crest_url("Real Madrid").is_none());
    }

    #[test]
    fn injected_entries_extend_the_table() {
        let mut table = CrestTable::builtin("https://crests.test/{id}.png");
        table.extend(HashMap::from([("Leeds United".to_string(), "2".to_string())]));
        assert_eq!(
            table.crest_url("Leeds United").as_deref(),
            Some("https://crests.test/2.png")
        );
    }
}
