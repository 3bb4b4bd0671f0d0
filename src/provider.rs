use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use chrono::Utc;

use crate::config::DashboardConfig;
use crate::crest::CrestTable;
use crate::pipeline::{run_fixtures, run_roster};
use crate::state::{Delta, ProviderCommand};

/// Runs fetch commands one at a time until either channel closes.
pub fn spawn_provider(
    cfg: DashboardConfig,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let crests = CrestTable::from_config(&cfg);
        let ready = Delta::Log(format!(
            "[INFO] Provider ready ({} crest ids)",
            crests.len()
        ));
        if tx.send(ready).is_err() {
            return;
        }

        while let Ok(cmd) = cmd_rx.recv() {
            if tx.send(run_command(&cfg, &crests, cmd)).is_err() {
                break;
            }
        }
    })
}

pub fn run_command(cfg: &DashboardConfig, crests: &CrestTable, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::FetchRoster => match run_roster(cfg) {
            Ok(roster) => Delta::SetRoster {
                roster,
                fetched_at: Utc::now(),
            },
            Err(err) => Delta::RosterFailed(err.to_string()),
        },
        ProviderCommand::FetchFixtures => match run_fixtures(cfg, crests) {
            Ok(batch) => Delta::SetFixtures {
                batch,
                fetched_at: Utc::now(),
            },
            Err(err) => Delta::FixturesFailed(err.to_string()),
        },
    }
}
