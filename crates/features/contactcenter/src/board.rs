use fxhash::FxHashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Per-agent call outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    pub answered: u64,
    pub missed: u64,
    pub talk_secs: u64,
}

type AgentKey = (String, String);

/// Live agent statistics keyed by tenant and agent, shared between the module and whoever
/// reports on it.
#[derive(Debug, Clone, Default)]
pub struct AgentBoard {
    agents: Arc<RwLock<FxHashMap<AgentKey, AgentStats>>>,
}

impl AgentBoard {
    pub(crate) fn record(&self, tenant: &str, agent: &str, answered: bool, billsec: u64) {
        let mut agents = self.agents.write();
        let stats = agents.entry((tenant.to_owned(), agent.to_owned())).or_default();
        if answered {
            stats.answered = stats.answered.saturating_add(1);
            stats.talk_secs = stats.talk_secs.saturating_add(billsec);
        } else {
            stats.missed = stats.missed.saturating_add(1);
        }
    }

    #[must_use]
    pub fn get(&self, tenant: &str, agent: &str) -> Option<AgentStats> {
        self.agents.read().get(&(tenant.to_owned(), agent.to_owned())).copied()
    }

    /// Agents of one tenant, sorted by name.
    #[must_use]
    pub fn snapshot(&self, tenant: &str) -> Vec<(String, AgentStats)> {
        let mut all: Vec<_> = self
            .agents
            .read()
            .iter()
            .filter(|((t, _), _)| t == tenant)
            .map(|((_, agent), stats)| (agent.clone(), *stats))
            .collect();
        all.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agents_are_scoped_to_their_tenant() {
        let board = AgentBoard::default();
        board.record("acme.example", "agent-7", true, 10);
        board.record("globex.example", "agent-7", true, 999);

        assert_eq!(
            board.get("acme.example", "agent-7"),
            Some(AgentStats { answered: 1, missed: 0, talk_secs: 10 })
        );
        assert_eq!(board.get("globex.example", "agent-7").map(|s| s.talk_secs), Some(999));
        assert!(board.get("initech.example", "agent-7").is_none());
        assert_eq!(board.snapshot("acme.example").len(), 1);
    }

    #[test]
    fn talk_time_saturates() {
        let board = AgentBoard::default();
        board.record("acme.example", "agent-7", true, u64::MAX);
        board.record("acme.example", "agent-7", true, 60);

        let stats = board.get("acme.example", "agent-7").unwrap();
        assert_eq!(stats.answered, 2);
        assert_eq!(stats.talk_secs, u64::MAX);
    }
}
