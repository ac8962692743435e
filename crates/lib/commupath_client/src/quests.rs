//! Local quest store.
//!
//! Holds quests generated or claimed during this session. The server stays
//! authoritative; pages reconcile with a fresh fetch before display.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use commupath_models::{Quest, QuestStatus};

#[derive(Debug, Clone, Default)]
pub struct QuestStore {
    quests: Arc<Mutex<Vec<Quest>>>,
}

impl QuestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append without deduplicating.
    pub fn add_quest(&self, quest: Quest) {
        if let Ok(mut quests) = self.quests.lock() {
            quests.push(quest);
        }
    }

    /// Fold `incoming` into the store, replacing quests with the same id.
    pub fn merge(&self, incoming: Vec<Quest>) {
        if let Ok(mut quests) = self.quests.lock() {
            let current = std::mem::take(&mut *quests);
            *quests = merge_quests(current, incoming);
        }
    }

    /// Mirror a transition the server already accepted.
    pub fn update_quest_status(&self, quest_id: &str, status: QuestStatus) -> bool {
        let Ok(mut quests) = self.quests.lock() else {
            return false;
        };
        let mut found = false;
        for quest in quests.iter_mut().filter(|q| q.quest_id == quest_id) {
            quest.status = status;
            found = true;
        }
        found
    }

    pub fn get(&self, quest_id: &str) -> Option<Quest> {
        self.quests
            .lock()
            .ok()?
            .iter()
            .rev()
            .find(|q| q.quest_id == quest_id)
            .cloned()
    }

    pub fn snapshot(&self) -> Vec<Quest> {
        self.quests.lock().map(|q| q.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.quests.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut quests) = self.quests.lock() {
            quests.clear();
        }
    }
}

/// Deduplicate by quest id. Later entries win; order is first-seen.
pub fn merge_quests(first: Vec<Quest>, second: Vec<Quest>) -> Vec<Quest> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<Quest> = Vec::with_capacity(first.len() + second.len());
    for quest in first.into_iter().chain(second) {
        match index.get(&quest.quest_id) {
            Some(&i) => merged[i] = quest,
            None => {
                index.insert(quest.quest_id.clone(), merged.len());
                merged.push(quest);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use commupath_models::{Category, Difficulty, Location};

    fn quest(id: &str, title: &str) -> Quest {
        Quest {
            quest_id: id.into(),
            title: title.into(),
            description: "Organize a cleanup event at a local park.".into(),
            category: Category::Environment,
            difficulty: Difficulty::Medium,
            impact_metric: "Clean 200 sq meters".into(),
            estimated_time: None,
            community_benefit: None,
            location: Location::from(commupath_models::Coordinates::new(7.3775, 3.9470)),
            status: QuestStatus::Active,
            created_by: None,
            assigned_to: None,
            created_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn add_quest_keeps_duplicates() {
        let store = QuestStore::new();
        store.add_quest(quest("q1", "a"));
        store.add_quest(quest("q1", "b"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("q1").unwrap().title, "b");
    }

    #[test]
    fn merge_is_last_write_wins_in_first_seen_order() {
        let merged = merge_quests(
            vec![quest("q1", "local"), quest("q2", "local")],
            vec![quest("q3", "server"), quest("q1", "server")],
        );
        let ids: Vec<&str> = merged.iter().map(|q| q.quest_id.as_str()).collect();
        assert_eq!(ids, ["q1", "q2", "q3"]);
        assert_eq!(merged[0].title, "server");
    }

    #[test]
    fn store_merge_collapses_existing_duplicates() {
        let store = QuestStore::new();
        store.add_quest(quest("q1", "a"));
        store.add_quest(quest("q1", "b"));
        store.merge(vec![quest("q2", "c")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("q1").unwrap().title, "b");
    }

    #[test]
    fn status_update_is_local_only() {
        let store = QuestStore::new();
        store.add_quest(quest("q1", "a"));
        assert!(store.update_quest_status("q1", QuestStatus::InProgress));
        assert!(!store.update_quest_status("missing", QuestStatus::Completed));
        assert_eq!(store.get("q1").unwrap().status, QuestStatus::InProgress);
        store.clear();
        assert!(store.is_empty());
    }
}
