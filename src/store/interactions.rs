use std::collections::BTreeSet;

use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Read,
    Favorite,
}

#[derive(Debug, Default)]
struct Interactions {
    read: BTreeSet<String>,
    favorites: BTreeSet<String>,
}

impl Interactions {
    fn set(&self, kind: InteractionKind) -> &BTreeSet<String> {
        match kind {
            InteractionKind::Read => &self.read,
            InteractionKind::Favorite => &self.favorites,
        }
    }

    fn set_mut(&mut self, kind: InteractionKind) -> &mut BTreeSet<String> {
        match kind {
            InteractionKind::Read => &mut self.read,
            InteractionKind::Favorite => &mut self.favorites,
        }
    }
}

/// Per-user read and favorite article ids. Records are created on first
/// write; unknown users read as empty.
#[derive(Debug, Default)]
pub struct InteractionStore {
    records: DashMap<String, Interactions>,
}

impl InteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the article was already marked.
    pub fn mark(&self, user: &str, kind: InteractionKind, article_id: &str) -> bool {
        self.records
            .entry(user.to_string())
            .or_default()
            .set_mut(kind)
            .insert(article_id.to_string())
    }

    /// Ids in ascending order.
    pub fn list(&self, user: &str, kind: InteractionKind) -> Vec<String> {
        self.records
            .get(user)
            .map(|record| record.set(kind).iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn mark_read(&self, user: &str, article_id: &str) -> bool {
        self.mark(user, InteractionKind::Read, article_id)
    }

    pub fn mark_favorite(&self, user: &str, article_id: &str) -> bool {
        self.mark(user, InteractionKind::Favorite, article_id)
    }

    pub fn list_read(&self, user: &str) -> Vec<String> {
        self.list(user, InteractionKind::Read)
    }

    pub fn list_favorites(&self, user: &str) -> Vec<String> {
        self.list(user, InteractionKind::Favorite)
    }
}
