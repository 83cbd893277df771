//! In-process implementation of the persistence store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::domain::entities::{
    Breakdown, ClickEvent, Dimension, NewClick, NewShortLink, Scope, ShortLink,
};
use crate::domain::repositories::PersistenceStore;
use crate::error::AppError;

/// Map-backed store used by tests and single-process deployments.
///
/// All state sits behind one [`RwLock`], so every mutation (code reservation,
/// click increment plus event append, delete plus event purge) is atomic with
/// respect to other callers. Reads share the lock.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    open: bool,
    next_link_id: i64,
    next_click_id: i64,
    /// Historical code space: every code ever reserved, with its owning link.
    codes: HashMap<String, Option<i64>>,
    links: BTreeMap<i64, ShortLink>,
    clicks: HashMap<i64, Vec<ClickEvent>>,
}

impl MemoryStore {
    /// Creates an empty store that is already open.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                open: true,
                next_link_id: 1,
                next_click_id: 1,
                codes: HashMap::new(),
                links: BTreeMap::new(),
                clicks: HashMap::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryState {
    fn ensure_open(&self, operation: &'static str, key: impl ToString) -> Result<(), AppError> {
        if self.open {
            Ok(())
        } else {
            Err(AppError::persistence(operation, key.to_string(), "store is closed"))
        }
    }

    fn visible_links<'a>(&'a self, scope: &'a Scope) -> impl Iterator<Item = &'a ShortLink> + 'a {
        self.links
            .values()
            .filter(move |l| !l.is_deleted() && scope.allows(l.owner.as_deref()))
    }
}

#[async_trait]
impl PersistenceStore for MemoryStore {
    async fn open(&self) -> Result<(), AppError> {
        self.state.write().await.open = true;
        Ok(())
    }

    async fn close(&self) -> Result<(), AppError> {
        self.state.write().await.open = false;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.state.read().await.ensure_open("health_check", "memory")
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let state = self.state.read().await;
        state.ensure_open("code_exists", code)?;
        Ok(state.codes.contains_key(code))
    }

    async fn reserve_code(&self, code: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        state.ensure_open("reserve_code", code)?;

        if state.codes.contains_key(code) {
            return Ok(false);
        }

        state.codes.insert(code.to_string(), None);
        Ok(true)
    }

    async fn insert_link(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut state = self.state.write().await;
        state.ensure_open("insert_link", &new_link.code)?;

        if let Some(Some(_)) = state.codes.get(&new_link.code) {
            return Err(AppError::code_taken(new_link.code));
        }

        let id = state.next_link_id;
        state.next_link_id += 1;

        state.codes.insert(new_link.code.clone(), Some(id));
        let link = new_link.into_link(id);
        state.links.insert(id, link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let state = self.state.read().await;
        state.ensure_open("find_by_code", code)?;

        Ok(state
            .codes
            .get(code)
            .copied()
            .flatten()
            .and_then(|id| state.links.get(&id))
            .filter(|link| !link.is_deleted())
            .cloned())
    }

    async fn list_links(&self, scope: &Scope) -> Result<Vec<ShortLink>, AppError> {
        let state = self.state.read().await;
        state.ensure_open("list_links", scope.owner().unwrap_or("*"))?;

        let mut links: Vec<ShortLink> = state.visible_links(scope).cloned().collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(links)
    }

    async fn deactivate(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        state.ensure_open("deactivate", id)?;

        match state.links.get_mut(&id) {
            Some(link) if link.is_active => {
                link.is_active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.ensure_open("soft_delete", id)?;

        match state.links.get_mut(&id) {
            Some(link) if !link.is_deleted() => {
                link.is_active = false;
                link.deleted_at = Some(Utc::now());
                state.clicks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_click(&self, new_click: NewClick) -> Result<Option<ShortLink>, AppError> {
        let mut state = self.state.write().await;
        state.ensure_open("record_click", new_click.link_id)?;

        let click_id = state.next_click_id;
        let link = match state.links.get_mut(&new_click.link_id) {
            Some(link) if link.is_resolvable_at(new_click.timestamp) => {
                link.clicks += 1;
                link.clone()
            }
            _ => return Ok(None),
        };

        state.next_click_id += 1;
        state
            .clicks
            .entry(link.id)
            .or_default()
            .push(new_click.into_event(click_id));

        Ok(Some(link))
    }

    async fn recent_clicks(&self, link_id: i64, limit: usize) -> Result<Vec<ClickEvent>, AppError> {
        let state = self.state.read().await;
        state.ensure_open("recent_clicks", link_id)?;

        Ok(state
            .clicks
            .get(&link_id)
            .map(|events| events.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_clicks(
        &self,
        scope: &Scope,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ClickEvent>, AppError> {
        let state = self.state.read().await;
        state.ensure_open("list_clicks", scope.owner().unwrap_or("*"))?;

        let mut events: Vec<ClickEvent> = state
            .visible_links(scope)
            .filter_map(|link| state.clicks.get(&link.id))
            .flatten()
            .filter(|event| since.is_none_or(|s| event.timestamp >= s))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

        Ok(events)
    }

    async fn count_clicks_by(
        &self,
        scope: &Scope,
        dimension: Dimension,
    ) -> Result<Breakdown, AppError> {
        let state = self.state.read().await;
        state.ensure_open("count_clicks_by", scope.owner().unwrap_or("*"))?;

        let events = state
            .visible_links(scope)
            .filter_map(|link| state.clicks.get(&link.id))
            .flatten();

        Ok(Breakdown::from_events(events, dimension))
    }
}
