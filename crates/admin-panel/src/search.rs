//! Client-side search over users and requirements.
//!
//! [`search`] is a pure filter: case-insensitive substring containment on any
//! of an entity's searchable fields. [`SearchIndex`] adds the per-input
//! debounce, publishing rendered rows once the input has been quiet long
//! enough.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use common::AppResult;
use domain::{rut, Requirement, User, UserSummary};

use crate::clients::AdminApi;

pub const HIERARCHY_UNAVAILABLE: &str = "Hierarchy unavailable";

// ============================================================================
// Rows and outcomes
// ============================================================================

/// One rendered search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub id: i64,
    pub primary: String,
    pub secondary: Vec<String>,
}

/// What the caller shows for an empty query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnEmpty {
    /// Show an "enter a search term" prompt
    Prompt,
    /// Show the whole collection
    ShowAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<T> {
    Prompt,
    Results(Vec<T>),
    /// Query was non-empty and nothing matched
    NoResults,
}

impl<T> SearchOutcome<T> {
    pub fn items(&self) -> &[T] {
        match self {
            SearchOutcome::Results(items) => items,
            _ => &[],
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchOutcome<U> {
        match self {
            SearchOutcome::Prompt => SearchOutcome::Prompt,
            SearchOutcome::NoResults => SearchOutcome::NoResults,
            SearchOutcome::Results(items) => SearchOutcome::Results(items.into_iter().map(f).collect()),
        }
    }

    fn from_matches(items: Vec<T>) -> Self {
        if items.is_empty() {
            SearchOutcome::NoResults
        } else {
            SearchOutcome::Results(items)
        }
    }
}

// ============================================================================
// Searchable entities
// ============================================================================

/// Entity that can be filtered and rendered as a result row.
pub trait Searchable {
    /// Field values the query is matched against
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    fn result_row(&self) -> ResultRow;
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.first_name.as_str()),
            Cow::Borrowed(self.paternal_last_name.as_str()),
            Cow::Borrowed(self.maternal_last_name.as_str()),
            Cow::Borrowed(self.email.as_str()),
            Cow::Borrowed(self.rut.as_str()),
            // Also match the dotted form people type
            Cow::Owned(rut::format(&self.rut)),
        ]
    }

    fn result_row(&self) -> ResultRow {
        let role = self
            .role_name
            .clone()
            .unwrap_or_else(|| self.role.to_string());
        ResultRow {
            id: self.id,
            primary: self.full_name(),
            secondary: vec![self.email.clone(), rut::format(&self.rut), role],
        }
    }
}

impl Searchable for UserSummary {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        [&self.full_name, &self.email, &self.rut]
            .into_iter()
            .flatten()
            .map(|s| Cow::Borrowed(s.as_str()))
            .collect()
    }

    fn result_row(&self) -> ResultRow {
        let secondary = [
            self.email.clone(),
            self.rut.as_deref().map(rut::format),
            self.role_name.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();
        ResultRow {
            id: self.id,
            primary: self
                .full_name
                .clone()
                .unwrap_or_else(|| format!("User {}", self.id)),
            secondary,
        }
    }
}

impl Searchable for Requirement {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        std::iter::once(Some(&self.name))
            .chain([
                self.description.as_ref(),
                self.code.as_ref(),
                self.family_name.as_ref(),
                self.group_name.as_ref(),
                self.subgroup_name.as_ref(),
            ])
            .flatten()
            .map(|s| Cow::Borrowed(s.as_str()))
            .collect()
    }

    fn result_row(&self) -> ResultRow {
        let code = self.code.clone().unwrap_or_else(|| "-".to_string());
        let path = self
            .ancestor_path()
            .unwrap_or_else(|| HIERARCHY_UNAVAILABLE.to_string());
        ResultRow {
            id: self.id,
            primary: self.name.clone(),
            secondary: vec![code, path],
        }
    }
}

/// Check one entity against an already lowercased needle.
fn matches<T: Searchable>(item: &T, needle: &str) -> bool {
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Filter `items` by `query`. Never fails; results keep the input order.
pub fn search<'a, T: Searchable>(query: &str, items: &'a [T], on_empty: OnEmpty) -> SearchOutcome<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return match on_empty {
            OnEmpty::Prompt => SearchOutcome::Prompt,
            OnEmpty::ShowAll => SearchOutcome::Results(items.iter().collect()),
        };
    }
    SearchOutcome::from_matches(items.iter().filter(|item| matches(*item, &needle)).collect())
}

/// Server-side user search. An empty query yields the prompt state without a request.
pub async fn search_users_remote(api: &dyn AdminApi, query: &str) -> AppResult<SearchOutcome<UserSummary>> {
    if query.trim().is_empty() {
        return Ok(SearchOutcome::Prompt);
    }
    let users = api.search_users(query.trim()).await?;
    debug!("Remote user search '{}' returned {} rows", query, users.len());
    Ok(SearchOutcome::from_matches(users))
}

// ============================================================================
// Debounce
// ============================================================================

/// One reusable timer: scheduling again cancels whatever is still pending.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Run `task` after the quiet period unless rescheduled first.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Debounced search box over an in-memory collection.
pub struct SearchIndex<T> {
    items: Arc<Vec<T>>,
    on_empty: OnEmpty,
    debouncer: Debouncer,
    results_tx: mpsc::UnboundedSender<SearchOutcome<ResultRow>>,
}

impl<T> SearchIndex<T>
where
    T: Searchable + Send + Sync + 'static,
{
    /// Create the index and the receiver rendered outcomes are delivered on.
    pub fn new(
        items: Vec<T>,
        on_empty: OnEmpty,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchOutcome<ResultRow>>) {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let index = Self {
            items: Arc::new(items),
            on_empty,
            debouncer: Debouncer::new(delay),
            results_tx,
        };
        (index, results_rx)
    }

    /// Replace the collection, e.g. after a refresh.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = Arc::new(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Search immediately, bypassing the debounce.
    pub fn search_now(&self, query: &str) -> SearchOutcome<ResultRow> {
        search(query, self.items.as_slice(), self.on_empty).map(Searchable::result_row)
    }

    /// Handle a keystroke: the search runs once input has been quiet.
    pub fn on_input(&mut self, query: impl Into<String>) {
        let query = query.into();
        let items = Arc::clone(&self.items);
        let on_empty = self.on_empty;
        let results_tx = self.results_tx.clone();
        self.debouncer.schedule(async move {
            let outcome = search(&query, items.as_slice(), on_empty).map(Searchable::result_row);
            debug!("Search '{}' produced {} rows", query, outcome.items().len());
            // Receiver gone means the view was closed
            let _ = results_tx.send(outcome);
        });
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
