use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};
use crate::authors::domain::model::AuthorEntity;
use crate::core::context::RequestContext;
use crate::core::library::{CatalogError, CatalogResult};
use crate::quotes::domain::model::QuoteEntity;

// MemoryState mirrors the relational schema: ids are assigned from per-table
// sequences and quotes reference authors.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct MemoryState {
    pub authors: BTreeMap<i64, AuthorEntity>,
    pub quotes: BTreeMap<i64, QuoteEntity>,
    pub author_seq: i64,
    pub quote_seq: i64,
}

impl MemoryState {
    pub fn next_author_id(&mut self) -> i64 {
        self.author_seq += 1;
        self.author_seq
    }

    pub fn next_quote_id(&mut self) -> i64 {
        self.quote_seq += 1;
        self.quote_seq
    }

    pub fn has_quotes(&self, author_id: i64) -> bool {
        self.quotes.values().any(|q| q.author_id == author_id)
    }
}

// MemoryStore is the in-process storage engine used for development and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub(crate) fn shared(&self) -> Arc<Mutex<MemoryState>> {
        self.state.clone()
    }

    // lock_owned blocks other callers until the guard is dropped, and gives up
    // when the request deadline passes first.
    pub(crate) async fn lock_owned(&self, ctx: &RequestContext) -> CatalogResult<OwnedMutexGuard<MemoryState>> {
        ctx.within(async { Ok::<_, CatalogError>(self.state.clone().lock_owned().await) }).await
    }

    pub async fn ping(&self) {
        let _ = self.state.lock().await;
    }
}

pub(crate) async fn lock_state<'a>(state: &'a Mutex<MemoryState>,
                                   ctx: &RequestContext) -> CatalogResult<MutexGuard<'a, MemoryState>> {
    ctx.within(async { Ok::<_, CatalogError>(state.lock().await) }).await
}

// like_match is the in-memory counterpart of `ILIKE '%query%'`.
pub(crate) fn like_match(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(query.to_lowercase().as_str())
}
