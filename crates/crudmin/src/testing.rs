//! In-memory stores shared by the unit tests.

use std::sync::Arc;

use crudmin_router::{BoxFuture, FormData};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::list::SortOrder;
use crate::Record;
use crate::store::{Accessor, Records, Searcher};

#[derive(Debug, Clone, Default, PartialEq, Eq, Record)]
pub struct Named {
    pub id: u64,
    pub name: String,
}

/// Store with no records that rejects writes.
pub struct NullAccessor;

impl Accessor for NullAccessor {
    fn prototype(&self) -> Box<dyn Record> {
        Box::new(Named::default())
    }

    fn get<'a>(&'a self, _pk: &'a str) -> BoxFuture<'a, StoreResult<Box<dyn Record>>> {
        Box::pin(async { Err(StoreError::NotFound) })
    }

    fn list<'a>(
        &'a self,
        _page_size: usize,
        _page: usize,
        _sort: Option<&'a SortOrder>,
    ) -> BoxFuture<'a, StoreResult<Records>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn count(&self) -> BoxFuture<'_, StoreResult<usize>> {
        Box::pin(async { Ok(0) })
    }

    fn upsert<'a>(&'a self, _pk: &'a str, _values: &'a FormData) -> BoxFuture<'a, StoreResult<String>> {
        Box::pin(async { Err(StoreError::other("read only")) })
    }

    fn delete<'a>(&'a self, _pk: &'a str) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async { Err(StoreError::NotFound) })
    }
}

/// Store whose every call fails.
pub struct FailingAccessor;

impl Accessor for FailingAccessor {
    fn prototype(&self) -> Box<dyn Record> {
        Box::new(Named::default())
    }

    fn get<'a>(&'a self, _pk: &'a str) -> BoxFuture<'a, StoreResult<Box<dyn Record>>> {
        Box::pin(async { Err(StoreError::other("connection refused")) })
    }

    fn list<'a>(
        &'a self,
        _page_size: usize,
        _page: usize,
        _sort: Option<&'a SortOrder>,
    ) -> BoxFuture<'a, StoreResult<Records>> {
        Box::pin(async { Err(StoreError::other("connection refused")) })
    }

    fn count(&self) -> BoxFuture<'_, StoreResult<usize>> {
        Box::pin(async { Err(StoreError::other("connection refused")) })
    }

    fn upsert<'a>(&'a self, _pk: &'a str, _values: &'a FormData) -> BoxFuture<'a, StoreResult<String>> {
        Box::pin(async { Err(StoreError::other("connection refused")) })
    }

    fn delete<'a>(&'a self, _pk: &'a str) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async { Err(StoreError::other("connection refused")) })
    }
}

#[derive(Default)]
struct MemoryState {
    rows: Vec<Named>,
    next_id: u64,
}

/// Vec-backed store of [`Named`] records with ids starting at 1.
#[derive(Default)]
pub struct MemoryAccessor {
    state: RwLock<MemoryState>,
}

impl MemoryAccessor {
    pub fn with_names(names: &[&str]) -> Self {
        let rows: Vec<Named> = names
            .iter()
            .zip(1..)
            .map(|(name, id)| Named {
                id,
                name: (*name).to_string(),
            })
            .collect();
        let next_id = rows.len() as u64 + 1;
        Self {
            state: RwLock::new(MemoryState { rows, next_id }),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn find(&self, id: u64) -> Option<Named> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    async fn sorted(&self, sort: Option<&SortOrder>) -> Vec<Named> {
        let mut rows = self.state.read().await.rows.clone();
        if let Some(sort) = sort {
            match sort.field.as_str() {
                "name" => rows.sort_by(|a, b| a.name.cmp(&b.name)),
                _ => rows.sort_by_key(|r| r.id),
            }
            if !sort.ascending {
                rows.reverse();
            }
        }
        rows
    }
}

fn parse_id(pk: &str) -> StoreResult<u64> {
    pk.parse().map_err(|_| StoreError::InvalidId)
}

fn page_of(rows: Vec<Named>, page_size: usize, page: usize) -> Records {
    rows.into_iter()
        .skip(page * page_size)
        .take(page_size)
        .map(|r| Box::new(r) as Box<dyn Record>)
        .collect()
}

impl Accessor for MemoryAccessor {
    fn prototype(&self) -> Box<dyn Record> {
        Box::new(Named::default())
    }

    fn get<'a>(&'a self, pk: &'a str) -> BoxFuture<'a, StoreResult<Box<dyn Record>>> {
        Box::pin(async move {
            let id = parse_id(pk)?;
            self.find(id)
                .await
                .map(|r| Box::new(r) as Box<dyn Record>)
                .ok_or(StoreError::NotFound)
        })
    }

    fn list<'a>(
        &'a self,
        page_size: usize,
        page: usize,
        sort: Option<&'a SortOrder>,
    ) -> BoxFuture<'a, StoreResult<Records>> {
        Box::pin(async move { Ok(page_of(self.sorted(sort).await, page_size, page)) })
    }

    fn count(&self) -> BoxFuture<'_, StoreResult<usize>> {
        Box::pin(async move { Ok(self.len().await) })
    }

    fn upsert<'a>(&'a self, pk: &'a str, values: &'a FormData) -> BoxFuture<'a, StoreResult<String>> {
        Box::pin(async move {
            let name = values.get("name").unwrap_or_default().to_string();
            if name.is_empty() {
                return Err(StoreError::other("name must not be empty"));
            }
            let mut state = self.state.write().await;
            if pk.is_empty() {
                let id = state.next_id;
                state.next_id += 1;
                state.rows.push(Named { id, name });
                return Ok(id.to_string());
            }
            let id = parse_id(pk)?;
            let row = state
                .rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(StoreError::NotFound)?;
            row.name = name;
            Ok(id.to_string())
        })
    }

    fn delete<'a>(&'a self, pk: &'a str) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let id = parse_id(pk)?;
            let mut state = self.state.write().await;
            let index = state
                .rows
                .iter()
                .position(|r| r.id == id)
                .ok_or(StoreError::NotFound)?;
            state.rows.remove(index);
            Ok(())
        })
    }
}

/// Substring search over [`MemoryAccessor`] names.
pub struct NameSearcher(pub Arc<MemoryAccessor>);

impl Searcher for NameSearcher {
    fn placeholder(&self) -> &str {
        "Search by name"
    }

    fn search<'a>(
        &'a self,
        page_size: usize,
        page: usize,
        query: &'a str,
        sort: Option<&'a SortOrder>,
    ) -> BoxFuture<'a, StoreResult<(Records, usize)>> {
        Box::pin(async move {
            let matches: Vec<Named> = self
                .0
                .sorted(sort)
                .await
                .into_iter()
                .filter(|r| r.name.contains(query))
                .collect();
            let total = matches.len();
            Ok((page_of(matches, page_size, page), total))
        })
    }
}
