//! List view composition: pagination, sorting and search.

use crudmin_router::{url_encode, Request};
use serde::Serialize;

use crate::actions::Confirmation;
use crate::config::AdminConfig;
use crate::error::{AdminError, Result, StoreError};
use crate::marshal::{marshal, FieldNode};
use crate::options::{ListField, ModelAdmin};

/// Query parameters of the list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Zero-based page index.
    pub page: usize,
    /// Search query.
    pub query: Option<String>,
    /// Sort token, `Field` or `-Field`.
    pub sort: Option<String>,
}

impl ListParams {
    /// Parses `page`, `q` and `o` from the query string.
    ///
    /// A missing or unparsable page is page 0; empty `q`/`o` are absent.
    pub fn from_request(req: &Request) -> Self {
        let page = req
            .get_query("page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(0);
        let query = req
            .get_query("q")
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let sort = req
            .get_query("o")
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self { page, query, sort }
    }

    /// Builds a query string for another page, keeping search and sort.
    pub fn query_string_for_page(&self, page: usize) -> String {
        let mut parts = vec![format!("page={page}")];
        if let Some(ref q) = self.query {
            parts.push(format!("q={}", url_encode(q)));
        }
        if let Some(ref o) = self.sort {
            parts.push(format!("o={}", url_encode(o)));
        }
        format!("?{}", parts.join("&"))
    }
}

/// Requested sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    pub field: String,
    pub ascending: bool,
}

impl SortOrder {
    /// Parses a sort token. A leading `-` means descending.
    ///
    /// Returns `None` for an empty token or a lone `-`.
    pub fn parse(token: &str) -> Option<Self> {
        let (field, ascending) = match token.strip_prefix('-') {
            Some(rest) => (rest, false),
            None => (token, true),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            ascending,
        })
    }

    /// Returns the token form, inverse of [`parse`](Self::parse).
    pub fn token(&self) -> String {
        if self.ascending {
            self.field.clone()
        } else {
            format!("-{}", self.field)
        }
    }

    /// Returns `+1` ascending, `-1` descending.
    pub const fn direction(&self) -> i8 {
        if self.ascending {
            1
        } else {
            -1
        }
    }
}

/// Sort direction of every list column: `+1`/`-1` for the sorted column,
/// `0` for the rest.
pub fn sort_directions(admin: &ModelAdmin, sort: Option<&SortOrder>) -> Vec<(String, i8)> {
    admin
        .list_fields
        .iter()
        .map(|f| {
            let direction = match sort {
                Some(s) if s.field == f.name => s.direction(),
                _ => 0,
            };
            (f.name.clone(), direction)
        })
        .collect()
}

/// The page links shown around the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Requested page.
    pub current: usize,
    /// Number of pages for the record count.
    pub total_pages: usize,
    /// Contiguous page indices to link to.
    pub pages: Vec<usize>,
}

impl PageWindow {
    /// Computes the window for `count` records.
    ///
    /// At most `show_page_count` pages are listed, centered on `page` where
    /// possible and always within `0..total_pages`.
    pub fn compute(count: usize, page_size: usize, show_page_count: usize, page: usize) -> Self {
        let total_pages = count.div_ceil(page_size.max(1));
        let num = show_page_count.min(total_pages);
        if num == 0 {
            return Self {
                current: page,
                total_pages,
                pages: Vec::new(),
            };
        }

        let start = page.saturating_sub(num / 2);
        let end = (total_pages - 1).min(start.saturating_add(num - 1));
        let start = end.saturating_sub(num - 1);

        Self {
            current: page,
            total_pages,
            pages: (start..start + num).collect(),
        }
    }

    /// Index of the last page, if there is any page.
    pub fn last_page(&self) -> Option<usize> {
        self.total_pages.checked_sub(1)
    }

    /// Whether a page precedes the current one.
    pub fn has_previous(&self) -> bool {
        self.current > 0 && self.total_pages > 0
    }

    /// Whether a page follows the current one.
    pub fn has_next(&self) -> bool {
        self.current.saturating_add(1) < self.total_pages
    }
}

/// One record of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListRow {
    /// Primary key in URL form.
    pub pk: String,
    pub fields: Vec<FieldNode>,
}

impl ListRow {
    /// Top-level field by name.
    pub fn cell(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|n| n.identifier == name)
    }
}

/// An action as offered in the list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    pub identifier: String,
    pub display_name: String,
    pub confirm: Option<Confirmation>,
}

/// Everything a list page shows.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    /// Registered model name.
    pub model: String,
    pub columns: Vec<ListField>,
    pub rows: Vec<ListRow>,
    /// Total record (or match) count.
    pub total: usize,
    pub window: PageWindow,
    pub sort: Option<SortOrder>,
    pub directions: Vec<(String, i8)>,
    pub query: Option<String>,
    /// Search box hint; absent when the model has no searcher.
    pub search_placeholder: Option<String>,
    pub actions: Vec<ActionSummary>,
}

/// Fetches and marshals one list page.
///
/// With a searcher and a non-empty query, rows and total come from the
/// search. Otherwise the accessor is counted and listed. Any store failure
/// aborts the listing with [`AdminError::Store`].
pub async fn compose_listing(
    admin: &ModelAdmin,
    config: &AdminConfig,
    params: &ListParams,
) -> Result<Listing> {
    let page_size = config.effective_page_size();
    let sort = params
        .sort
        .as_deref()
        .and_then(SortOrder::parse)
        .filter(|s| {
            let sortable = admin.is_sortable(&s.field);
            if !sortable {
                tracing::debug!(model = %admin.name, field = %s.field, "ignoring sort on non-sortable field");
            }
            sortable
        });
    let query = params.query.as_deref().filter(|q| !q.is_empty());

    let (records, total) = match (admin.search(), query) {
        (Some(searcher), Some(q)) => searcher
            .search(page_size, params.page, q, sort.as_ref())
            .await
            .map_err(|err| listing_failure(admin, "search", err))?,
        _ => {
            let accessor = admin.accessor();
            let total = accessor
                .count()
                .await
                .map_err(|err| listing_failure(admin, "count", err))?;
            let records = accessor
                .list(page_size, params.page, sort.as_ref())
                .await
                .map_err(|err| listing_failure(admin, "list", err))?;
            (records, total)
        }
    };

    let window = PageWindow::compute(
        total,
        page_size,
        config.effective_show_page_count(),
        params.page,
    );

    let rows = records
        .iter()
        .map(|record| ListRow {
            pk: admin.pk_string(record.as_ref()),
            fields: marshal(record.as_ref(), admin, ""),
        })
        .collect();

    Ok(Listing {
        model: admin.name.clone(),
        columns: admin.list_fields.clone(),
        rows,
        total,
        window,
        directions: sort_directions(admin, sort.as_ref()),
        sort,
        query: query.map(str::to_string),
        search_placeholder: admin.search().map(|s| s.placeholder().to_string()),
        actions: admin
            .actions()
            .iter()
            .map(|a| ActionSummary {
                identifier: a.identifier.clone(),
                display_name: a.display_name.clone(),
                confirm: a.confirm.clone(),
            })
            .collect(),
    })
}

fn listing_failure(admin: &ModelAdmin, operation: &str, err: StoreError) -> AdminError {
    tracing::error!(model = %admin.name, operation, error = %err, "listing failed");
    AdminError::Store(err.to_string())
}
