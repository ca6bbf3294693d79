#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use crudmin::{
    Accessor, AdminAction, AdminConfig, AdminSite, Authenticator, BoxFuture, FormData, ModelAdmin,
    Operation, Record, Records, Request, Searcher, SortOrder, StoreError, StoreResult,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Part {
    #[record(rename = "Name")]
    pub name: String,
    #[record(rename = "Qty")]
    pub qty: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Dimensions {
    #[record(rename = "Width")]
    pub width: f64,
    #[record(rename = "Height")]
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Record)]
pub struct Widget {
    #[record(rename = "ID")]
    pub id: u64,
    #[record(rename = "Name")]
    pub name: String,
    #[record(rename = "Price")]
    pub price: f64,
    #[record(rename = "Active")]
    pub active: bool,
    #[record(rename = "Note")]
    pub note: Option<String>,
    #[record(rename = "Size")]
    pub size: Dimensions,
    #[record(rename = "Parts")]
    pub parts: Vec<Part>,
    #[record(rename = "Released", display)]
    pub released: NaiveDate,
    #[record(skip)]
    pub cache: Vec<u8>,
}

impl Widget {
    pub fn named(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            price: 1.5,
            active: true,
            note: None,
            size: Dimensions {
                width: 2.0,
                height: 0.5,
            },
            parts: vec![
                Part {
                    name: "bolt".to_string(),
                    qty: 4,
                },
                Part {
                    name: "nut".to_string(),
                    qty: 4,
                },
            ],
            released: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
            cache: Vec::new(),
        }
    }

    fn prototype() -> Self {
        Self {
            name: String::new(),
            price: 0.0,
            active: false,
            parts: Vec::new(),
            ..Self::named(0, "")
        }
    }
}

#[derive(Default)]
struct StoreState {
    rows: Vec<Widget>,
    next_id: u64,
}

/// In-memory widget table with ids starting at 1.
#[derive(Default)]
pub struct WidgetStore {
    state: RwLock<StoreState>,
}

impl WidgetStore {
    pub fn with_names(names: &[&str]) -> Self {
        let rows: Vec<Widget> = names
            .iter()
            .zip(1..)
            .map(|(name, id)| Widget::named(id, name))
            .collect();
        let next_id = rows.len() as u64 + 1;
        Self {
            state: RwLock::new(StoreState { rows, next_id }),
        }
    }

    pub fn with_count(count: usize) -> Self {
        let names: Vec<String> = (1..=count).map(|i| format!("widget {i:03}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        Self::with_names(&refs)
    }

    pub async fn find(&self, id: u64) -> Option<Widget> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .find(|w| w.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    async fn sorted(&self, sort: Option<&SortOrder>) -> Vec<Widget> {
        let mut rows = self.state.read().await.rows.clone();
        if let Some(sort) = sort {
            match sort.field.as_str() {
                "Name" => rows.sort_by(|a, b| a.name.cmp(&b.name)),
                "Price" => rows.sort_by(|a, b| a.price.total_cmp(&b.price)),
                _ => rows.sort_by_key(|w| w.id),
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

fn page_of(rows: Vec<Widget>, page_size: usize, page: usize) -> Records {
    rows.into_iter()
        .skip(page * page_size)
        .take(page_size)
        .map(|w| Box::new(w) as Box<dyn Record>)
        .collect()
}

fn apply(widget: &mut Widget, values: &FormData) -> StoreResult<()> {
    if let Some(name) = values.get("Name") {
        if name.is_empty() {
            return Err(StoreError::other("Name must not be empty"));
        }
        widget.name = name.to_string();
    }
    if let Some(price) = values.get("Price") {
        widget.price = price
            .parse()
            .map_err(|_| StoreError::other("Price must be a number"))?;
    }
    if let Some(active) = values.get("Active") {
        widget.active = active == "true";
    }
    if let Some(note) = values.get("Note") {
        widget.note = (!note.is_empty()).then(|| note.to_string());
    }
    Ok(())
}

impl Accessor for WidgetStore {
    fn prototype(&self) -> Box<dyn Record> {
        Box::new(Widget::prototype())
    }

    fn get<'a>(&'a self, pk: &'a str) -> BoxFuture<'a, StoreResult<Box<dyn Record>>> {
        Box::pin(async move {
            let id = parse_id(pk)?;
            self.find(id)
                .await
                .map(|w| Box::new(w) as Box<dyn Record>)
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
            let mut state = self.state.write().await;
            if pk.is_empty() {
                let mut widget = Widget::prototype();
                apply(&mut widget, values)?;
                widget.id = state.next_id;
                state.next_id += 1;
                let id = widget.id;
                state.rows.push(widget);
                return Ok(id.to_string());
            }
            let id = parse_id(pk)?;
            let widget = state
                .rows
                .iter_mut()
                .find(|w| w.id == id)
                .ok_or(StoreError::NotFound)?;
            apply(widget, values)?;
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
                .position(|w| w.id == id)
                .ok_or(StoreError::NotFound)?;
            state.rows.remove(index);
            Ok(())
        })
    }
}

/// Case-insensitive substring search on widget names.
pub struct WidgetSearch(pub Arc<WidgetStore>);

impl Searcher for WidgetSearch {
    fn placeholder(&self) -> &str {
        "Search widgets"
    }

    fn search<'a>(
        &'a self,
        page_size: usize,
        page: usize,
        query: &'a str,
        sort: Option<&'a SortOrder>,
    ) -> BoxFuture<'a, StoreResult<(Records, usize)>> {
        Box::pin(async move {
            let needle = query.to_lowercase();
            let matches: Vec<Widget> = self
                .0
                .sorted(sort)
                .await
                .into_iter()
                .filter(|w| w.name.to_lowercase().contains(&needle))
                .collect();
            let total = matches.len();
            Ok((page_of(matches, page_size, page), total))
        })
    }
}

/// Grants privileges by the `X-Role` header: `admin` may do everything,
/// `viewer` may only read. Any other value is not logged in.
pub struct HeaderAuth;

impl Authenticator for HeaderAuth {
    fn is_logged_in_as_admin<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, bool> {
        Box::pin(async move { matches!(req.get_header("X-Role"), Some("admin" | "viewer")) })
    }

    fn has_privilege<'a>(
        &'a self,
        req: &'a Request,
        _model: &'a str,
        op: Operation,
        _ids: &'a [String],
    ) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            match req.get_header("X-Role") {
                Some("admin") => true,
                Some("viewer") => op == Operation::Read,
                _ => false,
            }
        })
    }
}

pub fn widget_admin(store: Arc<WidgetStore>) -> ModelAdmin {
    ModelAdmin::new("Widget", store.clone())
        .pk_field("ID")
        .list_fields(&["ID", "Name", "Price"])
        .readonly_fields(&["ID"])
        .omit_fields(&["Released"])
        .field_note("Price", "Unit price in euros")
        .searcher(Arc::new(WidgetSearch(store.clone())))
        .action(AdminAction::delete_selected(store))
}

pub fn widget_site(store: Arc<WidgetStore>) -> AdminSite {
    AdminSite::new(AdminConfig::default().brand("Widget Works").page_size(10))
        .register(widget_admin(store))
}
