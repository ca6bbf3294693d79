//! In-memory product catalog backing the demo admin.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crudmin::{
    selected_ids, Accessor, ActionResult, AdminAction, BoxFuture, FormData, Record, Records,
    Searcher, SortOrder, StoreError, StoreResult,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Record)]
pub struct Supplier {
    #[record(rename = "Name")]
    pub name: String,
    #[record(rename = "Email")]
    pub email: String,
}

#[derive(Debug, Clone, Default, Record)]
pub struct Variant {
    #[record(rename = "SKU")]
    pub sku: String,
    #[record(rename = "Stock")]
    pub stock: u32,
}

#[derive(Debug, Clone, Record)]
pub struct Product {
    #[record(rename = "ID")]
    pub id: u64,
    #[record(rename = "Name")]
    pub name: String,
    #[record(rename = "Price")]
    pub price: f64,
    #[record(rename = "Available")]
    pub available: bool,
    #[record(rename = "Description")]
    pub description: Option<String>,
    #[record(rename = "Supplier")]
    pub supplier: Supplier,
    #[record(rename = "Variants")]
    pub variants: Vec<Variant>,
    #[record(rename = "Created", display)]
    pub created: DateTime<Utc>,
}

impl Product {
    fn blank() -> Self {
        Self {
            id: 0,
            name: String::new(),
            price: 0.0,
            available: true,
            description: None,
            supplier: Supplier::default(),
            variants: Vec::new(),
            created: Utc::now(),
        }
    }

    /// Applies submitted values. Keys name top-level fields or dotted paths
    /// into the supplier and variants.
    fn apply(&mut self, values: &FormData) -> StoreResult<()> {
        for (key, submitted) in values.iter() {
            let value = submitted.first().map_or("", String::as_str);
            match key.split('.').collect::<Vec<_>>().as_slice() {
                ["Name"] => {
                    if value.trim().is_empty() {
                        return Err(StoreError::other("Name must not be empty"));
                    }
                    self.name = value.trim().to_string();
                }
                ["Price"] => {
                    self.price = value
                        .parse()
                        .map_err(|_| StoreError::other(format!("invalid price: {value}")))?;
                    if self.price < 0.0 {
                        return Err(StoreError::other("Price must not be negative"));
                    }
                }
                ["Available"] => self.available = value == "true",
                ["Description"] => {
                    self.description = (!value.is_empty()).then(|| value.to_string());
                }
                ["Supplier", "Name"] => self.supplier.name = value.to_string(),
                ["Supplier", "Email"] => self.supplier.email = value.to_string(),
                ["Variants", index, field] => {
                    let variant = index
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| self.variants.get_mut(i))
                        .ok_or_else(|| StoreError::other(format!("no variant {index}")))?;
                    match *field {
                        "SKU" => variant.sku = value.to_string(),
                        "Stock" => {
                            variant.stock = value
                                .parse()
                                .map_err(|_| StoreError::other(format!("invalid stock: {value}")))?;
                        }
                        _ => tracing::debug!(key = %key, "ignoring unknown variant field"),
                    }
                }
                _ => tracing::debug!(key = %key, "ignoring unknown field"),
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Catalog {
    products: Vec<Product>,
    next_id: u64,
}

/// Product table held in memory for the lifetime of the process.
#[derive(Default)]
pub struct ProductStore {
    catalog: RwLock<Catalog>,
}

impl ProductStore {
    /// Creates a store seeded with a few products.
    pub fn seeded() -> Self {
        let products = vec![
            sample(1, "Brass gear", 4.5, "Acme Metals", &[("BG-S", 120), ("BG-L", 40)]),
            sample(2, "Steel spring", 0.75, "Coil & Co", &[("SS-10", 900)]),
            sample(3, "Copper washer", 0.1, "Acme Metals", &[]),
            sample(4, "Drive belt", 12.0, "Beltway", &[("DB-1", 15), ("DB-2", 3)]),
        ];
        let next_id = products.len() as u64 + 1;
        Self {
            catalog: RwLock::new(Catalog { products, next_id }),
        }
    }

    async fn sorted(&self, sort: Option<&SortOrder>) -> Vec<Product> {
        let mut products = self.catalog.read().await.products.clone();
        if let Some(sort) = sort {
            match sort.field.as_str() {
                "Name" => products.sort_by(|a, b| a.name.cmp(&b.name)),
                "Price" => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
                "Available" => products.sort_by_key(|p| p.available),
                _ => products.sort_by_key(|p| p.id),
            }
            if !sort.ascending {
                products.reverse();
            }
        }
        products
    }

    async fn set_available(&self, ids: &[String], available: bool) -> StoreResult<usize> {
        let mut catalog = self.catalog.write().await;
        let mut changed = 0;
        for pk in ids {
            let id = parse_id(pk)?;
            let product = catalog
                .products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(StoreError::NotFound)?;
            product.available = available;
            changed += 1;
        }
        Ok(changed)
    }
}

fn sample(id: u64, name: &str, price: f64, supplier: &str, variants: &[(&str, u32)]) -> Product {
    Product {
        id,
        name: name.to_string(),
        price,
        supplier: Supplier {
            name: supplier.to_string(),
            email: format!("orders@{}.example", supplier.split(' ').next().unwrap_or("shop").to_lowercase()),
        },
        variants: variants
            .iter()
            .map(|(sku, stock)| Variant {
                sku: (*sku).to_string(),
                stock: *stock,
            })
            .collect(),
        ..Product::blank()
    }
}

fn parse_id(pk: &str) -> StoreResult<u64> {
    pk.parse().map_err(|_| StoreError::InvalidId)
}

fn page_of(products: Vec<Product>, page_size: usize, page: usize) -> Records {
    products
        .into_iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .map(|p| Box::new(p) as Box<dyn Record>)
        .collect()
}

impl Accessor for ProductStore {
    fn prototype(&self) -> Box<dyn Record> {
        Box::new(Product::blank())
    }

    fn get<'a>(&'a self, pk: &'a str) -> BoxFuture<'a, StoreResult<Box<dyn Record>>> {
        Box::pin(async move {
            let id = parse_id(pk)?;
            self.catalog
                .read()
                .await
                .products
                .iter()
                .find(|p| p.id == id)
                .map(|p| Box::new(p.clone()) as Box<dyn Record>)
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
        Box::pin(async move { Ok(self.catalog.read().await.products.len()) })
    }

    fn upsert<'a>(&'a self, pk: &'a str, values: &'a FormData) -> BoxFuture<'a, StoreResult<String>> {
        Box::pin(async move {
            let mut catalog = self.catalog.write().await;
            if pk.is_empty() {
                let mut product = Product::blank();
                product.apply(values)?;
                if product.name.is_empty() {
                    return Err(StoreError::other("Name must not be empty"));
                }
                product.id = catalog.next_id;
                catalog.next_id += 1;
                let id = product.id;
                catalog.products.push(product);
                return Ok(id.to_string());
            }

            let id = parse_id(pk)?;
            let product = catalog
                .products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(StoreError::NotFound)?;
            // Validate on a copy so a rejected submission leaves the row intact.
            let mut updated = product.clone();
            updated.apply(values)?;
            *product = updated;
            Ok(id.to_string())
        })
    }

    fn delete<'a>(&'a self, pk: &'a str) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let id = parse_id(pk)?;
            let mut catalog = self.catalog.write().await;
            let index = catalog
                .products
                .iter()
                .position(|p| p.id == id)
                .ok_or(StoreError::NotFound)?;
            catalog.products.remove(index);
            Ok(())
        })
    }
}

/// Case-insensitive name and supplier search.
pub struct ProductSearch(pub Arc<ProductStore>);

impl Searcher for ProductSearch {
    fn placeholder(&self) -> &str {
        "Search by product or supplier"
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
            let matches: Vec<Product> = self
                .0
                .sorted(sort)
                .await
                .into_iter()
                .filter(|p| {
                    p.name.to_lowercase().contains(&needle)
                        || p.supplier.name.to_lowercase().contains(&needle)
                })
                .collect();
            let total = matches.len();
            Ok((page_of(matches, page_size, page), total))
        })
    }
}

/// Bulk action flagging the selected products as unavailable.
pub fn mark_unavailable(store: Arc<ProductStore>) -> AdminAction {
    AdminAction::new("mark_unavailable", "Mark unavailable", move |form| {
        let store = Arc::clone(&store);
        async move {
            let ids = selected_ids(&form);
            if ids.is_empty() {
                return ActionResult::error("No items selected.");
            }
            match store.set_available(&ids, false).await {
                Ok(changed) => {
                    ActionResult::success(format!("Marked {changed} product(s) unavailable"), changed)
                }
                Err(err) => ActionResult::error(err.to_string()),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_nested_paths() {
        let store = ProductStore::seeded();
        let values = FormData::parse("Supplier.Name=Gearworks&Variants.1.Stock=7&Price=5");
        let pk = store.upsert("1", &values).await.unwrap();
        assert_eq!(pk, "1");

        let catalog = store.catalog.read().await;
        let product = &catalog.products[0];
        assert_eq!(product.supplier.name, "Gearworks");
        assert_eq!(product.variants[1].stock, 7);
        assert!((product.price - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_row() {
        let store = ProductStore::seeded();
        let values = FormData::parse("Name=Renamed&Price=-1");
        let err = store.upsert("2", &values).await.unwrap_err();
        assert_eq!(err, StoreError::other("Price must not be negative"));
        assert_eq!(store.catalog.read().await.products[1].name, "Steel spring");
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let store = ProductStore::seeded();
        let err = store.upsert("", &FormData::parse("Price=1")).await.unwrap_err();
        assert_eq!(err, StoreError::other("Name must not be empty"));

        let pk = store.upsert("", &FormData::parse("Name=Pulley")).await.unwrap();
        assert_eq!(pk, "5");
    }

    #[tokio::test]
    async fn test_search_matches_supplier() {
        let store = Arc::new(ProductStore::seeded());
        let search = ProductSearch(store);
        let (rows, total) = search.search(10, 0, "acme", None).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_unavailable() {
        let store = Arc::new(ProductStore::seeded());
        let action = mark_unavailable(store.clone());
        let result = action
            .execute(FormData::parse("_selected=1&_selected=3"))
            .await;
        assert_eq!(result.affected_count, 2);
        assert!(!store.catalog.read().await.products[2].available);
    }
}
