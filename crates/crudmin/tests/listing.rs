//! List composition: pagination, sorting and search.

mod common;

use std::sync::Arc;

use common::{widget_admin, WidgetStore};
use crudmin::{compose_listing, AdminConfig, ListParams, PageWindow, SortOrder};
use proptest::prelude::*;

fn params(page: usize, query: Option<&str>, sort: Option<&str>) -> ListParams {
    ListParams {
        page,
        query: query.map(str::to_string),
        sort: sort.map(str::to_string),
    }
}

#[tokio::test]
async fn test_empty_store_has_no_pages() {
    let admin = widget_admin(Arc::new(WidgetStore::default()));
    let listing = compose_listing(&admin, &AdminConfig::default(), &params(0, None, None))
        .await
        .unwrap();

    assert_eq!(listing.total, 0);
    assert!(listing.rows.is_empty());
    assert_eq!(listing.window.total_pages, 0);
    assert!(listing.window.pages.is_empty());
}

#[tokio::test]
async fn test_page_count_rounds_up() {
    let admin = widget_admin(Arc::new(WidgetStore::with_count(250)));
    let config = AdminConfig::default().page_size(100);

    let listing = compose_listing(&admin, &config, &params(2, None, None))
        .await
        .unwrap();

    assert_eq!(listing.total, 250);
    assert_eq!(listing.window.total_pages, 3);
    assert_eq!(listing.window.pages, vec![0, 1, 2]);
    assert_eq!(listing.rows.len(), 50);
    assert_eq!(listing.rows[0].pk, "201");
}

#[tokio::test]
async fn test_rows_carry_pk_and_list_cells() {
    let admin = widget_admin(Arc::new(WidgetStore::with_names(&["Gear", "Cog"])));
    let listing = compose_listing(&admin, &AdminConfig::default(), &params(0, None, None))
        .await
        .unwrap();

    let names: Vec<&str> = listing.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["ID", "Name", "Price"]);
    assert_eq!(listing.rows[1].pk, "2");
    assert_eq!(
        listing.rows[1].cell("Name").map(|n| n.value.as_str()),
        Some("Cog")
    );
    assert_eq!(listing.actions[0].identifier, "delete_selected");
    assert!(listing.actions[0].confirm.is_some());
}

#[tokio::test]
async fn test_descending_sort() {
    let admin = widget_admin(Arc::new(WidgetStore::with_names(&["Bravo", "Alpha", "Charlie"])));
    let listing = compose_listing(&admin, &AdminConfig::default(), &params(0, None, Some("-Name")))
        .await
        .unwrap();

    assert_eq!(
        listing.sort,
        Some(SortOrder {
            field: "Name".to_string(),
            ascending: false
        })
    );
    assert!(listing.directions.contains(&("Name".to_string(), -1)));
    assert!(listing.directions.contains(&("Price".to_string(), 0)));
    let pks: Vec<&str> = listing.rows.iter().map(|r| r.pk.as_str()).collect();
    assert_eq!(pks, ["3", "1", "2"]);
}

#[tokio::test]
async fn test_sort_on_unknown_field_is_ignored() {
    let admin = widget_admin(Arc::new(WidgetStore::with_names(&["Bravo", "Alpha"])));
    let listing = compose_listing(&admin, &AdminConfig::default(), &params(0, None, Some("Secret")))
        .await
        .unwrap();

    assert_eq!(listing.sort, None);
    assert!(listing.directions.iter().all(|(_, d)| *d == 0));
    assert_eq!(listing.rows[0].pk, "1");
}

#[tokio::test]
async fn test_search_replaces_count_and_rows() {
    let admin = widget_admin(Arc::new(WidgetStore::with_names(&[
        "Blue gear",
        "Red cog",
        "Green gear",
    ])));
    let listing = compose_listing(&admin, &AdminConfig::default(), &params(0, Some("GEAR"), None))
        .await
        .unwrap();

    assert_eq!(listing.total, 2);
    assert_eq!(listing.query.as_deref(), Some("GEAR"));
    assert_eq!(listing.search_placeholder.as_deref(), Some("Search widgets"));
    let pks: Vec<&str> = listing.rows.iter().map(|r| r.pk.as_str()).collect();
    assert_eq!(pks, ["1", "3"]);
}

#[tokio::test]
async fn test_empty_query_lists_everything() {
    let admin = widget_admin(Arc::new(WidgetStore::with_names(&["Gear", "Cog"])));
    let listing = compose_listing(&admin, &AdminConfig::default(), &params(0, Some(""), None))
        .await
        .unwrap();

    assert_eq!(listing.total, 2);
    assert_eq!(listing.query, None);
}

#[test]
fn test_window_clamps_at_the_end() {
    let window = PageWindow::compute(1000, 10, 8, 98);
    assert_eq!(window.pages, (92..100).collect::<Vec<_>>());
    assert!(window.has_previous());
    assert!(window.has_next());
    assert_eq!(window.last_page(), Some(99));
}

proptest! {
    #[test]
    fn prop_window_is_contiguous_and_in_range(
        count in 0usize..5000,
        page_size in 1usize..200,
        show in 1usize..20,
        page in 0usize..100,
    ) {
        let window = PageWindow::compute(count, page_size, show, page);
        let total_pages = count.div_ceil(page_size);

        prop_assert_eq!(window.total_pages, total_pages);
        prop_assert_eq!(window.pages.len(), show.min(total_pages));
        prop_assert!(window.pages.iter().all(|&p| p < total_pages));
        prop_assert!(window.pages.windows(2).all(|w| w[1] == w[0] + 1));
        if page < total_pages {
            prop_assert!(window.pages.contains(&page));
        }
    }
}
