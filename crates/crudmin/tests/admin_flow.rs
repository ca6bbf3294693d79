//! End-to-end admin requests through the router.

mod common;

use std::sync::Arc;

use common::{widget_site, HeaderAuth, WidgetStore};
use crudmin::{HtmlRenderer, JsonRenderer, Request, Response, Router};
use serde_json::Value;

fn json_router(store: &Arc<WidgetStore>) -> Router {
    widget_site(store.clone())
        .into_router(Arc::new(JsonRenderer))
        .unwrap()
}

fn guarded_router(store: &Arc<WidgetStore>) -> Router {
    widget_site(store.clone())
        .authenticator(Arc::new(HeaderAuth))
        .into_router(Arc::new(JsonRenderer))
        .unwrap()
}

fn body_json(res: &Response) -> Value {
    serde_json::from_str(&res.body_string().unwrap()).unwrap()
}

// =============================================================================
// Reading
// =============================================================================

#[tokio::test]
async fn test_index_lists_counts() {
    let store = Arc::new(WidgetStore::with_names(&["Gear", "Cog", "Spring"]));
    let res = json_router(&store).handle(Request::get("/admin/")).await;

    assert_eq!(res.status, 200);
    let page = body_json(&res);
    assert_eq!(page["page"], "index");
    assert_eq!(page["context"]["brand"], "Widget Works");
    assert_eq!(page["models"][0]["name"], "Widget");
    assert_eq!(page["models"][0]["count"], 3);
    assert_eq!(page["models"][0]["list_url"], "/admin/widget/");
}

#[tokio::test]
async fn test_list_page() {
    let store = Arc::new(WidgetStore::with_count(25));
    let res = json_router(&store)
        .handle(Request::get("/admin/Widget/?page=2&o=-ID"))
        .await;

    assert_eq!(res.status, 200);
    let page = body_json(&res);
    assert_eq!(page["page"], "list");
    assert_eq!(page["listing"]["total"], 25);
    assert_eq!(page["listing"]["window"]["total_pages"], 3);
    assert_eq!(page["listing"]["rows"].as_array().map(Vec::len), Some(5));
    assert_eq!(page["listing"]["rows"][0]["pk"], "5");
}

#[tokio::test]
async fn test_change_form() {
    let store = Arc::new(WidgetStore::with_names(&["Gear"]));
    let res = json_router(&store)
        .handle(Request::get("/admin/widget/1"))
        .await;

    assert_eq!(res.status, 200);
    let page = body_json(&res);
    assert_eq!(page["page"], "change");
    assert_eq!(page["pk"], "1");
    assert_eq!(page["is_new"], false);
    assert_eq!(page["action_url"], "/admin/widget/1");
    assert_eq!(page["widgets"]["Active"], "radio");
    assert_eq!(page["notes"]["Price"], "Unit price in euros");
    assert_eq!(page["values"]["Name"], "Gear");
}

#[tokio::test]
async fn test_create_form_uses_prototype() {
    let store = Arc::new(WidgetStore::default());
    let res = json_router(&store)
        .handle(Request::get("/admin/widget/add"))
        .await;

    assert_eq!(res.status, 200);
    let page = body_json(&res);
    assert_eq!(page["pk"], "add");
    assert_eq!(page["is_new"], true);
    assert_eq!(page["values"]["Name"], "");
}

#[tokio::test]
async fn test_missing_and_malformed_records() {
    let store = Arc::new(WidgetStore::with_names(&["Gear"]));
    let router = json_router(&store);

    let res = router.handle(Request::get("/admin/widget/99")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body_string().as_deref(), Some("Not found."));

    let res = router.handle(Request::get("/admin/widget/abc")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body_string().as_deref(), Some("Invalid ID."));

    let res = router.handle(Request::get("/admin/gadget/")).await;
    assert_eq!(res.status, 404);
}

// =============================================================================
// Writing
// =============================================================================

#[tokio::test]
async fn test_create_redirects_to_list() {
    let store = Arc::new(WidgetStore::with_names(&["Gear"]));
    let res = json_router(&store)
        .handle(Request::post("/admin/widget/add").form_body(&[
            ("Name", "Cog"),
            ("Price", "2.25"),
            ("action", "save"),
        ]))
        .await;

    assert_eq!(res.status, 302);
    assert_eq!(res.get_header("Location"), Some("/admin/widget/"));
    let created = store.find(2).await.unwrap();
    assert_eq!(created.name, "Cog");
    assert!((created.price - 2.25).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_save_and_continue_shows_form_again() {
    let store = Arc::new(WidgetStore::with_names(&["Gear"]));
    let res = json_router(&store)
        .handle(Request::post("/admin/widget/1").form_body(&[
            ("Name", "Big gear"),
            ("action", "save-continue"),
        ]))
        .await;

    assert_eq!(res.status, 200);
    let page = body_json(&res);
    assert_eq!(page["page"], "change");
    assert_eq!(page["message"]["level"], "success");
    assert_eq!(page["values"]["Name"], "Big gear");
}

#[tokio::test]
async fn test_readonly_fields_are_not_written() {
    let store = Arc::new(WidgetStore::with_names(&["Gear"]));
    let res = json_router(&store)
        .handle(Request::post("/admin/widget/1").form_body(&[("ID", "77"), ("Name", "Cog")]))
        .await;

    assert_eq!(res.status, 302);
    let saved = store.find(1).await.unwrap();
    assert_eq!(saved.id, 1);
    assert_eq!(saved.name, "Cog");
}

#[tokio::test]
async fn test_rejected_save_returns_store_message() {
    let store = Arc::new(WidgetStore::with_names(&["Gear"]));
    let res = json_router(&store)
        .handle(Request::post("/admin/widget/1").form_body(&[("Price", "cheap")]))
        .await;

    assert_eq!(res.status, 406);
    assert_eq!(res.body_string().as_deref(), Some("Price must be a number"));
}

#[tokio::test]
async fn test_delete_record() {
    let store = Arc::new(WidgetStore::with_names(&["Gear", "Cog"]));
    let router = json_router(&store);

    let res = router
        .handle(Request::post("/admin/widget/1").form_body(&[("action", "delete")]))
        .await;
    assert_eq!(res.status, 302);
    assert_eq!(store.len().await, 1);

    let res = router
        .handle(Request::post("/admin/widget/1").form_body(&[("action", "delete")]))
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_unknown_change_action() {
    let store = Arc::new(WidgetStore::with_names(&["Gear"]));
    let res = json_router(&store)
        .handle(Request::post("/admin/widget/1").form_body(&[("action", "explode")]))
        .await;

    assert_eq!(res.status, 406);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_bulk_delete_selected() {
    let store = Arc::new(WidgetStore::with_names(&["Gear", "Cog", "Spring"]));
    let res = json_router(&store)
        .handle(Request::post("/admin/widget/").form_body(&[
            ("action", "delete_selected"),
            ("_selected", "1"),
            ("_selected", "3"),
        ]))
        .await;

    assert_eq!(res.status, 200);
    let page = body_json(&res);
    assert_eq!(page["message"]["level"], "success");
    assert_eq!(page["listing"]["total"], 1);
    assert_eq!(page["listing"]["rows"][0]["pk"], "2");
}

#[tokio::test]
async fn test_bulk_action_failure_is_reported() {
    let store = Arc::new(WidgetStore::with_names(&["Gear", "Cog"]));
    let res = json_router(&store)
        .handle(Request::post("/admin/widget/").form_body(&[
            ("action", "delete_selected"),
            ("_selected", "1"),
            ("_selected", "9"),
        ]))
        .await;

    assert_eq!(res.status, 200);
    let page = body_json(&res);
    assert_eq!(page["message"]["level"], "error");
    assert_eq!(store.len().await, 1);
}

// =============================================================================
// Permissions
// =============================================================================

#[tokio::test]
async fn test_anonymous_request_is_denied() {
    let store = Arc::new(WidgetStore::with_names(&["Gear"]));
    let res = guarded_router(&store)
        .handle(Request::get("/admin/widget/"))
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(body_json(&res)["page"], "denied");
}

#[tokio::test]
async fn test_viewer_may_read_but_not_write() {
    let store = Arc::new(WidgetStore::with_names(&["Gear"]));
    let router = guarded_router(&store);

    let res = router
        .handle(Request::get("/admin/widget/1").header("X-Role", "viewer"))
        .await;
    assert_eq!(body_json(&res)["page"], "change");

    let res = router
        .handle(
            Request::post("/admin/widget/1")
                .header("X-Role", "viewer")
                .form_body(&[("Name", "Cog")]),
        )
        .await;
    assert_eq!(res.status, 200);
    let page = body_json(&res);
    assert_eq!(page["page"], "denied");
    assert_eq!(page["message"], "You do not have permission to write widgets.");
    assert_eq!(store.find(1).await.unwrap().name, "Gear");
}

#[tokio::test]
async fn test_admin_may_write() {
    let store = Arc::new(WidgetStore::with_names(&["Gear"]));
    let res = guarded_router(&store)
        .handle(
            Request::post("/admin/widget/1")
                .header("X-Role", "admin")
                .form_body(&[("Name", "Cog")]),
        )
        .await;

    assert_eq!(res.status, 302);
    assert_eq!(store.find(1).await.unwrap().name, "Cog");
}

// =============================================================================
// HTML rendering
// =============================================================================

#[tokio::test]
async fn test_html_list_and_change_pages() {
    let store = Arc::new(WidgetStore::with_names(&["Gear", "Cog"]));
    let router = widget_site(store)
        .into_router(Arc::new(HtmlRenderer))
        .unwrap();

    let res = router.handle(Request::get("/admin/widget/")).await;
    assert_eq!(res.status, 200);
    let html = res.body_string().unwrap();
    assert!(html.to_lowercase().starts_with("<!doctype html>"));
    assert!(html.contains("Widget Works"));
    assert!(html.contains("href=\"/admin/widget/2\""));
    assert!(html.contains("name=\"_selected\""));
    assert!(html.contains("Search widgets"));

    let res = router.handle(Request::get("/admin/widget/1")).await;
    let html = res.body_string().unwrap();
    assert!(html.contains("name=\"Parts.1.Name\""));
    assert!(html.contains("value=\"save-continue\""));
    assert!(!html.contains("name=\"Released\""));
}
