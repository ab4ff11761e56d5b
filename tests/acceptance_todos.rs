use axum::body::to_bytes;
use axum::Router;
use listkeeper::application::sessions::SessionRegistry;
use listkeeper::domain::store::Store;
use listkeeper::http::{routing, AppState};
use listkeeper::infrastructure::sqlite_store::SqliteStore;
use serde_json::{json, Value};

#[tokio::test]
async fn acceptance_todo_crud_and_reorder() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;
    let list_id = create_list(&app, &token, "Groceries").await;

    // create three todos
    let mut ids = Vec::new();
    for (title, priority) in [("Buy milk", "low"), ("Call mom", "high"), ("Pay rent", "medium")] {
        let res = request(
            &app,
            "POST",
            &format!("/lists/{list_id}/todos"),
            Some(&token),
            Some(json!({ "title": title, "priority": priority })),
        )
        .await;
        assert_eq!(res.status(), 200);
        ids.push(body(res).await["id"].as_str().unwrap().to_string());
    }

    // unfiltered read comes back in position order
    let res = request(&app, "GET", &format!("/lists/{list_id}/todos"), Some(&token), None).await;
    let items = body(res).await["items"].as_array().unwrap().clone();
    let titles: Vec<&str> = items.iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Buy milk", "Call mom", "Pay rent"]);
    let positions: Vec<i64> = items.iter().map(|t| t["position"].as_i64().unwrap()).collect();
    assert_eq!(positions, vec![0, 1, 2]);

    // move first to last and back
    let res = request(
        &app,
        "PUT",
        &format!("/todos/{}/move", ids[0]),
        Some(&token),
        Some(json!({ "to": 2 })),
    )
    .await;
    assert_eq!(res.status(), 200);
    assert_eq!(body(res).await["position"], 2);
    let res = request(
        &app,
        "PUT",
        &format!("/todos/{}/move", ids[0]),
        Some(&token),
        Some(json!({ "to": 0 })),
    )
    .await;
    assert_eq!(res.status(), 200);
    let res = request(&app, "GET", &format!("/lists/{list_id}/todos"), Some(&token), None).await;
    let items = body(res).await["items"].as_array().unwrap().clone();
    let titles: Vec<&str> = items.iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Buy milk", "Call mom", "Pay rent"]);

    // complete one
    let res = request(
        &app,
        "PUT",
        &format!("/todos/{}", ids[1]),
        Some(&token),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(res.status(), 200);
    assert_eq!(body(res).await["completed"], true);

    // delete re-packs the survivors
    let res = request(&app, "DELETE", &format!("/todos/{}", ids[1]), Some(&token), None).await;
    assert_eq!(res.status(), 204);
    let res = request(&app, "GET", &format!("/lists/{list_id}/todos"), Some(&token), None).await;
    let items = body(res).await["items"].as_array().unwrap().clone();
    let pairs: Vec<(i64, &str)> = items
        .iter()
        .map(|t| (t["position"].as_i64().unwrap(), t["title"].as_str().unwrap()))
        .collect();
    assert_eq!(pairs, vec![(0, "Buy milk"), (1, "Pay rent")]);

    // deleted id is gone
    let res = request(&app, "GET", &format!("/todos/{}", ids[1]), Some(&token), None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn acceptance_filtering() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;
    let list_id = create_list(&app, &token, "Groceries").await;
    for (title, priority) in [
        ("Buy MILK", "high"),
        ("Buy milk jugs", "low"),
        ("Call mom", "high"),
    ] {
        let res = request(
            &app,
            "POST",
            &format!("/lists/{list_id}/todos"),
            Some(&token),
            Some(json!({ "title": title, "priority": priority })),
        )
        .await;
        assert_eq!(res.status(), 200);
    }

    // text match is case-insensitive, predicates are ANDed
    let res = request(
        &app,
        "GET",
        &format!("/lists/{list_id}/todos?q=milk&priority=high"),
        Some(&token),
        None,
    )
    .await;
    let items = body(res).await["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Buy MILK");

    // unrecognized priority in the query string means "no filter"
    let res = request(
        &app,
        "GET",
        &format!("/lists/{list_id}/todos?priority=urgent"),
        Some(&token),
        None,
    )
    .await;
    let items = body(res).await["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 3);

    // ...but an unrecognized priority in a write body is rejected
    let res = request(
        &app,
        "POST",
        &format!("/lists/{list_id}/todos"),
        Some(&token),
        Some(json!({ "title": "X", "priority": "urgent" })),
    )
    .await;
    assert_eq!(res.status(), 422);
}

#[tokio::test]
async fn acceptance_foreign_todos_are_concealed() {
    let app = app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;
    let list_id = create_list(&app, &alice, "Private").await;
    let res = request(
        &app,
        "POST",
        &format!("/lists/{list_id}/todos"),
        Some(&alice),
        Some(json!({ "title": "secret" })),
    )
    .await;
    let todo_id = body(res).await["id"].as_str().unwrap().to_string();

    // Bob sees neither the list's todos nor the todo itself.
    let res = request(&app, "GET", &format!("/lists/{list_id}/todos"), Some(&bob), None).await;
    assert_eq!(res.status(), 404);
    let res = request(&app, "GET", &format!("/todos/{todo_id}"), Some(&bob), None).await;
    assert_eq!(res.status(), 404);
    let res = request(
        &app,
        "PUT",
        &format!("/todos/{todo_id}"),
        Some(&bob),
        Some(json!({ "title": "mine now" })),
    )
    .await;
    assert_eq!(res.status(), 404);
}

async fn app() -> Router {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    store.init().await.unwrap();
    routing::app(AppState::new(store, SessionRegistry::new()))
}

async fn register(app: &Router, email: &str) -> String {
    let res = request(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": email, "password": "hunter2" })),
    )
    .await;
    assert_eq!(res.status(), 200);
    body(res).await["token"].as_str().unwrap().to_string()
}

async fn create_list(app: &Router, token: &str, name: &str) -> String {
    let res = request(app, "POST", "/lists", Some(token), Some(json!({ "name": name }))).await;
    assert_eq!(res.status(), 200);
    body(res).await["id"].as_str().unwrap().to_string()
}

async fn body(res: hyper::Response<axum::body::Body>) -> Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    let mut req = Request::builder()
        .method(Method::from_bytes(method.as_bytes()).unwrap())
        .uri(path);
    if let Some(token) = token {
        req = req.header("x-session-token", token);
    }
    let req = match body {
        Some(json) => req
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}
