//! The test harness against a small widget API.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use http::{Method, StatusCode};
use portico::testing::{Collect, Harness};
use portico::{App, Fault, Request, Response, Router};
use serde::Deserialize;

mod common;

type Store = Arc<RwLock<HashMap<u64, String>>>;

#[derive(Deserialize)]
struct NewWidget {
    name: String,
}

fn widget_routes(router: Router, store: &Store) -> Router {
    let (show, create, remove) = (store.clone(), store.clone(), store.clone());
    router
        .get("/widgets/{id}", move |req: Request| {
            let store = show.clone();
            async move {
                let id: u64 = req.param("id").unwrap_or_default().parse()?;
                let widgets = store.read().map_err(|_| Fault::new("store poisoned"))?;
                let res = match widgets.get(&id) {
                    Some(name) => Response::json(format!(r#"{{"id":{id},"name":"{name}"}}"#)),
                    None => Response::status(StatusCode::NOT_FOUND),
                };
                Ok::<_, Fault>(res)
            }
        })
        .post("/widgets", move |req: Request| {
            let store = create.clone();
            async move {
                let new: NewWidget = req.json()?;
                let mut widgets = store.write().map_err(|_| Fault::new("store poisoned"))?;
                let id = widgets.len() as u64 + 1;
                widgets.insert(id, new.name);
                Ok::<_, Fault>(
                    Response::builder()
                        .status(StatusCode::CREATED)
                        .json(format!(r#"{{"id":{id}}}"#)),
                )
            }
        })
        .delete("/widgets/{id}", move |req: Request| {
            let store = remove.clone();
            async move {
                let id: u64 = req.param("id").unwrap_or_default().parse()?;
                store.write().map_err(|_| Fault::new("store poisoned"))?.remove(&id);
                Ok::<_, Fault>(Response::json(r#"{"deleted":true}"#))
            }
        })
}

fn broken_routes(router: Router, _store: &Store) -> Router {
    router
        .post("/broken", |_req: Request| async {
            Result::<Response, Fault>::Err(Fault::new("db unavailable"))
        })
        .get("/garbled", |_req: Request| async {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .json("<html>oops</html>")
        })
        .put("/text", |_req: Request| async { Response::text("not json") })
        .get("/plain-500", |_req: Request| async {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .text("oops")
        })
        .get("/blank-fault", |_req: Request| async {
            Result::<Response, Fault>::Err(Fault::new(""))
        })
}

fn app() -> App<Store> {
    App::new(Store::default()).routes(widget_routes).routes(broken_routes)
}

fn seeded() -> App<Store> {
    let app = app();
    app.store().write().unwrap().insert(1, "x".to_owned());
    app
}

#[tokio::test]
async fn get_json_passes() {
    let harness = Harness::new(seeded());
    let res = harness.get_json("/widgets/1", StatusCode::OK).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.content_type(), Some("application/json"));
    assert_eq!(res.text(), r#"{"id":1,"name":"x"}"#);
}

#[tokio::test]
async fn crud_round() {
    let harness = Harness::new(app());

    let created = harness.post_json("/widgets", r#"{"name":"x"}"#, StatusCode::CREATED).await;
    let id: serde_json::Value = created.json().unwrap();
    assert_eq!(id["id"], 1);

    harness.get_json("/widgets/1", StatusCode::OK).await;
    harness.delete_json("/widgets/1", StatusCode::OK).await;
    harness.get("/widgets/1", StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn expected_non_success_passes_through() {
    let harness = Harness::new(app()).with_reporter(Collect::default());
    let res = harness.get("/widgets/404", StatusCode::NOT_FOUND).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(harness.reporter().failures().is_empty());
}

#[tokio::test]
#[should_panic(expected = "db unavailable")]
async fn fault_fails_despite_expectation() {
    let harness = Harness::new(app());
    harness.post_json("/broken", r#"{"name":"x"}"#, StatusCode::CREATED).await;
}

#[tokio::test]
async fn fault_is_reported_even_when_500_expected() {
    let harness = Harness::new(app()).with_reporter(Collect::default());
    let res = harness.post_json("/broken", r#"{"name":"x"}"#, StatusCode::INTERNAL_SERVER_ERROR).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(harness.reporter().failures(), ["response code was 500: db unavailable"]);
}

#[tokio::test]
async fn handler_parse_fault_surfaces_message() {
    let harness = Harness::new(app()).with_reporter(Collect::default());
    harness.post_json("/widgets", "not json", StatusCode::CREATED).await;

    let failures = harness.reporter().take();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("response code was 500: expected ident"), "{failures:?}");
}

#[tokio::test]
async fn undecodable_500_is_a_decode_failure() {
    let harness = Harness::new(app()).with_reporter(Collect::default());
    harness.get_json("/garbled", StatusCode::OK).await;

    let failures = harness.reporter().failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("could not decode response body"), "{failures:?}");
}

#[tokio::test]
async fn handler_plain_text_500_is_a_decode_failure() {
    let harness = Harness::new(app()).with_reporter(Collect::default());
    let res = harness.get_json("/plain-500", StatusCode::OK).await;

    assert_eq!(res.content_type(), Some("text/plain; charset=utf-8"));
    let failures = harness.reporter().failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("could not decode response body"), "{failures:?}");
}

#[tokio::test]
async fn blank_fault_still_has_a_message() {
    let harness = Harness::new(app()).with_reporter(Collect::default());
    let res = harness.get_json("/blank-fault", StatusCode::OK).await;

    assert_eq!(res.text(), r#"{"error":"internal server error"}"#);
    assert_eq!(
        harness.reporter().failures(),
        ["response code was 500: internal server error"],
    );
}

#[tokio::test]
async fn transport_fault_is_not_decoded() {
    let harness = Harness::new(app()).with_reporter(Collect::default());
    let req = common::broken_request(Method::GET, "/widgets/1");
    let res = harness.send(req, StatusCode::OK).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.content_type(), Some("text/plain; charset=utf-8"));
    assert_eq!(res.text(), "Could not read request body");
    assert_eq!(
        harness.reporter().failures(),
        ["response code was 500: Could not read request body"],
    );
}

#[tokio::test]
async fn status_mismatch_is_reported() {
    let harness = Harness::new(seeded()).with_reporter(Collect::default());
    harness.get_json("/widgets/1", StatusCode::CREATED).await;

    assert_eq!(
        harness.reporter().failures(),
        ["unexpected response code: expected 201, got 200"],
    );
}

#[tokio::test]
async fn json_helpers_check_content_type() {
    let harness = Harness::new(app()).with_reporter(Collect::default());
    harness.put_json("/text", r#"{}"#, StatusCode::OK).await;

    let failures = harness.reporter().failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("response content-type was not application/json"));

    // The plain helper only looks at the status.
    harness.reporter().take();
    harness.request(Method::PUT, "/text", bytes::Bytes::new(), StatusCode::OK).await;
    assert!(harness.reporter().failures().is_empty());
}

#[tokio::test]
async fn bad_destination_is_reported() {
    let harness = Harness::new(app()).with_reporter(Collect::default());
    harness.get("/wid gets", StatusCode::OK).await;

    let failures = harness.reporter().failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("could not create new GET /wid gets request"));
}

#[tokio::test]
async fn every_call_gets_cors_headers() {
    let harness = Harness::new(seeded());
    let res = harness.get_json("/widgets/1", StatusCode::OK).await;
    assert_eq!(res.header("access-control-allow-origin"), Some("*"));

    let preflight = harness.request(Method::OPTIONS, "/widgets", bytes::Bytes::new(), StatusCode::OK).await;
    assert!(preflight.body().is_empty());
    assert_eq!(preflight.header("access-control-allow-credentials"), Some("true"));
}

#[tokio::test]
async fn repeated_calls_rebuild_cleanly() {
    let harness = Harness::new(seeded());
    for _ in 0..3 {
        harness.get_json("/widgets/1", StatusCode::OK).await;
    }
}
