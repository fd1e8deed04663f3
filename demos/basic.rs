//! Minimal portico service — an in-memory widget store behind the standard
//! pipeline.
//!
//! Run with:
//!   RUST_LOG=info LISTEN_ADDR=127.0.0.1:3000 cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/widgets/1
//!   curl -X POST http://localhost:3000/widgets \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"sprocket"}'
//!   curl -X PUT http://localhost:3000/widgets/1 -d '{"name":"cog"}'
//!   curl -X DELETE http://localhost:3000/widgets/1
//!   curl -i -X OPTIONS http://localhost:3000/widgets

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use http::StatusCode;
use portico::{App, Fault, Request, Response, Router, Server};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Deserialize, Serialize)]
struct Widget {
    #[serde(default)]
    id: u64,
    name: String,
}

/// Shared across requests; the lock is the store's own business.
#[derive(Clone, Default)]
struct Store(Arc<RwLock<BTreeMap<u64, Widget>>>);

impl Store {
    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<u64, Widget>>, Fault> {
        self.0.read().map_err(|_| Fault::new("store poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<u64, Widget>>, Fault> {
        self.0.write().map_err(|_| Fault::new("store poisoned"))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:80".to_owned());

    let app = App::new(Store::default())
        .routes(widget_routes)
        .routes(default_routes);

    Server::bind(&addr)?.serve(app.pipeline()).await?;
    Ok(())
}

fn widget_routes(router: Router, store: &Store) -> Router {
    let (get, create, update, delete) = (store.clone(), store.clone(), store.clone(), store.clone());
    router
        .get("/widgets/{id}", move |req: Request| get_widget(get.clone(), req))
        .post("/widgets", move |req: Request| create_widget(create.clone(), req))
        .put("/widgets/{id}", move |req: Request| update_widget(update.clone(), req))
        .delete("/widgets/{id}", move |req: Request| delete_widget(delete.clone(), req))
}

/// Anything unmatched gets a JSON 404.
fn default_routes(router: Router, _store: &Store) -> Router {
    router.fallback(|_req: Request| async {
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .json(r#"{"error":"not found"}"#)
    })
}

fn id(req: &Request) -> Result<u64, Fault> {
    Ok(req.param("id").unwrap_or_default().parse()?)
}

// GET /widgets/{id}
async fn get_widget(store: Store, req: Request) -> Result<Response, Fault> {
    let id = id(&req)?;
    let widget = store.read()?.get(&id).cloned();
    match widget {
        Some(widget) => Ok(Response::json(serde_json::to_vec(&widget)?)),
        None => Ok(Response::status(StatusCode::NOT_FOUND)),
    }
}

// POST /widgets → 201
async fn create_widget(store: Store, req: Request) -> Result<Response, Fault> {
    let mut widget: Widget = req.json()?;
    {
        let mut widgets = store.write()?;
        widget.id = widgets.keys().next_back().map_or(1, |last| last + 1);
        widgets.insert(widget.id, widget.clone());
    }
    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("location", &format!("/widgets/{}", widget.id))
        .json(serde_json::to_vec(&widget)?))
}

// PUT /widgets/{id}
async fn update_widget(store: Store, req: Request) -> Result<Response, Fault> {
    let id = id(&req)?;
    let mut widget: Widget = req.json()?;
    widget.id = id;
    let mut widgets = store.write()?;
    match widgets.get_mut(&id) {
        Some(slot) => {
            *slot = widget.clone();
            Ok(Response::json(serde_json::to_vec(&widget)?))
        }
        None => Ok(Response::status(StatusCode::NOT_FOUND)),
    }
}

// DELETE /widgets/{id}
async fn delete_widget(store: Store, req: Request) -> Result<Response, Fault> {
    let id = id(&req)?;
    match store.write()?.remove(&id) {
        Some(widget) => Ok(Response::json(serde_json::to_vec(&widget)?)),
        None => Ok(Response::status(StatusCode::NOT_FOUND)),
    }
}
