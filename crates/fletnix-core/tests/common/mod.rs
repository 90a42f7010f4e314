#![allow(dead_code)]

use std::sync::Arc;

use fletnix_core::{
    BrowseController, CatalogClient, ClientConfig, DetailController, FletnixClient,
    MemorySessionStore, Session, WatchlistClient,
};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const EMAIL: &str = "jane@example.com";

pub struct Fixture {
    pub server: MockServer,
    pub client: Arc<FletnixClient>,
}

impl Fixture {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let client = FletnixClient::with_config(ClientConfig::with_base_url(server.uri()))
            .expect("client for mock server");
        Self {
            server,
            client: Arc::new(client),
        }
    }

    pub fn browse(&self, session: Session) -> BrowseController {
        BrowseController::new(
            CatalogClient::new(self.client.clone()),
            WatchlistClient::new(self.client.clone()),
            session,
            15,
        )
    }

    pub fn detail(&self, session: Session) -> DetailController {
        DetailController::new(
            CatalogClient::new(self.client.clone()),
            WatchlistClient::new(self.client.clone()),
            session,
        )
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

pub fn session_for(email: &str, age: u32) -> Session {
    let record = json!({"message": "Login successful", "email": email, "age": age}).to_string();
    Session::new(Arc::new(MemorySessionStore::with_record(record)))
}

pub fn show(id: &str, title: &str, kind: &str) -> Value {
    json!({
        "show_id": id,
        "title": title,
        "type": kind,
        "rating": "TV-MA",
        "date_added": "September 25, 2021"
    })
}

pub fn titles_page(total: u64, page: u32, data: Vec<Value>) -> Value {
    json!({"total": total, "page": page, "limit": 15, "data": data})
}
