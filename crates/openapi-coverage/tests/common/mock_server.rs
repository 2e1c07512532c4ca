use mockito::{Mock, Server};

pub const SHOP_SPEC_JSON: &str = include_str!("../assets/shop-openapi.json");
pub const SHOP_SPEC_YAML: &str = include_str!("../assets/shop-openapi.yaml");

/// Mock server hosting spec documents for fetch tests
///
/// Core infrastructure only - test-specific mock methods are defined
/// directly in the test files that use them.
pub struct MockSpecServer {
    pub server: mockito::ServerGuard,
}

impl MockSpecServer {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        Self { server }
    }

    /// Serve `body` at `path` with the given content type
    pub async fn serve(&mut self, path: &str, content_type: &str, body: &str) -> Mock {
        self.server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", content_type)
            .with_body(body)
            .create_async()
            .await
    }

    /// Absolute URL of `path` on the mock server
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.server.url())
    }
}
