//! HTTP-based Swagger document loader

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::loader::SpecLoader;
use super::parser::SwaggerParser;
use super::types::SwaggerDocument;
use crate::core::error::{Error, Result};

/// Loads Swagger documents from HTTP/HTTPS URLs
pub struct HttpSpecLoader {
    client: Client,
}

impl HttpSpecLoader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| Error::load(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SpecLoader for HttpSpecLoader {
    async fn load(&self, source: &str) -> Result<SwaggerDocument> {
        let url = Url::parse(source)
            .map_err(|e| Error::load(format!("Invalid document URL '{source}': {e}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::load(format!(
                "HttpSpecLoader only handles HTTP(S) URLs, got: {source}"
            )));
        }

        debug!("HttpSpecLoader: fetching {url}");
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            Error::load(format!("Failed to fetch Swagger document from {url}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::load(format!("HTTP {status} when fetching {url}")));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let content = response
            .text()
            .await
            .map_err(|e| Error::load(format!("Failed to read response body: {e}")))?;

        // The content type wins over the URL suffix
        let hint = if content_type.contains("json") {
            "document.json"
        } else if content_type.contains("yaml") {
            "document.yaml"
        } else {
            url.path()
        };
        let value = SwaggerParser::decode(&content, hint)?;
        SwaggerParser::new(value).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_http_loader_json() {
        let mock_server = MockServer::start().await;

        let spec_json = r#"{
            "swagger": "2.0",
            "info": { "title": "Test API", "version": "1.0.0" },
            "paths": {}
        }"#;

        Mock::given(method("GET"))
            .and(path("/swagger.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(spec_json)
                    .insert_header("content-type", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let loader = HttpSpecLoader::new().unwrap();
        let url = format!("{}/swagger.json", mock_server.uri());
        let document = loader.load(&url).await.unwrap();

        assert_eq!(document.swagger, "2.0");
        assert_eq!(document.info.title, "Test API");
    }

    #[tokio::test]
    async fn test_http_loader_yaml() {
        let mock_server = MockServer::start().await;

        let spec_yaml = "swagger: '2.0'\ninfo:\n  title: Test API\n  version: 1.0.0\npaths: {}";

        Mock::given(method("GET"))
            .and(path("/swagger.yaml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(spec_yaml)
                    .insert_header("content-type", "application/x-yaml"),
            )
            .mount(&mock_server)
            .await;

        let loader = HttpSpecLoader::new().unwrap();
        let url = format!("{}/swagger.yaml", mock_server.uri());
        let document = loader.load(&url).await.unwrap();
        assert_eq!(document.info.title, "Test API");
    }

    #[tokio::test]
    async fn test_http_loader_404() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/notfound"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let loader = HttpSpecLoader::new().unwrap();
        let url = format!("{}/notfound", mock_server.uri());

        match loader.load(&url).await {
            Err(Error::Load(msg)) => assert!(msg.contains("HTTP 404")),
            other => panic!("Expected Load error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_loader_non_http_url() {
        let loader = HttpSpecLoader::new().unwrap();

        match loader.load("file:///path/to/swagger.yaml").await {
            Err(Error::Load(msg)) => assert!(msg.contains("only handles HTTP")),
            other => panic!("Expected Load error, got {other:?}"),
        }
    }
}
