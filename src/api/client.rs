//! Request/response access to the compiler backend.
//!
//! Everything that needs the backend talks to it through `CompilerBackend`, so the view and tab
//! state machines can be driven by a scripted backend in tests. `HttpBackend` is the real thing:
//! a blocking `reqwest` client. Calls block the (single) UI thread until the response or the
//! transport failure arrives; there is no cancellation.
use crate::api::errors::TransportError;
use crate::api::wire::{
    AnalysisResult, BuildReport, CompileResponse, ComparisonResult, Envelope, HealthStatus, OptLevel,
    PncResponse,
};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::json;

pub trait CompilerBackend {
    /// `POST /api/compile`
    fn compile(&self, expression: &str) -> Result<CompileResponse, TransportError>;
    /// `POST /api/analyze/build`
    fn build_objects(&self) -> Result<Envelope<BuildReport>, TransportError>;
    /// `GET /api/analyze/object?level=..`
    fn analyze_object(&self, level: OptLevel) -> Result<Envelope<AnalysisResult>, TransportError>;
    /// `GET /api/analyze/optimization`
    fn compare_optimizations(&self) -> Result<Envelope<ComparisonResult>, TransportError>;
    /// `POST /api/analyze/pnc`
    fn analyze_pnc(&self, expression: &str) -> Result<PncResponse, TransportError>;
    /// `GET /api/health`
    fn health(&self) -> Result<HealthStatus, TransportError>;
}

pub struct HttpBackend {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        HttpBackend {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The server answers domain failures with 4xx/5xx and a JSON envelope, so the status code is not
    /// checked: whatever body arrives is decoded.
    fn decode<T: DeserializeOwned>(response: reqwest::blocking::Response) -> Result<T, TransportError> {
        let status = response.status();
        let body = response.text()?;
        debug!("backend answered {} with {} bytes", status, body.len());
        Ok(serde_json::from_str(&body)?)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.url(path);
        info!("GET {}", url);
        Self::decode(self.http.get(&url).send()?)
    }

    fn post<T: DeserializeOwned>(&self, path: &str, body: Option<serde_json::Value>) -> Result<T, TransportError> {
        let url = self.url(path);
        info!("POST {}", url);
        let request = self.http.post(&url);
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };
        Self::decode(request.send()?)
    }
}

impl CompilerBackend for HttpBackend {
    fn compile(&self, expression: &str) -> Result<CompileResponse, TransportError> {
        self.post("/api/compile", Some(json!({ "expression": expression })))
    }

    fn build_objects(&self) -> Result<Envelope<BuildReport>, TransportError> {
        self.post("/api/analyze/build", None)
    }

    fn analyze_object(&self, level: OptLevel) -> Result<Envelope<AnalysisResult>, TransportError> {
        self.get(&format!("/api/analyze/object?level={}", level))
    }

    fn compare_optimizations(&self) -> Result<Envelope<ComparisonResult>, TransportError> {
        self.get("/api/analyze/optimization")
    }

    fn analyze_pnc(&self, expression: &str) -> Result<PncResponse, TransportError> {
        self.post("/api/analyze/pnc", Some(json!({ "expression": expression })))
    }

    fn health(&self) -> Result<HealthStatus, TransportError> {
        self.get("/api/health")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:5000/");
        assert_eq!(backend.base_url(), "http://localhost:5000");
        assert_eq!(backend.url("/api/compile"), "http://localhost:5000/api/compile");
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        // port 9 (discard) on loopback is closed on any sane test machine
        let backend = HttpBackend::new("http://127.0.0.1:9");
        match backend.compile("1+1") {
            Err(TransportError::Unreachable(_)) => {}
            other => panic!("expected transport failure, got {:?}", other),
        }
    }
}
