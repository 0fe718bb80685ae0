use std::collections::HashMap;

use axum::http::{HeaderMap, Uri};

/// How a call arrived over REST. Services receive it as their params.
///
/// Header names are stored lowercased; non-UTF-8 header values are dropped.
#[derive(Debug, Clone, Default)]
pub struct RestParams {
    pub provider: &'static str,
    pub method: &'static str,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
}

impl RestParams {
    pub const PROVIDER: &'static str = "rest";

    pub fn new(method: &'static str, uri: &Uri, headers: &HeaderMap, query: HashMap<String, String>) -> Self {
        let headers = headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_owned(), value.to_str().ok()?.to_owned())))
            .collect();

        Self {
            provider: Self::PROVIDER,
            method,
            path: uri.path().to_owned(),
            query,
            headers,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }
}

/// Builds a service's params type from [`RestParams`].
pub trait FromRestParams: Sized {
    fn from_rest_params(params: RestParams) -> Self;
}

impl FromRestParams for RestParams {
    fn from_rest_params(params: RestParams) -> Self {
        params
    }
}

impl FromRestParams for () {
    fn from_rest_params(_params: RestParams) -> Self {}
}
