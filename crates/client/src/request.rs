use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use reqwest::Method;

/// Everything needed to issue one API call, independent of any transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Adds the parameter only when a value is present; absent parameters
    /// are left off the query string entirely.
    pub fn query_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(name, v),
            None => self,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("authorization", format!("Bearer {}", token))
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn page(self, page: Page) -> Self {
        self.query_opt("limit", page.limit)
            .query_opt("skip", page.skip)
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Pagination window. `limit = 0` asks the service for every item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
}

impl Page {
    pub fn new(limit: u32, skip: u32) -> Self {
        Self {
            limit: Some(limit),
            skip: Some(skip),
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            skip: None,
        }
    }

    pub fn everything() -> Self {
        Self::limit(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_page_adds_no_parameters() {
        let req = RequestDescriptor::get("/products").page(Page::default());
        assert!(req.query.is_empty());
    }

    #[test]
    fn page_parameters_keep_order() {
        let req = RequestDescriptor::get("/products").page(Page::new(10, 20));
        assert_eq!(
            req.query,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("skip".to_string(), "20".to_string())
            ]
        );
    }

    #[test]
    fn skip_is_omitted_not_null() {
        let req = RequestDescriptor::get("/products").page(Page::limit(5));
        assert_eq!(req.query_value("limit"), Some("5"));
        assert_eq!(req.query_value("skip"), None);
    }

    #[test]
    fn bearer_and_body() {
        let req = RequestDescriptor::post("/auth/refresh")
            .bearer("abc")
            .json(json!({"refreshToken": "r"}));
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.header_value("Authorization"), Some("Bearer abc"));
        assert_eq!(req.body, Some(json!({"refreshToken": "r"})));
    }
}
