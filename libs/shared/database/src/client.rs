use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::DbError;

/// Thin client over a PostgREST endpoint.
///
/// `query` arguments are raw PostgREST query strings such as
/// `doctor_id=eq.<uuid>&order=start_time.asc`. Callers encode user input
/// with [`ilike`] or `urlencoding::encode`.
#[derive(Clone)]
pub struct DbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DbClient {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_base_url(&config.database_url, &config.database_api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !self.api_key.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&self.api_key) {
                headers.insert("apikey", value);
            }
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    fn request(&self, method: Method, table: &str, query: &str) -> RequestBuilder {
        let url = if query.is_empty() {
            format!("{}/{}", self.base_url, table)
        } else {
            format!("{}/{}?{}", self.base_url, table, query)
        };
        debug!("{} {}", method, url);
        self.client.request(method, url).headers(self.headers())
    }

    async fn send(builder: RequestBuilder) -> Result<Response, DbError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Database API error ({}): {}", status, body);
            return Err(DbError::from_status(status.as_u16(), body));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DbError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to decode database response: {}", e);
            DbError::Decode(e.to_string())
        })
    }

    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &str) -> Result<Vec<T>, DbError> {
        let response = Self::send(self.request(Method::GET, table, query)).await?;
        Self::decode(response).await
    }

    pub async fn select_one<T: DeserializeOwned>(&self, table: &str, query: &str) -> Result<Option<T>, DbError> {
        let query = if query.is_empty() {
            "limit=1".to_string()
        } else {
            format!("{}&limit=1", query)
        };
        let mut rows: Vec<T> = self.select(table, &query).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// Selects one page and the exact total row count.
    pub async fn select_page<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<T>, u64), DbError> {
        let paged = if query.is_empty() {
            format!("limit={}&offset={}", limit, offset)
        } else {
            format!("{}&limit={}&offset={}", query, limit, offset)
        };
        let builder = self
            .request(Method::GET, table, &paged)
            .header("Prefer", "count=exact");
        let response = Self::send(builder).await?;

        let total = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range_total);

        let rows: Vec<T> = Self::decode(response).await?;
        let total = total.unwrap_or(rows.len() as u64 + offset as u64);
        Ok((rows, total))
    }

    pub async fn insert<B, T>(&self, table: &str, body: &B) -> Result<Vec<T>, DbError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::POST, table, "")
            .header("Prefer", "return=representation")
            .json(body);
        let response = Self::send(builder).await?;
        Self::decode(response).await
    }

    pub async fn update<B, T>(&self, table: &str, query: &str, body: &B) -> Result<Vec<T>, DbError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::PATCH, table, query)
            .header("Prefer", "return=representation")
            .json(body);
        let response = Self::send(builder).await?;
        Self::decode(response).await
    }

    /// Deletes matching rows and returns how many were removed.
    pub async fn delete(&self, table: &str, query: &str) -> Result<usize, DbError> {
        let builder = self
            .request(Method::DELETE, table, query)
            .header("Prefer", "return=representation");
        let response = Self::send(builder).await?;
        let rows: Vec<serde_json::Value> = Self::decode(response).await?;
        Ok(rows.len())
    }
}

/// `Content-Range: 0-49/123` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next().and_then(|total| total.trim().parse().ok())
}

/// Percent-encodes a value for use inside a PostgREST filter.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Builds an encoded case-insensitive containment pattern for `ilike`.
pub fn ilike(term: &str) -> String {
    let cleaned: String = term.chars().filter(|c| !matches!(c, ',' | '(' | ')' | '*')).collect();
    format!("*{}*", encode(cleaned.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_total_is_parsed() {
        assert_eq!(parse_content_range_total("0-49/123"), Some(123));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
    }

    #[test]
    fn ilike_strips_reserved_characters() {
        assert_eq!(ilike(" Ali (Khan) "), "*Ali%20Khan*");
    }
}
