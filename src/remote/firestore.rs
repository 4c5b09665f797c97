// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cloud Firestore over its REST v1 API.

use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use std::time::Duration;

use super::{Document, DocumentStore};
use crate::error::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: &str = "300";

const UA: &str = concat!(
    "pocketledger/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/pocketledger)"
);

#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: reqwest::Client,
    documents_url: String,
    id_token: Option<String>,
}

impl FirestoreClient {
    pub fn new(
        api_base: &str,
        project_id: &str,
        id_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(UA)
            .build()?;
        Ok(Self {
            client,
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                api_base.trim_end_matches('/'),
                project_id
            ),
            id_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.documents_url, path.trim_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let req = self.client.request(method, self.url(path));
        match &self.id_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[derive(Deserialize)]
struct WireDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    documents: Vec<WireDocument>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!("Firestore error response ({}): {}", status, body);
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(e) if !e.error.status.is_empty() => format!("{}: {}", e.error.status, e.error.message),
        Ok(e) => e.error.message,
        Err(_) => body,
    };
    Err(Error::remote(format!("{} {}", status.as_u16(), message)))
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get(&self, path: &str) -> Result<Option<Document>> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let doc: WireDocument = check(response).await?.json().await?;
        Ok(Some(decode_fields(&doc.fields)))
    }

    async fn set(&self, path: &str, fields: Document) -> Result<()> {
        let mask: Vec<(&str, &str)> = fields
            .keys()
            .map(|k| ("updateMask.fieldPaths", k.as_str()))
            .collect();
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .request(reqwest::Method::PATCH, path)
            .query(&mask)
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        debug!("Firestore merge-write {} ({} fields)", path, fields.len());
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(reqwest::Method::DELETE, path).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }

    async fn list_collection(&self, path: &str) -> Result<Vec<Document>> {
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut req = self
                .request(reqwest::Method::GET, path)
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }
            let page: ListPage = check(req.send().await?).await?.json().await?;
            out.extend(page.documents.iter().map(|d| decode_fields(&d.fields)));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(out)
    }
}

pub fn encode_fields(fields: &Document) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

pub fn encode_value(v: &Value) -> Value {
    match v {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Document {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

/// Typed Firestore value to plain JSON. Unknown shapes decode to null.
pub fn decode_value(v: &Value) -> Value {
    let Some(obj) = v.as_object() else {
        return Value::Null;
    };
    if let Some(s) = obj.get("stringValue") {
        return s.clone();
    }
    if let Some(b) = obj.get("booleanValue") {
        return b.clone();
    }
    if let Some(i) = obj.get("integerValue") {
        let parsed = match i {
            Value::String(s) => s.parse::<i64>().ok(),
            other => other.as_i64(),
        };
        return parsed.map(Value::from).unwrap_or(Value::Null);
    }
    if let Some(d) = obj.get("doubleValue") {
        return d
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Some(m) = obj.get("mapValue") {
        let fields = m.get("fields").and_then(Value::as_object);
        return Value::Object(fields.map(decode_fields).unwrap_or_default());
    }
    if let Some(a) = obj.get("arrayValue") {
        let values: Vec<Value> = a
            .get("values")
            .and_then(Value::as_array)
            .map(|vs| vs.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    for key in ["timestampValue", "referenceValue", "bytesValue"] {
        if let Some(s) = obj.get(key) {
            return s.clone();
        }
    }
    if let Some(g) = obj.get("geoPointValue") {
        return g.clone();
    }
    Value::Null
}
