//! Hosted table store over a PostgREST endpoint
//!
//! Speaks the REST dialect of a Supabase project: one resource per table
//! under `/rest/v1/`, filters as query parameters, the project key in both
//! the `apikey` and `Authorization` headers.

use async_trait::async_trait;
use colletkit_core::{Bit, BitPatch, Collet, NewBit, NewCollet, StoreError};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;

use crate::mapping::{
    bit_from_row, bit_patch_columns, collet_from_row, is_valid_uuid, new_bit_columns,
    new_collet_columns,
};
use crate::traits::InventoryStore;

const BITS_TABLE: &str = "bits";
const COLLETS_TABLE: &str = "collets";

/// Remote store backed by the hosted `bits` and `collets` tables
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    /// Create a store for a project URL and key
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    async fn send(&self, context: &str, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
        tracing::error!("[Store {}] {}", context, message);
        Err(StoreError::remote(context, message))
    }

    async fn rows(&self, context: &str, builder: RequestBuilder) -> Result<Vec<Value>, StoreError> {
        let response = self.send(context, builder).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn patch_row(
        &self,
        context: &str,
        table: &str,
        id: &str,
        columns: Value,
    ) -> Result<(), StoreError> {
        let builder = self
            .request(Method::PATCH, table)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(&columns);
        self.send(context, builder).await.map(|_| ())
    }

    async fn insert_row(&self, context: &str, table: &str, columns: Value) -> Result<(), StoreError> {
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(&columns);
        self.send(context, builder).await.map(|_| ())
    }
}

/// Human-readable message out of a PostgREST error body
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("message")
            .or_else(|| json.get("details"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(json.to_string())),
        Err(_) => Some(body.to_string()),
    }
}

#[async_trait]
impl InventoryStore for RestStore {
    async fn list_bits(&self) -> Result<Vec<Bit>, StoreError> {
        let builder = self
            .request(Method::GET, BITS_TABLE)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let rows = self.rows("FetchBits", builder).await?;
        Ok(rows.iter().map(bit_from_row).collect())
    }

    async fn list_collets(&self) -> Result<Vec<Collet>, StoreError> {
        let builder = self
            .request(Method::GET, COLLETS_TABLE)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let rows = self.rows("FetchCollets", builder).await?;
        Ok(rows.iter().map(collet_from_row).collect())
    }

    async fn fetch_bit(&self, id: &str) -> Result<Option<Bit>, StoreError> {
        if !is_valid_uuid(id) {
            return Ok(None);
        }
        let builder = self
            .request(Method::GET, BITS_TABLE)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);
        let rows = self.rows("FetchBit", builder).await?;
        Ok(rows.first().map(bit_from_row))
    }

    async fn update_bit(&self, id: &str, patch: &BitPatch) -> Result<(), StoreError> {
        let columns = bit_patch_columns(patch);
        if columns.is_empty() {
            return Ok(());
        }
        self.patch_row("UpdateBit", BITS_TABLE, id, Value::Object(columns))
            .await
    }

    async fn create_bit(&self, bit: &NewBit) -> Result<(), StoreError> {
        self.insert_row("CreateBit", BITS_TABLE, new_bit_columns(bit))
            .await
    }

    async fn update_bit_stock(&self, id: &str, stock: u32) -> Result<(), StoreError> {
        self.patch_row("UpdateStock", BITS_TABLE, id, json!({ "stock": stock }))
            .await
    }

    async fn update_collet_stock(&self, id: &str, stock: u32) -> Result<(), StoreError> {
        self.patch_row(
            "UpdateColletStock",
            COLLETS_TABLE,
            id,
            json!({ "stock": stock }),
        )
        .await
    }

    async fn create_collet(&self, collet: &NewCollet) -> Result<(), StoreError> {
        self.insert_row("CreateCollet", COLLETS_TABLE, new_collet_columns(collet))
            .await
    }
}
