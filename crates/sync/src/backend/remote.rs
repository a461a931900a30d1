// Remote table backend over a PostgREST-style HTTP interface.

use std::time::Duration;

use async_trait::async_trait;
use lexflow_common::mapper::{RemoteMapped, RemoteRow};
use lexflow_common::types::Record;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{Backend, BackendError};
use crate::selector::{BackendKind, RemoteTarget};

#[derive(Debug, Clone)]
pub struct RemoteTableBackend {
    http: Client,
    target: RemoteTarget,
}

impl RemoteTableBackend {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(target: RemoteTarget) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("lexflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| BackendError::Transport(error.to_string()))?;
        Ok(Self { http, target })
    }

    fn table_url(&self, table: &str) -> Result<Url, BackendError> {
        let mut url = self.target.url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::Decode(format!("`{}` cannot be a base url", self.target.url)))?
            .pop_if_empty()
            .extend(["rest", "v1", table]);
        Ok(url)
    }

    fn row_url(&self, table: &str, id: &str) -> Result<Url, BackendError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.target.key).bearer_auth(&self.target.key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = self.authorized(request).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Http { status: status.as_u16(), body })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> BackendError {
    if error.is_decode() {
        BackendError::Decode(error.to_string())
    } else {
        BackendError::Transport(error.to_string())
    }
}

async fn rows(response: Response) -> Result<Vec<Value>, BackendError> {
    response.json::<Vec<Value>>().await.map_err(|error| BackendError::Decode(error.to_string()))
}

#[async_trait]
impl Backend for RemoteTableBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn load_all<R: RemoteMapped>(&self) -> Result<Vec<R>, BackendError> {
        let table = R::KIND.table();
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", "*").append_pair("order", "created_at.asc");

        let response = self.send(self.http.get(url)).await?;
        let records: Vec<R> = rows(response).await?.iter().map(R::from_remote_row).collect();
        debug!(table, records = records.len(), "remote collection loaded");
        Ok(records)
    }

    async fn insert<R: RemoteMapped>(&self, record: R) -> Result<R, BackendError> {
        let table = R::KIND.table();
        let row: RemoteRow = R::to_remote_row(&record.to_patch());
        let request = self
            .http
            .post(self.table_url(table)?)
            .header("Prefer", "return=representation")
            .json(&row);

        let response = self.send(request).await?;
        let inserted = rows(response)
            .await?
            .first()
            .map(R::from_remote_row)
            .ok_or_else(|| BackendError::Decode(format!("insert into `{table}` returned no row")))?;
        debug!(table, id = inserted.id(), "remote row inserted");
        Ok(inserted)
    }

    async fn update<R: RemoteMapped>(&self, id: &str, patch: &R::Patch) -> Result<(), BackendError> {
        let table = R::KIND.table();
        let row = R::to_remote_row(patch);
        if row.is_empty() {
            return Ok(());
        }
        self.send(self.http.patch(self.row_url(table, id)?).json(&row)).await?;
        debug!(table, id, fields = row.len(), "remote row updated");
        Ok(())
    }

    async fn delete<R: RemoteMapped>(&self, id: &str) -> Result<(), BackendError> {
        let table = R::KIND.table();
        self.send(self.http.delete(self.row_url(table, id)?)).await?;
        debug!(table, id, "remote row deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(url: &str) -> RemoteTableBackend {
        RemoteTableBackend::new(RemoteTarget {
            url: Url::parse(url).expect("valid url"),
            key: "anon".into(),
        })
        .expect("client should build")
    }

    #[test]
    fn table_urls_extend_the_configured_path() {
        let plain = backend("https://xyz.example.co");
        assert_eq!(
            plain.table_url("cases").expect("url").as_str(),
            "https://xyz.example.co/rest/v1/cases"
        );

        let proxied = backend("https://gateway.example.co/practice/");
        assert_eq!(
            proxied.table_url("tasks").expect("url").as_str(),
            "https://gateway.example.co/practice/rest/v1/tasks"
        );
    }

    #[test]
    fn row_urls_filter_by_id() {
        let url = backend("https://xyz.example.co").row_url("clients", "42").expect("url");
        assert_eq!(url.as_str(), "https://xyz.example.co/rest/v1/clients?id=eq.42");
    }
}
