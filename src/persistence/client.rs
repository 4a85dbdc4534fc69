//! Selection persistence client.
//!
//! Every call is a fresh round-trip; nothing returned here is cached. Callers
//! re-list after each successful mutation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{Operation, PersistenceError};
use super::transport::{Method, Request, Response, Transport};
use crate::constants::SELECTIONS_PATH;
use crate::model::{CreatedSelection, SelectionId, SelectionRecord, StoredSelection};

/// Confirmation returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    #[serde(default)]
    pub message: String,
    pub id: SelectionId,
}

/// Create/list/get/delete/clear against the selection backend.
#[derive(Debug, Clone)]
pub struct SelectionClient<T> {
    transport: T,
}

impl<T: Transport> SelectionClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit a named selection. Returns the server-assigned id.
    pub async fn create(
        &self,
        record: &SelectionRecord,
    ) -> Result<CreatedSelection, PersistenceError> {
        let body = serde_json::to_string(record)?;
        let request = Request::new(Method::Post, SELECTIONS_PATH).with_body(body);
        let response = self.send(Operation::Create, request).await?;
        let created: CreatedSelection = decode(Operation::Create, &response)?;
        log::info!(
            "Selection \"{}\" saved with id {} ({} pixels)",
            record.name,
            created.id,
            record.selection.len()
        );
        Ok(created)
    }

    /// Fetch every stored selection.
    pub async fn try_list(&self) -> Result<Vec<StoredSelection>, PersistenceError> {
        let response = self
            .send(Operation::List, Request::new(Method::Get, SELECTIONS_PATH))
            .await?;
        // The backend answers `null` when nothing was ever saved
        let entries: Option<Vec<serde_json::Value>> = decode(Operation::List, &response)?;
        Ok(entries
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(selection) => Some(selection),
                Err(e) => {
                    log::warn!("Skipping unreadable stored selection #{}: {}", index, e);
                    None
                }
            })
            .collect())
    }

    /// Fetch every stored selection, degrading to an empty list on failure.
    pub async fn list(&self) -> Vec<StoredSelection> {
        match self.try_list().await {
            Ok(selections) => {
                log::debug!("Fetched {} selections", selections.len());
                selections
            }
            Err(e) => {
                log::error!("Failed to list selections: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetch one stored selection by id.
    pub async fn get(&self, id: &SelectionId) -> Result<StoredSelection, PersistenceError> {
        let request = Request::new(Method::Get, SELECTIONS_PATH).with_query("id", id.as_str());
        let response = self.send(Operation::Get, request).await?;
        decode(Operation::Get, &response)
    }

    /// Delete one stored selection. The caller must have confirmed with the user.
    pub async fn delete(&self, id: &SelectionId) -> Result<DeleteConfirmation, PersistenceError> {
        let request = Request::new(Method::Delete, SELECTIONS_PATH).with_query("id", id.as_str());
        let response = self.send(Operation::Delete, request).await?;
        let confirmation = serde_json::from_str(&response.body).unwrap_or_else(|_| {
            DeleteConfirmation {
                message: response.body.trim().to_string(),
                id: id.clone(),
            }
        });
        log::info!("Selection {} deleted", id);
        Ok(confirmation)
    }

    /// Delete every stored selection. The caller must have confirmed with the user.
    pub async fn clear(&self) -> Result<(), PersistenceError> {
        let request =
            Request::new(Method::Delete, SELECTIONS_PATH).with_query("action", "clear");
        self.send(Operation::Clear, request).await?;
        log::info!("All selections deleted");
        Ok(())
    }

    async fn send(
        &self,
        operation: Operation,
        request: Request,
    ) -> Result<Response, PersistenceError> {
        let response = self.transport.send(request).await.map_err(|e| {
            log::error!("{} request failed: {}", operation, e);
            PersistenceError::network(operation, e.0)
        })?;

        if !response.is_success() {
            log::error!(
                "{} request rejected with status {}: {}",
                operation,
                response.status,
                response.body.trim()
            );
            return Err(PersistenceError::request_failed(
                operation,
                response.status,
                response.body.trim(),
            ));
        }
        Ok(response)
    }
}

fn decode<D: DeserializeOwned>(
    operation: Operation,
    response: &Response,
) -> Result<D, PersistenceError> {
    serde_json::from_str(&response.body)
        .map_err(|source| PersistenceError::Decode { operation, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::TransportError;
    use crate::testing::{MemoryBackend, record};
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _request: Request) -> Result<Response, TransportError> {
            Err(TransportError("connection refused".into()))
        }
    }

    struct Fixed(Response);

    #[async_trait]
    impl Transport for Fixed {
        async fn send(&self, _request: Request) -> Result<Response, TransportError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let client = SelectionClient::new(MemoryBackend::new());
        let created = client.create(&record("Test", &[(1, 1), (2, 2)])).await.unwrap();

        let listed = client.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].name, "Test");
    }

    #[tokio::test]
    async fn test_create_failure_is_request_failed() {
        let client = SelectionClient::new(Fixed(Response::new(500, "disk full\n")));
        let err = client.create(&record("Test", &[(0, 0)])).await.unwrap_err();
        match err {
            PersistenceError::RequestFailed {
                operation,
                status,
                message,
            } => {
                assert_eq!(operation, Operation::Create);
                assert_eq!(status, 500);
                assert_eq!(message, "disk full");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_list_degrades_to_empty() {
        let client = SelectionClient::new(Unreachable);
        assert!(client.list().await.is_empty());
        assert!(client.try_list().await.is_err());

        let client = SelectionClient::new(Fixed(Response::new(200, "not json")));
        assert!(client.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_accepts_null() {
        let client = SelectionClient::new(Fixed(Response::new(200, "null")));
        assert!(client.try_list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_keeps_readable_records() {
        let body = r#"[
            {"id": "good", "name": "Good", "timestamp": "2024-05-01T12:00:00Z",
             "bounds": {"minX": 0, "maxX": 0, "minY": 0, "maxY": 0},
             "pixels": [{"x": 0, "y": 0, "color": {"R": 1, "G": 2, "B": 3, "A": 255}}]},
            {"id": "blank_time", "name": "Blank", "timestamp": "",
             "bounds": {"minX": 1, "maxX": 1, "minY": 1, "maxY": 1},
             "pixels": [{"x": 1, "y": 1, "color": {"R": 1, "G": 2, "B": 3, "A": 255}}]},
            {"id": "broken", "name": "Broken"}
        ]"#;
        let client = SelectionClient::new(Fixed(Response::new(200, body)));

        let listed = client.try_list().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["good", "blank_time"]);
        assert!(listed[0].selection.timestamp.is_some());
        assert!(listed[1].selection.timestamp.is_none());
        assert_eq!(client.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let client = SelectionClient::new(MemoryBackend::new());
        let created = client.create(&record("Logo", &[(4, 4)])).await.unwrap();

        let stored = client.get(&created.id).await.unwrap();
        assert_eq!(stored.name, "Logo");
        assert_eq!(stored.pixels().len(), 1);

        let missing = client.get(&SelectionId::new("nope")).await.unwrap_err();
        assert_eq!(missing.status(), Some(404));
    }

    #[tokio::test]
    async fn test_delete_missing_id_fails() {
        let client = SelectionClient::new(MemoryBackend::new());
        client.create(&record("Keep", &[(0, 0)])).await.unwrap();

        let err = client.delete(&SelectionId::new("missing")).await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::RequestFailed { status: 404, .. }
        ));
        assert_eq!(client.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_returns_confirmation() {
        let client = SelectionClient::new(MemoryBackend::new());
        let created = client.create(&record("Gone", &[(0, 0)])).await.unwrap();

        let confirmation = client.delete(&created.id).await.unwrap();
        assert_eq!(confirmation.id, created.id);
        assert!(client.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let client = SelectionClient::new(MemoryBackend::new());
        client.create(&record("A", &[(0, 0)])).await.unwrap();
        client.create(&record("B", &[(1, 0)])).await.unwrap();

        client.clear().await.unwrap();
        assert!(client.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_maps_to_network_error() {
        let client = SelectionClient::new(Unreachable);
        let err = client.delete(&SelectionId::new("x")).await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Network {
                operation: Operation::Delete,
                ..
            }
        ));
    }
}
