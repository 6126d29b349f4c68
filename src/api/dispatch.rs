use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::api::client::ApiRequester;
use crate::api::queue::RequestQueue;
use crate::api::response::ApiResponse;
use crate::store::keys::StoreKey;
use crate::store::reactive::KeyValueStore;

/// How a [`StoreUpdate`] is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    /// Full replacement.
    Set,
    /// Shallow merge.
    Merge,
}

/// One store write in a three-phase update list.
#[derive(Debug, Clone)]
pub struct StoreUpdate {
    /// The key to write.
    pub key: StoreKey,
    /// How to apply the value.
    pub method: UpdateMethod,
    /// The value to write.
    pub value: Value,
}

impl StoreUpdate {
    /// A full-replacement update.
    pub fn set(key: StoreKey, value: Value) -> Self {
        Self {
            key,
            method: UpdateMethod::Set,
            value,
        }
    }

    /// A shallow-merge update.
    pub fn merge(key: StoreKey, value: Value) -> Self {
        Self {
            key,
            method: UpdateMethod::Merge,
            value,
        }
    }
}

/// The three-phase update lists attached to a mutating call.
#[derive(Debug, Clone, Default)]
pub struct ThreePhaseUpdates {
    /// Applied before the call is issued.
    pub optimistic: Vec<StoreUpdate>,
    /// Applied when the call resolves with a success jsonCode.
    pub success: Vec<StoreUpdate>,
    /// Applied when the call resolves with any other jsonCode.
    pub failure: Vec<StoreUpdate>,
}

/// The API dispatcher: the three call shapes the controller consumes,
/// layered over the raw [`ApiRequester`] seam.
#[derive(Clone)]
pub struct Api {
    requester: Arc<dyn ApiRequester>,
    store: Arc<dyn KeyValueStore>,
    queue: RequestQueue,
}

impl Api {
    /// Creates a dispatcher over `requester` and `store`.
    pub fn new(requester: Arc<dyn ApiRequester>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            requester,
            store,
            queue: RequestQueue::new(),
        }
    }

    fn apply(&self, updates: &[StoreUpdate]) {
        for update in updates {
            match update.method {
                UpdateMethod::Set => self.store.set(update.key, update.value.clone()),
                UpdateMethod::Merge => self.store.merge(update.key, update.value.clone()),
            }
        }
    }

    async fn send(&self, command: &str, params: Value) -> ApiResponse {
        let mut response = self.requester.send(command, params).await;
        if response.request_id.is_none() {
            response.request_id = Some(Uuid::new_v4());
        }
        tracing::debug!(
            "📡 {} resolved with jsonCode {} (request {})",
            command,
            response.json_code,
            response
                .request_id
                .map(|id| id.to_string())
                .unwrap_or_default()
        );
        response
    }

    /// Issues an idempotent query. No store writes.
    pub async fn read(&self, command: &str, params: Value) -> ApiResponse {
        self.send(command, params).await
    }

    /// Issues a mutating call with three-phase local-store updates:
    /// optimistic writes land immediately, then the success or failure list
    /// lands depending on the resolved jsonCode.
    pub async fn write(
        &self,
        command: &str,
        params: Value,
        updates: ThreePhaseUpdates,
    ) -> ApiResponse {
        self.apply(&updates.optimistic);
        let response = self.send(command, params).await;
        if response.is_success() {
            self.apply(&updates.success);
        } else {
            self.apply(&updates.failure);
        }
        response
    }

    /// Issues a mutating call that is allowed to have externally visible side
    /// effects. No automatic store writes.
    pub async fn make_request_with_side_effects(
        &self,
        command: &str,
        params: Value,
    ) -> ApiResponse {
        self.send(command, params).await
    }

    /// Fire-and-forget variant of
    /// [`make_request_with_side_effects`](Self::make_request_with_side_effects),
    /// registered with the request queue so a full cleanup can discard it.
    pub fn spawn_side_effect(&self, command: String, params: Value) {
        let requester = Arc::clone(&self.requester);
        let handle = tokio::spawn(async move {
            let response = requester.send(&command, params).await;
            if response.is_success() {
                tracing::debug!("✅ Side-effect command {} completed", command);
            } else {
                tracing::warn!(
                    "❌ Side-effect command {} failed with jsonCode {}",
                    command,
                    response.json_code
                );
            }
        });
        self.queue.register(handle.abort_handle());
    }

    /// Discards every queued and in-flight fire-and-forget request.
    pub fn clear_queue(&self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::codes::JSON_CODE_NOT_AUTHENTICATED;
    use crate::store::memory::MemoryStore;
    use futures::future::BoxFuture;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedRequester {
        responses: Mutex<VecDeque<ApiResponse>>,
    }

    impl ScriptedRequester {
        fn new(responses: Vec<ApiResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    impl ApiRequester for ScriptedRequester {
        fn send(&self, _command: &str, _params: Value) -> BoxFuture<'_, ApiResponse> {
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ApiResponse::success(None));
            Box::pin(async move { response })
        }
    }

    fn api_over(responses: Vec<ApiResponse>) -> (Api, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let api = Api::new(
            Arc::new(ScriptedRequester::new(responses)),
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
        );
        (api, store)
    }

    #[tokio::test]
    async fn write_applies_optimistic_then_success_updates() {
        let (api, store) = api_over(vec![ApiResponse::success(None)]);

        let response = api
            .write(
                "SigninUser",
                json!({}),
                ThreePhaseUpdates {
                    optimistic: vec![StoreUpdate::merge(
                        StoreKey::Account,
                        json!({"isLoading": true}),
                    )],
                    success: vec![StoreUpdate::merge(
                        StoreKey::Account,
                        json!({"isLoading": false}),
                    )],
                    failure: vec![StoreUpdate::merge(
                        StoreKey::Account,
                        json!({"isLoading": false, "errors": "failed"}),
                    )],
                },
            )
            .await;

        assert!(response.is_success());
        assert_eq!(
            store.get(StoreKey::Account),
            Some(json!({"isLoading": false}))
        );
    }

    #[tokio::test]
    async fn write_applies_failure_updates_on_non_success() {
        let (api, store) = api_over(vec![ApiResponse::failure(
            JSON_CODE_NOT_AUTHENTICATED,
            "expired",
        )]);

        let response = api
            .write(
                "SigninUser",
                json!({}),
                ThreePhaseUpdates {
                    optimistic: vec![StoreUpdate::merge(
                        StoreKey::Account,
                        json!({"isLoading": true}),
                    )],
                    success: vec![],
                    failure: vec![StoreUpdate::merge(
                        StoreKey::Account,
                        json!({"isLoading": false, "errors": "failed"}),
                    )],
                },
            )
            .await;

        assert!(!response.is_success());
        assert_eq!(
            store.get(StoreKey::Account),
            Some(json!({"isLoading": false, "errors": "failed"}))
        );
    }

    #[tokio::test]
    async fn responses_are_stamped_with_a_request_id() {
        let (api, _store) = api_over(vec![ApiResponse::success(None)]);
        let response = api.read("BeginSignIn", json!({})).await;
        assert!(response.request_id.is_some());
    }
}
