use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::api::client::ApiRequester;
use crate::api::dispatch::Api;
use crate::config::Config;
use crate::context::SessionContext;
use crate::integrations::{HostShell, Navigator, PusherTransport};
use crate::models::credentials::Credentials;
use crate::models::session::{AutoAuthState, Session, INVALID_AUTH_TOKEN};
use crate::store::keys::StoreKey;
use crate::store::reactive::{KeyValueStore, SubscriptionId};
use crate::throttle::Throttle;

/// The session lifecycle controller.
///
/// Owns the in-memory mirror of the session state and orchestrates sign-in,
/// sign-out, account switching, and the real-time channel reauthorization
/// handshake. The store subscriptions registered here are the mirror's only
/// writer.
pub struct SessionController {
    store: Arc<dyn KeyValueStore>,
    api: Api,
    pusher: Arc<dyn PusherTransport>,
    navigator: Arc<dyn Navigator>,
    host_shell: Option<Arc<dyn HostShell>>,
    config: Config,
    ctx: Arc<Mutex<SessionContext>>,
    sign_in_waiter: Arc<Mutex<Option<oneshot::Sender<bool>>>>,
    reauth_throttle: Throttle,
    subscriptions: Vec<SubscriptionId>,
}

impl SessionController {
    /// Creates a controller over its collaborators and wires the store
    /// subscriptions that keep the in-memory mirror current.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        requester: Arc<dyn ApiRequester>,
        pusher: Arc<dyn PusherTransport>,
        navigator: Arc<dyn Navigator>,
        host_shell: Option<Arc<dyn HostShell>>,
        config: Config,
    ) -> Self {
        let api = Api::new(requester, Arc::clone(&store));
        let ctx = Arc::new(Mutex::new(SessionContext::default()));
        let sign_in_waiter: Arc<Mutex<Option<oneshot::Sender<bool>>>> =
            Arc::new(Mutex::new(None));
        let mut subscriptions = Vec::new();

        {
            let ctx = Arc::clone(&ctx);
            let waiter = Arc::clone(&sign_in_waiter);
            subscriptions.push(store.connect(
                StoreKey::Session,
                Box::new(move |value| {
                    let session = Session::from_store_value(value);
                    let has_token = session.has_auth_token();
                    ctx.lock().unwrap().session = session;
                    if has_token {
                        if let Some(tx) = waiter.lock().unwrap().take() {
                            tracing::debug!("🔑 Resolving pending sign-in waiter");
                            let _ = tx.send(true);
                        }
                    }
                }),
            ));
        }
        {
            let ctx = Arc::clone(&ctx);
            subscriptions.push(store.connect(
                StoreKey::Credentials,
                Box::new(move |value| {
                    ctx.lock().unwrap().credentials = Credentials::from_store_value(value);
                }),
            ));
        }
        {
            let ctx = Arc::clone(&ctx);
            subscriptions.push(store.connect(
                StoreKey::StashedSession,
                Box::new(move |value| {
                    ctx.lock().unwrap().stashed_session = Session::from_store_value(value);
                }),
            ));
        }
        {
            let ctx = Arc::clone(&ctx);
            subscriptions.push(store.connect(
                StoreKey::StashedCredentials,
                Box::new(move |value| {
                    ctx.lock().unwrap().stashed_credentials =
                        Credentials::from_store_value(value);
                }),
            ));
        }
        {
            let ctx = Arc::clone(&ctx);
            subscriptions.push(store.connect(
                StoreKey::PreferredLocale,
                Box::new(move |value| {
                    ctx.lock().unwrap().preferred_locale =
                        value.and_then(Value::as_str).map(str::to_string);
                }),
            ));
        }
        {
            let ctx = Arc::clone(&ctx);
            subscriptions.push(store.connect(
                StoreKey::ActivePolicyId,
                Box::new(move |value| {
                    ctx.lock().unwrap().active_policy_id =
                        value.and_then(Value::as_str).map(str::to_string);
                }),
            ));
        }

        let reauth_throttle =
            Throttle::new(Duration::from_millis(config.pusher_reauth_min_interval_ms));

        let controller = Self {
            store,
            api,
            pusher,
            navigator,
            host_shell,
            config,
            ctx,
            sign_in_waiter,
            reauth_throttle,
            subscriptions,
        };
        controller.normalize_auto_auth_state();
        tracing::info!("✅ Session controller initialized");
        controller
    }

    /// Normalizes the cached auto-auth state on construction: an in-flight
    /// magic-link auth reads as already completed on remount, anything else
    /// resets.
    fn normalize_auto_auth_state(&self) {
        let cached = self.ctx.lock().unwrap().session.auto_auth_state;
        let normalized = AutoAuthState::normalized_from_cache(cached);
        let normalized_value = serde_json::to_value(normalized).unwrap_or(Value::Null);
        self.store
            .merge(StoreKey::Session, json!({ "autoAuthState": normalized_value }));
    }

    /// A snapshot of the in-memory mirror.
    pub fn context(&self) -> SessionContext {
        self.ctx.lock().unwrap().clone()
    }

    /// Whether a usable auth token is present.
    pub fn is_authenticated(&self) -> bool {
        self.ctx.lock().unwrap().is_authenticated()
    }

    /// Whether the active session is an anonymous (guest) one.
    pub fn is_anonymous(&self) -> bool {
        self.ctx.lock().unwrap().is_anonymous()
    }

    /// Whether the active session is a customer-support impersonation.
    pub fn is_supportal(&self) -> bool {
        self.ctx.lock().unwrap().is_supportal()
    }

    /// Whether a complete stash exists.
    pub fn has_stashed_session(&self) -> bool {
        self.ctx.lock().unwrap().has_stashed_session()
    }

    /// Pure expiry predicate, boundary inclusive.
    pub fn is_expired_at(creation_date_ms: i64, now_ms: i64, window_ms: i64) -> bool {
        now_ms - creation_date_ms >= window_ms
    }

    /// Whether a session created at `creation_date_ms` has expired.
    pub fn is_expired_session(&self, creation_date_ms: i64) -> bool {
        Self::is_expired_at(
            creation_date_ms,
            chrono::Utc::now().timestamp_millis(),
            self.config.expiration_window_ms(),
        )
    }

    /// Forces the auth token into the invalid sentinel immediately.
    pub fn invalidate_auth_token(&self) {
        tracing::info!("🔑 Invalidating auth token");
        self.store.merge(
            StoreKey::Session,
            json!({
                "authToken": INVALID_AUTH_TOKEN,
                "encryptedAuthToken": INVALID_AUTH_TOKEN,
            }),
        );
    }

    /// Simulates natural expiry: after a fixed delay, the token is forced
    /// invalid and `creation_date` is back-dated beyond the expiration
    /// window, so the reauthentication path exercises itself
    /// deterministically.
    pub fn expire_session_with_delay(&self) {
        let store = Arc::clone(&self.store);
        let delay = Duration::from_secs(self.config.expire_session_delay_secs);
        let window_ms = self.config.expiration_window_ms();
        tracing::info!("⏳ Forcing session expiry in {}s", delay.as_secs());
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let backdated = chrono::Utc::now().timestamp_millis() - window_ms - 1;
            store.merge(
                StoreKey::Session,
                json!({
                    "authToken": INVALID_AUTH_TOKEN,
                    "creationDate": backdated,
                }),
            );
            tracing::info!("🔑 Session force-expired");
        });
    }

    /// Resolves `true` as soon as a usable auth token is present — on the
    /// same queue turn when one already exists at call time.
    ///
    /// Single-slot: registering a new waiter displaces any previous one,
    /// which resolves `false` with a logged warning.
    pub async fn wait_for_user_sign_in(&self) -> bool {
        if self.is_authenticated() {
            return true;
        }

        let (tx, rx) = oneshot::channel();
        let displaced = self.sign_in_waiter.lock().unwrap().replace(tx);
        if let Some(previous) = displaced {
            tracing::warn!("❌ Displacing a pending sign-in waiter; last registrant wins");
            let _ = previous.send(false);
        }

        // The token may have landed between the check above and registration.
        if self.is_authenticated() {
            if let Some(tx) = self.sign_in_waiter.lock().unwrap().take() {
                let _ = tx.send(true);
            }
        }

        rx.await.unwrap_or(false)
    }

    pub(crate) fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub(crate) fn api(&self) -> &Api {
        &self.api
    }

    pub(crate) fn pusher(&self) -> &Arc<dyn PusherTransport> {
        &self.pusher
    }

    pub(crate) fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub(crate) fn host_shell(&self) -> Option<&Arc<dyn HostShell>> {
        self.host_shell.as_ref()
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn reauth_throttle(&self) -> &Throttle {
        &self.reauth_throttle
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        for id in &self.subscriptions {
            self.store.disconnect(*id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::response::ApiResponse;
    use crate::store::memory::MemoryStore;
    use futures::future::BoxFuture;

    struct NoopRequester;

    impl ApiRequester for NoopRequester {
        fn send(&self, _command: &str, _params: Value) -> BoxFuture<'_, ApiResponse> {
            Box::pin(async { ApiResponse::success(None) })
        }
    }

    struct NoopPusher;

    impl PusherTransport for NoopPusher {
        fn disconnect(&self) {}
        fn reconnect(&self) {}
    }

    struct NoopNavigator;

    impl Navigator for NoopNavigator {
        fn go_to_sign_in(&self) {}
        fn is_on_sign_in(&self) -> bool {
            false
        }
        fn reset_to_home(&self) {}
        fn open_external_url(&self, _url: &str) {}
        fn active_public_room_id(&self) -> Option<String> {
            None
        }
    }

    fn controller_over(store: Arc<MemoryStore>) -> SessionController {
        SessionController::new(
            store as Arc<dyn KeyValueStore>,
            Arc::new(NoopRequester),
            Arc::new(NoopPusher),
            Arc::new(NoopNavigator),
            None,
            Config::default(),
        )
    }

    #[test]
    fn expiry_is_boundary_inclusive() {
        let window = 1_000;
        assert!(!SessionController::is_expired_at(0, 999, window));
        assert!(SessionController::is_expired_at(0, 1_000, window));
        assert!(SessionController::is_expired_at(0, 1_001, window));
    }

    #[tokio::test]
    async fn mirror_tracks_store_writes() {
        let store = Arc::new(MemoryStore::new());
        let controller = controller_over(Arc::clone(&store));
        assert!(!controller.is_authenticated());

        store.merge(StoreKey::Session, json!({"authToken": "abc"}));
        assert!(controller.is_authenticated());

        store.set(StoreKey::Session, Value::Null);
        assert!(!controller.is_authenticated());
    }

    #[tokio::test]
    async fn cached_in_flight_auto_auth_reads_as_just_signed_in() {
        let store = Arc::new(MemoryStore::new());
        store.set(StoreKey::Session, json!({"autoAuthState": "signingIn"}));

        let controller = controller_over(Arc::clone(&store));
        assert_eq!(
            controller.context().session.auto_auth_state,
            Some(AutoAuthState::JustSignedIn)
        );
    }

    #[tokio::test]
    async fn cached_failed_auto_auth_resets() {
        let store = Arc::new(MemoryStore::new());
        store.set(StoreKey::Session, json!({"autoAuthState": "failed"}));

        let controller = controller_over(Arc::clone(&store));
        assert_eq!(
            controller.context().session.auto_auth_state,
            Some(AutoAuthState::NotStarted)
        );
    }

    #[tokio::test]
    async fn wait_for_sign_in_resolves_immediately_when_signed_in() {
        let store = Arc::new(MemoryStore::new());
        store.set(StoreKey::Session, json!({"authToken": "abc"}));
        let controller = controller_over(store);
        assert!(controller.wait_for_user_sign_in().await);
    }

    #[tokio::test]
    async fn wait_for_sign_in_resolves_when_the_token_lands() {
        let store = Arc::new(MemoryStore::new());
        let controller = Arc::new(controller_over(Arc::clone(&store)));

        let waiting = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.wait_for_user_sign_in().await })
        };
        tokio::task::yield_now().await;

        store.merge(StoreKey::Session, json!({"authToken": "abc"}));
        assert!(waiting.await.unwrap());
    }

    #[tokio::test]
    async fn a_newer_waiter_displaces_the_old_one() {
        let store = Arc::new(MemoryStore::new());
        let controller = Arc::new(controller_over(Arc::clone(&store)));

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.wait_for_user_sign_in().await })
        };
        tokio::task::yield_now().await;

        let second = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.wait_for_user_sign_in().await })
        };
        tokio::task::yield_now().await;

        assert!(!first.await.unwrap());

        store.merge(StoreKey::Session, json!({"authToken": "abc"}));
        assert!(second.await.unwrap());
    }

    #[tokio::test]
    async fn invalidate_forces_the_sentinel_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(StoreKey::Session, json!({"authToken": "abc", "creationDate": 1}));
        let controller = controller_over(Arc::clone(&store));

        controller.invalidate_auth_token();
        assert_eq!(
            controller.context().session.auth_token.as_deref(),
            Some(INVALID_AUTH_TOKEN)
        );
        // creationDate is untouched by an immediate invalidation.
        assert_eq!(controller.context().session.creation_date, Some(1));
    }

    #[tokio::test]
    async fn delayed_expiry_backdates_creation_date() {
        let store = Arc::new(MemoryStore::new());
        store.set(
            StoreKey::Session,
            json!({"authToken": "abc", "creationDate": chrono::Utc::now().timestamp_millis()}),
        );
        let controller = SessionController::new(
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            Arc::new(NoopRequester),
            Arc::new(NoopPusher),
            Arc::new(NoopNavigator),
            None,
            Config {
                expire_session_delay_secs: 0,
                ..Config::default()
            },
        );

        controller.expire_session_with_delay();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let session = controller.context().session;
        assert_eq!(session.auth_token.as_deref(), Some(INVALID_AUTH_TOKEN));
        assert!(controller.is_expired_session(session.creation_date.unwrap()));
    }
}
