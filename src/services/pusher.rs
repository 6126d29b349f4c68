use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::codes::{CMD_AUTHENTICATE, CMD_AUTHENTICATE_PUSHER};
use crate::controller::SessionController;
use crate::error::SessionError;
use crate::store::keys::StoreKey;

/// The authorization payload handed back to the real-time transport for one
/// channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelAuth {
    /// The signed authorization string.
    pub auth: String,
    /// The shared secret for encrypted channels, when issued.
    pub shared_secret: Option<String>,
}

/// The per-channel authorization callback. Receives the error (if any) and
/// the authorization payload; on failure the payload is empty.
pub type PusherAuthCallback = Box<dyn FnOnce(Option<SessionError>, ChannelAuth) + Send>;

fn deliver(callback: Option<PusherAuthCallback>, error: Option<SessionError>, auth: ChannelAuth) {
    if let Some(callback) = callback {
        callback(error, auth);
    }
}

/// Bridges the real-time transport's per-channel authorization handshake to
/// the remote API.
///
/// Three outcomes: an expired token invokes the callback with an error and
/// triggers one throttled reauthentication; any other non-success invokes
/// the callback with an error describing the code; success hands the
/// callback the authorization payload (or returns it directly when no
/// callback is supplied). No error escapes to the messaging subsystem.
pub async fn authenticate_pusher(
    controller: &SessionController,
    socket_id: &str,
    channel_name: &str,
    callback: Option<PusherAuthCallback>,
) -> Option<ChannelAuth> {
    tracing::debug!("🔐 Authorizing Pusher channel {}", channel_name);

    let params = json!({
        "socketId": socket_id,
        "channelName": channel_name,
        "shouldRetry": false,
        "forceNetworkRequest": true,
    });
    let response = controller
        .api()
        .make_request_with_side_effects(CMD_AUTHENTICATE_PUSHER, params)
        .await;

    if response.is_not_authenticated() {
        tracing::info!("🔑 Pusher authorization rejected; auth token expired");
        deliver(callback, Some(SessionError::NotAuthenticated), ChannelAuth::default());
        reauthenticate_pusher(controller).await;
        return None;
    }

    if !response.is_success() {
        let error = SessionError::Api {
            code: response.json_code,
            message: response.message.clone().unwrap_or_default(),
        };
        tracing::warn!(
            "❌ Pusher authorization for {} failed: {}",
            channel_name,
            error
        );
        deliver(callback, Some(error), ChannelAuth::default());
        return None;
    }

    let auth = match response.data {
        Some(data) => match serde_json::from_value::<ChannelAuth>(data) {
            Ok(auth) => auth,
            Err(error) => {
                tracing::error!("❌ Malformed Pusher authorization payload: {}", error);
                deliver(
                    callback,
                    Some(SessionError::Serialization(error)),
                    ChannelAuth::default(),
                );
                return None;
            }
        },
        None => {
            tracing::error!("❌ Pusher authorization succeeded without a payload");
            deliver(
                callback,
                Some(SessionError::Internal(
                    "authorization response carried no payload".to_string(),
                )),
                ChannelAuth::default(),
            );
            return None;
        }
    };

    tracing::debug!("✅ Pusher channel {} authorized", channel_name);
    match callback {
        Some(callback) => {
            callback(None, auth);
            None
        }
        None => Some(auth),
    }
}

/// Re-runs the authentication handshake and, only on confirmed success,
/// reconnects the real-time transport.
///
/// Throttled: many channels fault simultaneously when the token expires, and
/// only one reauthenticate-and-reconnect cycle should run.
pub async fn reauthenticate_pusher(controller: &SessionController) {
    if !controller.reauth_throttle().try_acquire() {
        tracing::debug!("Pusher reauthentication suppressed by throttle");
        return;
    }

    tracing::info!("🔁 Reauthenticating the Pusher connection");
    let ctx = controller.context();
    let (Some(login), Some(password)) = (
        ctx.credentials.auto_generated_login.clone(),
        ctx.credentials.auto_generated_password.clone(),
    ) else {
        tracing::error!("❌ Cannot reauthenticate without stored auto-generated credentials");
        return;
    };

    let params = json!({
        "partnerUserId": login,
        "partnerUserSecret": password,
    });
    let response = controller
        .api()
        .make_request_with_side_effects(CMD_AUTHENTICATE, params)
        .await;

    if !response.is_success() {
        tracing::warn!(
            "❌ Reauthentication failed with jsonCode {}; not reconnecting",
            response.json_code
        );
        return;
    }

    if let Some(data) = response.data.as_ref() {
        let mut refreshed = serde_json::Map::new();
        if let Some(token) = data.get("authToken") {
            refreshed.insert("authToken".to_string(), token.clone());
        }
        if let Some(token) = data.get("encryptedAuthToken") {
            refreshed.insert("encryptedAuthToken".to_string(), token.clone());
        }
        if !refreshed.is_empty() {
            controller
                .store()
                .merge(StoreKey::Session, serde_json::Value::Object(refreshed));
        }
    }

    controller.pusher().reconnect();
    tracing::info!("✅ Pusher reconnected after reauthentication");
}
