use serde_json::{json, Value};

use crate::api::codes::{
    CMD_BEGIN_SIGN_IN, CMD_SIGNIN_USER, CMD_SIGNIN_USER_WITH_LINK,
    JSON_CODE_EXPIRED_MAGIC_CODE, JSON_CODE_INCORRECT_MAGIC_CODE, JSON_CODE_NETWORK_FAILURE,
    JSON_CODE_NOT_AUTHENTICATED,
};
use crate::api::dispatch::{StoreUpdate, ThreePhaseUpdates};
use crate::api::response::ApiResponse;
use crate::controller::SessionController;
use crate::messages;
use crate::models::account::Account;
use crate::models::session::Session;
use crate::store::keys::StoreKey;
use crate::validation;

/// Maps a failed sign-in response to its user-facing message.
///
/// Known backend sentinels get a specific message; transient failures get
/// the retryable generic; any other backend-declared failure lands in the
/// blocked state requiring escalation.
fn sign_in_failure_message(response: &ApiResponse) -> &'static str {
    match response.json_code {
        JSON_CODE_INCORRECT_MAGIC_CODE => messages::INCORRECT_MAGIC_CODE,
        JSON_CODE_EXPIRED_MAGIC_CODE => messages::EXPIRED_MAGIC_CODE,
        JSON_CODE_NOT_AUTHENTICATED | JSON_CODE_NETWORK_FAILURE => {
            messages::GENERIC_SIGN_IN_FAILURE
        }
        _ => messages::ACCOUNT_BLOCKED,
    }
}

fn surface_error(controller: &SessionController, message: &str) {
    controller.store().merge(
        StoreKey::Account,
        json!({"isLoading": false, "errors": message}),
    );
}

/// Checks whether an account exists for `login`, without side effects.
///
/// Optimistically flips the account loading flag and records the pending
/// login; never touches the auth token. Failures surface through the account
/// store fields only.
pub async fn begin_sign_in(controller: &SessionController, login: &str) {
    tracing::info!("🔐 Begin sign-in");

    if let Err(error) = validation::validate_login(login) {
        tracing::debug!("Login failed validation: {}", error);
        surface_error(controller, &error.to_string());
        return;
    }

    let login = login.trim();
    controller.store().merge(
        StoreKey::Account,
        json!({"isLoading": true, "errors": null, "message": null}),
    );
    controller
        .store()
        .merge(StoreKey::Credentials, json!({ "login": login }));

    let response = controller
        .api()
        .read(CMD_BEGIN_SIGN_IN, json!({ "email": login }))
        .await;

    if !response.is_success() {
        tracing::warn!(
            "❌ BeginSignIn failed with jsonCode {} for pending login",
            response.json_code
        );
        surface_error(controller, messages::UNABLE_TO_FIND_ACCOUNT);
        return;
    }

    let account = Account {
        is_loading: false,
        errors: None,
        message: None,
        validated: response
            .data
            .as_ref()
            .and_then(|data| data.get("validated"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
        requires_two_factor_auth: response
            .data
            .as_ref()
            .and_then(|data| data.get("requiresTwoFactorAuth"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
    };
    controller.store().merge(
        StoreKey::Account,
        serde_json::to_value(&account).unwrap_or(Value::Null),
    );
    tracing::info!("✅ BeginSignIn completed");
}

/// Exchanges a one-time magic code (and optional second factor) for a
/// session. Precondition: a pending login recorded by
/// [`begin_sign_in`] exists.
pub async fn sign_in(
    controller: &SessionController,
    validate_code: &str,
    two_factor_auth_code: Option<&str>,
) {
    tracing::info!("🔐 Sign-in attempt");

    if let Err(error) = validation::validate_magic_code(validate_code) {
        surface_error(controller, &error.to_string());
        return;
    }
    if let Some(code) = two_factor_auth_code {
        if let Err(error) = validation::validate_two_factor_code(code) {
            surface_error(controller, &error.to_string());
            return;
        }
    }

    let ctx = controller.context();
    let Some(login) = ctx.credentials.login.clone().filter(|l| !l.is_empty()) else {
        tracing::error!("❌ Sign-in attempted without a pending login");
        surface_error(controller, messages::MISSING_PENDING_LOGIN);
        return;
    };

    // Residue of a guest session must not survive authentication.
    let anonymous_account_id = ctx
        .session
        .is_anonymous()
        .then_some(ctx.session.account_id)
        .flatten();

    let mut params = json!({
        "email": login,
        "validateCode": validate_code,
    });
    if let Some(code) = two_factor_auth_code {
        params["twoFactorAuthCode"] = json!(code);
    }

    let response = controller
        .api()
        .write(
            CMD_SIGNIN_USER,
            params,
            ThreePhaseUpdates {
                optimistic: vec![StoreUpdate::merge(
                    StoreKey::Account,
                    json!({"isLoading": true, "errors": null, "message": null}),
                )],
                success: vec![StoreUpdate::merge(
                    StoreKey::Account,
                    json!({"isLoading": false}),
                )],
                failure: vec![],
            },
        )
        .await;

    if !response.is_success() {
        tracing::warn!("❌ Sign-in failed with jsonCode {}", response.json_code);
        surface_error(controller, sign_in_failure_message(&response));
        return;
    }

    commit_session(controller, &response, anonymous_account_id);
    tracing::info!("✅ User signed in");
}

/// Exchanges a magic-link code addressed by account id for a session,
/// driving the auto-auth state machine
/// (`NotStarted → SigningIn → JustSignedIn | Failed`).
pub async fn sign_in_with_validate_code(
    controller: &SessionController,
    account_id: i64,
    validate_code: &str,
    two_factor_auth_code: Option<&str>,
) {
    tracing::info!("🔗 Magic-link sign-in attempt");

    if let Err(error) = validation::validate_magic_code(validate_code) {
        surface_error(controller, &error.to_string());
        controller
            .store()
            .merge(StoreKey::Session, json!({"autoAuthState": "failed"}));
        return;
    }

    let ctx = controller.context();
    let anonymous_account_id = ctx
        .session
        .is_anonymous()
        .then_some(ctx.session.account_id)
        .flatten();

    let mut params = json!({
        "accountId": account_id,
        "validateCode": validate_code,
    });
    if let Some(code) = two_factor_auth_code {
        params["twoFactorAuthCode"] = json!(code);
    }

    let response = controller
        .api()
        .write(
            CMD_SIGNIN_USER_WITH_LINK,
            params,
            ThreePhaseUpdates {
                optimistic: vec![
                    StoreUpdate::merge(
                        StoreKey::Account,
                        json!({"isLoading": true, "errors": null, "message": null}),
                    ),
                    StoreUpdate::merge(StoreKey::Session, json!({"autoAuthState": "signingIn"})),
                ],
                success: vec![StoreUpdate::merge(
                    StoreKey::Account,
                    json!({"isLoading": false}),
                )],
                failure: vec![StoreUpdate::merge(
                    StoreKey::Session,
                    json!({"autoAuthState": "failed"}),
                )],
            },
        )
        .await;

    if !response.is_success() {
        tracing::warn!(
            "❌ Magic-link sign-in failed with jsonCode {}",
            response.json_code
        );
        surface_error(controller, sign_in_failure_message(&response));
        return;
    }

    commit_session(controller, &response, anonymous_account_id);
    controller
        .store()
        .merge(StoreKey::Session, json!({"autoAuthState": "justSignedIn"}));
    tracing::info!("✅ User signed in via magic link");
}

/// Commits a freshly issued session to the store, stamps its creation date
/// once, clears anonymous personal-detail residue, and notifies the host
/// shell of the new token.
fn commit_session(
    controller: &SessionController,
    response: &ApiResponse,
    anonymous_account_id: Option<i64>,
) {
    let mut session = Session::from_store_value(response.data.as_ref());
    if !session.has_auth_token() {
        tracing::error!("❌ Sign-in succeeded without an auth token in the payload");
        surface_error(controller, messages::GENERIC_SIGN_IN_FAILURE);
        return;
    }
    session.stamp_creation_date(chrono::Utc::now().timestamp_millis());

    controller
        .store()
        .set(StoreKey::Session, session.to_store_value());

    // Anonymous identity data must never coexist with the authenticated
    // identity's data under the same local key.
    if let Some(anon_id) = anonymous_account_id {
        let mut residue = serde_json::Map::new();
        residue.insert(anon_id.to_string(), Value::Null);
        controller
            .store()
            .merge(StoreKey::PersonalDetailsList, Value::Object(residue));
        tracing::debug!("🧹 Cleared anonymous personal details for account {}", anon_id);
    }

    if let (Some(shell), Some(token)) = (controller.host_shell(), session.auth_token.as_deref()) {
        shell.send_auth_token(token);
    }
}
