use serde_json::{json, Value};

use crate::api::codes::CMD_LOG_OUT;
use crate::api::response::ApiResponse;
use crate::context::SessionContext;
use crate::controller::SessionController;
use crate::services::stash;
use crate::store::keys::StoreKey;

/// Options for [`sign_out_and_redirect_to_sign_in`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SignOutOptions {
    /// Reset the navigation stack to home before redirecting.
    pub reset_to_home: bool,
    /// Park the current session in the stash slots instead of discarding it.
    pub stash_session: bool,
    /// Also clear the legacy-domain auth state.
    pub sign_out_from_old_dot: bool,
    /// Treat the call as a stash restore even without a supportal token.
    pub force_use_stashed_session: bool,
}

/// PREPARE: the remote sign-out request, captured from the context before
/// any local clearing so the call still authorizes with the current token.
#[derive(Debug, Clone)]
pub(crate) struct SignOutPlan {
    pub(crate) params: Value,
}

pub(crate) fn prepare_sign_out(ctx: &SessionContext) -> SignOutPlan {
    SignOutPlan {
        params: json!({
            "authToken": ctx.session.auth_token.clone().unwrap_or_default(),
            "partnerUserId": ctx.credentials.auto_generated_login.clone().unwrap_or_default(),
        }),
    }
}

/// CALL: issue the remote sign-out. Failures resolve as responses and are
/// logged by the commit phase; they never block the local redirect.
async fn call_sign_out(controller: &SessionController, plan: &SignOutPlan) -> ApiResponse {
    controller
        .api()
        .make_request_with_side_effects(CMD_LOG_OUT, plan.params.clone())
        .await
}

/// COMMIT: cross-domain cookie redirect when indicated, then local cleanup.
fn commit_sign_out(controller: &SessionController, response: &ApiResponse, opts: SignOutOptions) {
    if !response.is_success() {
        tracing::warn!(
            "❌ Remote sign-out resolved with jsonCode {}; clearing locally anyway",
            response.json_code
        );
    }

    let backend_holds_cookie = response
        .data
        .as_ref()
        .and_then(|data| data.get("hasOldDotAuthCookie"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if backend_holds_cookie || opts.sign_out_from_old_dot {
        tracing::info!("🔗 Redirecting through the legacy sign-out URL");
        if let Some(shell) = controller.host_shell() {
            shell.sign_out_from_old_dot();
        }
        controller
            .navigator()
            .open_external_url(&controller.config().old_dot_sign_out_url);
    }

    controller.pusher().disconnect();
    controller.api().clear_queue();
    clear_active_identity(controller, false);
}

/// Invalidates the authenticated session with the remote side, sending the
/// current token in the request before any local clearing. Fire-and-forget;
/// completion does not wait on the response.
pub fn sign_out(controller: &SessionController) {
    let ctx = controller.context();
    tracing::info!("👋 Signing out");
    let plan = prepare_sign_out(&ctx);
    controller
        .api()
        .spawn_side_effect(CMD_LOG_OUT.to_string(), plan.params);
}

/// The sign-out state transition: the decision table over anonymous users,
/// supportal stash restores, stash-then-clear, and the full remote+local
/// clear. Always lands the user somewhere sensible; never returns an error.
pub async fn sign_out_and_redirect_to_sign_in(
    controller: &SessionController,
    opts: SignOutOptions,
) {
    let ctx = controller.context();

    // Guests have nothing to invalidate remotely.
    if ctx.is_anonymous() {
        tracing::info!("👋 Anonymous sign-out; navigating to sign-in only");
        capture_pending_room(controller);
        redirect_to_sign_in(controller, opts);
        return;
    }

    let restore_requested =
        (ctx.is_supportal() || opts.force_use_stashed_session) && !opts.stash_session;
    if restore_requested {
        // An account switch back to the parked identity; the supportal token
        // is abandoned without a remote sign-out.
        match stash::restore_stashed_session(controller) {
            Ok(()) => {
                if opts.reset_to_home {
                    controller.navigator().reset_to_home();
                }
            }
            Err(error) => {
                tracing::error!("❌ {}, clearing the session", error);
                full_sign_out(controller, opts).await;
                redirect_to_sign_in(controller, opts);
            }
        }
        return;
    }

    if opts.stash_session {
        stash::stash_current_session(controller, ctx.is_supportal());
        // The stashed token must stay valid to return to, so the remote
        // sign-out is skipped.
        clear_active_identity(controller, true);
        redirect_to_sign_in(controller, opts);
        return;
    }

    full_sign_out(controller, opts).await;
    redirect_to_sign_in(controller, opts);
}

async fn full_sign_out(controller: &SessionController, opts: SignOutOptions) {
    let ctx = controller.context();
    tracing::info!("👋 Signing out and clearing local state");
    let plan = prepare_sign_out(&ctx);
    let response = call_sign_out(controller, &plan).await;
    commit_sign_out(controller, &response, opts);
}

/// Clears the active identity. The stash slots survive only when the caller
/// just parked a session there.
fn clear_active_identity(controller: &SessionController, keep_stash: bool) {
    let mut entries = vec![
        (StoreKey::Session, Value::Null),
        (StoreKey::Credentials, Value::Null),
        (StoreKey::Account, Value::Null),
    ];
    if !keep_stash {
        entries.push((StoreKey::StashedSession, Value::Null));
        entries.push((StoreKey::StashedCredentials, Value::Null));
    }
    controller.store().multi_set(entries);
    controller
        .store()
        .merge(StoreKey::Session, json!({"autoAuthState": "notStarted"}));
    tracing::info!("🧹 Local identity state cleared");
}

fn capture_pending_room(controller: &SessionController) {
    if let Some(room_id) = controller.navigator().active_public_room_id() {
        tracing::debug!("📌 Capturing deep-link room {} for restoration", room_id);
        controller
            .store()
            .set(StoreKey::LastVisitedPublicRoomId, json!(room_id));
    }
}

/// Navigates to the sign-in screen at most once; repeated calls while
/// already there are no-ops.
fn redirect_to_sign_in(controller: &SessionController, opts: SignOutOptions) {
    if opts.reset_to_home {
        controller.navigator().reset_to_home();
    }
    if controller.navigator().is_on_sign_in() {
        tracing::debug!("Already on the sign-in screen");
        return;
    }
    controller.navigator().go_to_sign_in();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::credentials::Credentials;
    use crate::models::session::Session;

    #[test]
    fn prepare_captures_the_current_token_and_partner_login() {
        let mut ctx = SessionContext {
            session: Session {
                auth_token: Some("abc".to_string()),
                ..Session::default()
            },
            ..SessionContext::default()
        };
        ctx.credentials.auto_generated_login = Some("gen-login".to_string());

        let plan = prepare_sign_out(&ctx);
        assert_eq!(plan.params["authToken"], "abc");
        assert_eq!(plan.params["partnerUserId"], "gen-login");
    }

    #[test]
    fn prepare_tolerates_an_empty_context() {
        let plan = prepare_sign_out(&SessionContext::default());
        assert_eq!(plan.params["authToken"], "");
        assert_eq!(plan.params["partnerUserId"], "");
    }
}
