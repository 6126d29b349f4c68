use serde_json::Value;

use crate::controller::SessionController;
use crate::error::{Result, SessionError};
use crate::integrations::AccountSwitch;
use crate::store::keys::StoreKey;

/// Whether a complete stash exists: both the stashed token and the stashed
/// auto-generated login are simultaneously non-empty.
pub fn has_stashed_session(controller: &SessionController) -> bool {
    controller.has_stashed_session()
}

/// Parks the active session and credentials in the stash slots.
///
/// With `preserve_oldest`, an existing stash is left untouched: the stash is
/// single-depth, and nested impersonation must unwind to the original
/// identity rather than the intermediate one.
pub(crate) fn stash_current_session(controller: &SessionController, preserve_oldest: bool) {
    let ctx = controller.context();

    if preserve_oldest && ctx.has_stashed_session() {
        tracing::info!("🗃️ Keeping the original stash; not overwriting with the current session");
        return;
    }

    tracing::info!("🗃️ Stashing the current session");
    controller.store().multi_set(vec![
        (StoreKey::StashedSession, ctx.session.to_store_value()),
        (
            StoreKey::StashedCredentials,
            ctx.credentials.to_store_value(),
        ),
    ]);
}

/// Swaps the stashed identity back in as the active one and notifies the
/// embedding host shell of the account switch.
///
/// A missing or partial stash fails with [`SessionError::NoStashedSession`];
/// callers degrade to a full clear rather than propagate it.
pub(crate) fn restore_stashed_session(controller: &SessionController) -> Result<()> {
    let ctx = controller.context();

    if !ctx.has_stashed_session() {
        return Err(SessionError::NoStashedSession);
    }

    tracing::info!("🔄 Restoring the stashed session");
    let previous_account_id = ctx.session.account_id;
    let restored_token = ctx.stashed_session.auth_token.clone().unwrap_or_default();

    controller.store().multi_set(vec![
        (StoreKey::Session, ctx.stashed_session.to_store_value()),
        (
            StoreKey::Credentials,
            ctx.stashed_credentials.to_store_value(),
        ),
        (StoreKey::StashedSession, Value::Null),
        (StoreKey::StashedCredentials, Value::Null),
    ]);

    if let Some(shell) = controller.host_shell() {
        shell.switch_account(AccountSwitch {
            auth_token: restored_token,
            policy_id: ctx.active_policy_id.clone(),
            previous_account_id,
        });
    }
    tracing::info!("✅ Stashed session restored");
    Ok(())
}
