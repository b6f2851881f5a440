mod actions;
pub(crate) mod args;
mod gate;

pub(crate) use actions::{
    handle_login, handle_logout, handle_profile, handle_status, handle_whoami,
};
pub(crate) use gate::run_protected;
#[cfg(test)]
pub(crate) use gate::{require_session, NOT_SIGNED_IN_MESSAGE, SESSION_EXPIRED_MESSAGE};
