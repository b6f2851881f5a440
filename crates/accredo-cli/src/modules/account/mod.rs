mod actions;
pub(crate) mod args;

pub(crate) use actions::{
    handle_activate, handle_register, handle_reset_password, handle_reset_password_confirm,
};
