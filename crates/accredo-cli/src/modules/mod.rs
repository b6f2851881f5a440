pub(crate) mod account;
pub(crate) mod auth;
pub(crate) mod portal;
pub(crate) mod system;
