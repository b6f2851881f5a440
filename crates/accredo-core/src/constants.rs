/// Key under which the active session is persisted between runs.
pub const SESSION_STORAGE_KEY: &str = "accredo.session";

/// Message used when the backend rejects a login without a `detail`.
pub const INVALID_CREDENTIALS_FALLBACK: &str = "Invalid email or password";

pub mod endpoints {
    pub const JWT_CREATE: &str = "jwt/create/";
    pub const JWT_REFRESH: &str = "jwt/refresh/";
    pub const USERS: &str = "";
    pub const USERS_ME: &str = "me/";
    pub const USERS_ACTIVATION: &str = "activation/";
    pub const USERS_RESET_PASSWORD: &str = "reset_password/";
    pub const USERS_RESET_PASSWORD_CONFIRM: &str = "reset_password_confirm/";
}
