// ==============
// passport-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const USER_REGISTERED: &str = "user.registered";
pub const LOGIN_SUCCESS: &str = "login.success";
pub const LOGIN_FAILURE: &str = "login.failure";
pub const LOGIN_THROTTLED: &str = "login.throttled";
pub const LOGOUT: &str = "session.cleared";
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_ACTIVE: &str = "session.active";
pub const SESSION_EXPIRED: &str = "session.expired";
