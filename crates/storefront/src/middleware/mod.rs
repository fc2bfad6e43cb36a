pub mod admin;
pub mod session;
pub mod validate;

pub const SESSION_COOKIE: &str = "SESSION";
