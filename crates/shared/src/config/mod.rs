mod captcha;
mod database;
mod hashing;
mod myconfig;
mod redis;

pub use self::captcha::{DisabledCaptcha, ReCaptchaResponse, ReCaptchaVerifier};
pub use self::database::{ConnectionManager, ConnectionPool, run_migrations};
pub use self::hashing::Hashing;
pub use self::myconfig::{AdminConfig, Config, RecaptchaConfig};
pub use self::redis::{RedisClient, RedisConfig};
