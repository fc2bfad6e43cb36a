use async_trait::async_trait;
use std::sync::Arc;

pub type DynCaptchaVerifier = Arc<dyn CaptchaVerifierTrait + Send + Sync>;

#[async_trait]
pub trait CaptchaVerifierTrait {
    /// Any transport or decoding failure counts as a failed verification.
    async fn verify(&self, response: &str) -> bool;
}
