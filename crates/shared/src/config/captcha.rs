use crate::abstract_trait::CaptchaVerifierTrait;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, warn};

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Clone, Deserialize)]
pub struct ReCaptchaResponse {
    pub success: bool,
    pub challenge_ts: Option<String>,
    pub hostname: Option<String>,
    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,
}

#[derive(Clone)]
pub struct ReCaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    url: String,
}

impl ReCaptchaVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret: secret.into(),
            url: SITEVERIFY_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl CaptchaVerifierTrait for ReCaptchaVerifier {
    async fn verify(&self, response: &str) -> bool {
        if response.is_empty() {
            warn!("⚠️ Empty CAPTCHA response");
            return false;
        }

        let result = self
            .client
            .get(&self.url)
            .query(&[("secret", self.secret.as_str()), ("response", response)])
            .send()
            .await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                error!("❌ CAPTCHA verification request failed: {e}");
                return false;
            }
        };

        match resp.json::<ReCaptchaResponse>().await {
            Ok(body) => {
                if !body.success {
                    warn!("⚠️ CAPTCHA rejected: {:?}", body.error_codes);
                }
                body.success
            }
            Err(e) => {
                error!("❌ Failed to decode CAPTCHA response: {e}");
                false
            }
        }
    }
}

/// Accepts every response. Used when `RECAPTCHA_ENABLED=false`.
#[derive(Clone, Default)]
pub struct DisabledCaptcha;

#[async_trait]
impl CaptchaVerifierTrait for DisabledCaptcha {
    async fn verify(&self, _response: &str) -> bool {
        info!("CAPTCHA verification disabled, accepting response");
        true
    }
}
