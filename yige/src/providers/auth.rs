//! Login providers
//!
//! Each sign-in method verifies its own credentials and hands back the
//! identity it vouches for. `HttpAuthProvider` forwards credentials to the
//! account gateway.

use crate::error::AuthError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginProvider {
    Apple,
    Phone,
    WeChat,
}

impl LoginProvider {
    pub const ALL: [LoginProvider; 3] = [LoginProvider::Apple, LoginProvider::Phone, LoginProvider::WeChat];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoginProvider::Apple => "apple",
            LoginProvider::Phone => "phone",
            LoginProvider::WeChat => "wechat",
        }
    }
}

impl fmt::Display for LoginProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginProvider::Apple => "Apple",
            LoginProvider::Phone => "手机号",
            LoginProvider::WeChat => "微信",
        };
        f.write_str(name)
    }
}

/// Provider-specific sign-in material
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
    Apple {
        identity_token: String,
        user_identifier: String,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        full_name: Option<String>,
    },
    Phone {
        phone: String,
        code: String,
    },
    WeChat {
        auth_code: String,
    },
}

impl Credentials {
    pub fn provider(&self) -> LoginProvider {
        match self {
            Credentials::Apple { .. } => LoginProvider::Apple,
            Credentials::Phone { .. } => LoginProvider::Phone,
            Credentials::WeChat { .. } => LoginProvider::WeChat,
        }
    }

    /// Cheap local checks before anything leaves the device
    pub fn validate(&self) -> Result<(), AuthError> {
        let invalid = |reason: &str| AuthError::InvalidCredentials {
            provider: self.provider(),
            reason: reason.to_string(),
        };

        match self {
            Credentials::Apple {
                identity_token,
                user_identifier,
                ..
            } => {
                if identity_token.trim().is_empty() || user_identifier.trim().is_empty() {
                    return Err(invalid("missing identity token"));
                }
            }
            Credentials::Phone { phone, code } => {
                let digits = phone.trim_start_matches('+');
                if digits.len() < 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid("malformed phone number"));
                }
                if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid("verification code must be 6 digits"));
                }
            }
            Credentials::WeChat { auth_code } => {
                if auth_code.trim().is_empty() {
                    return Err(invalid("missing authorization code"));
                }
            }
        }

        Ok(())
    }
}

/// Account a provider vouches for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub provider: LoginProvider,
    /// Provider's stable account id
    pub subject: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn provider(&self) -> LoginProvider;

    async fn authenticate(&self, credentials: &Credentials) -> Result<ProviderIdentity, AuthError>;
}

/// Forwards credentials to `{base_url}/auth/{provider}`
#[derive(Clone)]
pub struct HttpAuthProvider {
    provider: LoginProvider,
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthProvider {
    pub fn new(provider: LoginProvider, base_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AuthError::Network {
                provider,
                reason: e.to_string(),
            })?;

        Ok(Self {
            provider,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/auth/{}", self.base_url, self.provider.as_str())
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    fn provider(&self) -> LoginProvider {
        self.provider
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<ProviderIdentity, AuthError> {
        let network = |e: reqwest::Error| AuthError::Network {
            provider: self.provider,
            reason: e.to_string(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(credentials)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidCredentials {
                provider: self.provider,
                reason: format!("gateway answered {}", status),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                provider: self.provider,
                reason: format!("{}: {}", status, body),
            });
        }

        response.json::<ProviderIdentity>().await.map_err(network)
    }
}
