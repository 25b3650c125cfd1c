//! Session token issuance.
//!
//! `POST /jwt` exchanges a claims object for a signed token carried in the
//! `token` cookie; `GET /logout` clears that cookie. Nothing in the service
//! reads the cookie back.
//!
//! # Cookie flags
//!
//! | Environment | `HttpOnly` | `Secure` | `SameSite` |
//! |---|---|---|---|
//! | production | yes | yes | `None` |
//! | development | yes | no | `Strict` |

pub mod token;

use tower_sessions::cookie::{Cookie, SameSite};

use contest_hub_core::Document;

use crate::config::Environment;

pub use token::{TOKEN_LIFETIME_DAYS, TokenError, TokenSigner};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE_NAME: &str = "token";

/// Issues and clears the session cookie.
#[derive(Debug, Clone)]
pub struct SessionIssuer {
    signer: TokenSigner,
    environment: Environment,
}

impl SessionIssuer {
    #[must_use]
    pub const fn new(signer: TokenSigner, environment: Environment) -> Self {
        Self {
            signer,
            environment,
        }
    }

    /// Sign `claims` and wrap the token in the session cookie.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if signing fails.
    pub fn issue(&self, claims: &Document) -> Result<Cookie<'static>, TokenError> {
        let token = self.signer.sign(claims)?;
        Ok(self.cookie(token))
    }

    /// A cookie that makes the browser drop the session token immediately.
    #[must_use]
    pub fn revoke(&self) -> Cookie<'static> {
        let mut cookie = self.cookie(String::new());
        cookie.make_removal();
        cookie
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        let production = self.environment.is_production();

        Cookie::build((TOKEN_COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .secure(production)
            .same_site(if production {
                SameSite::None
            } else {
                SameSite::Strict
            })
            .build()
    }
}
