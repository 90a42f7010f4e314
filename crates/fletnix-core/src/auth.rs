//! Login, registration and logout

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::client::FletnixClient;
use crate::error::{FletnixError, Result};
use crate::router::Route;
use crate::session::Session;

const LOGIN_SUCCESSFUL: &str = "Login successful";
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const SERVER_ERROR: &str = "Server error. Please try again later.";
const REGISTRATION_SUCCESSFUL: &str = "Registration successful. Redirecting...";
const REGISTRATION_FAILED: &str = "Registration failed. Try again later.";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    age: u32,
}

/// Raw calls to the authentication endpoints
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Arc<FletnixClient>,
}

impl AuthClient {
    pub fn new(client: Arc<FletnixClient>) -> Self {
        Self { client }
    }

    /// `POST /login`; the payload is returned as sent, whatever its shape.
    pub async fn login(&self, email: &str, password: &str) -> Result<serde_json::Value> {
        let request = self
            .client
            .request(Method::POST, "/login")
            .json(&LoginRequest { email, password });
        self.client.send_json(request).await
    }

    /// `POST /register`
    pub async fn register(&self, email: &str, password: &str, age: u32) -> Result<serde_json::Value> {
        let request = self
            .client
            .request(Method::POST, "/register")
            .json(&RegisterRequest { email, password, age });
        self.client.send_json(request).await
    }
}

/// Result of a form submission: a message for the form, and where to go next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub message: String,
    /// `None` means stay on the current screen
    pub redirect: Option<Route>,
}

impl AuthOutcome {
    fn stay(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            redirect: None,
        }
    }

    fn go(message: impl Into<String>, route: Route) -> Self {
        Self {
            message: message.into(),
            redirect: Some(route),
        }
    }
}

/// Login/register/logout flows bound to a session
#[derive(Debug, Clone)]
pub struct Authenticator {
    client: AuthClient,
    session: Session,
}

impl Authenticator {
    pub fn new(client: AuthClient, session: Session) -> Self {
        Self { client, session }
    }

    /// Sign in and store the returned payload as the session record.
    ///
    /// Missing fields are rejected without a request. A 401 leaves the
    /// session untouched.
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        if email.is_empty() || password.is_empty() {
            return AuthOutcome::stay("Email and password are required");
        }

        match self.client.login(email, password).await {
            Ok(payload) => {
                if let Err(e) = self.session.store_payload(&payload) {
                    error!(error = %e, "failed to store session");
                    return AuthOutcome::stay(SERVER_ERROR);
                }
                info!(email, "logged in");
                let message = payload
                    .get("message")
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .unwrap_or(LOGIN_SUCCESSFUL);
                AuthOutcome::go(message, Route::Home)
            }
            Err(FletnixError::Unauthorized) => AuthOutcome::stay(INVALID_CREDENTIALS),
            Err(e) => {
                error!(error = %e, "login failed");
                AuthOutcome::stay(SERVER_ERROR)
            }
        }
    }

    /// Create an account. An age of zero counts as missing.
    pub async fn register(&self, email: &str, password: &str, age: Option<u32>) -> AuthOutcome {
        let missing = if email.is_empty() {
            Some("Email")
        } else if password.is_empty() {
            Some("Password")
        } else if age.unwrap_or(0) == 0 {
            Some("Age")
        } else {
            None
        };
        if let Some(field) = missing {
            return AuthOutcome::stay(format!("{} is required", field));
        }
        let age = age.unwrap_or_default();

        match self.client.register(email, password, age).await {
            Ok(_) => {
                info!(email, "registered");
                AuthOutcome::go(REGISTRATION_SUCCESSFUL, Route::Login)
            }
            Err(e) => {
                error!(error = %e, "registration failed");
                AuthOutcome::stay(e.user_message(REGISTRATION_FAILED))
            }
        }
    }

    /// Clear the session record and return to the login screen.
    pub fn logout(&self) -> Result<Route> {
        self.session.clear()?;
        info!("logged out");
        Ok(Route::Login)
    }
}
