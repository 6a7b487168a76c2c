//! Account actions: register, login, logout, profile

use tracing::info;

use crate::gateway::ApiClient;
use crate::models::{Empty, LoginPayload, ProfileForm, RegisterForm, User, UserPayload};
use crate::notification::Notifier;
use crate::session::SessionContext;

use super::ActionResult;

/// Store driving the session through the auth endpoints
#[derive(Clone)]
pub struct AuthStore {
    api: ApiClient,
    notifier: Notifier,
}

impl AuthStore {
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        Self { api, notifier }
    }

    fn session(&self) -> &SessionContext {
        self.api.session()
    }

    pub fn user(&self) -> Option<User> {
        self.session().user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    /// Create an account; does not log in
    pub async fn register(&self, form: &RegisterForm) -> ActionResult {
        let response = self.api.post::<UserPayload, _>("/auth/register", form).await;
        if !response.success {
            let result = ActionResult::from_failure(&response);
            self.notifier.error(result.error.clone().unwrap_or_default());
            return result;
        }

        let message = response
            .message
            .unwrap_or_else(|| "Registration successful".to_string());
        self.notifier.success(message.clone());
        ActionResult::ok(message)
    }

    /// Exchange credentials for a token and start the session
    pub async fn login(&self, email: &str, password: &str) -> ActionResult {
        let body = serde_json::json!({"email": email, "password": password});
        let response = self.api.post::<LoginPayload, _>("/auth/login", &body).await;

        match response.data {
            Some(payload) if response.success && !payload.token.is_empty() => {
                info!("Logged in as user {}", payload.user.id);
                let message = format!("Welcome back, {}!", payload.user.name);
                self.session().login(payload.user, payload.token);
                self.notifier.success(message.clone());
                ActionResult::ok(message)
            }
            _ => {
                let result = if response.status == Some(401) {
                    ActionResult::fail("Invalid email or password.")
                } else {
                    ActionResult::from_failure(&response)
                };
                self.notifier.error(result.error.clone().unwrap_or_default());
                result
            }
        }
    }

    /// End the session. Local state is cleared even when the server call fails.
    pub async fn logout(&self) -> ActionResult {
        if self.session().is_authenticated() {
            let response = self.api.post::<Empty, _>("/auth/logout", &()).await;
            if !response.success {
                info!("Server logout failed, clearing local session anyway");
            }
        }

        self.session().logout();
        self.notifier.info("You have been logged out.");
        ActionResult::ok("You have been logged out.")
    }

    /// Update name, email and optionally the password
    pub async fn update_profile(&self, form: &ProfileForm) -> ActionResult {
        let response = self.api.post::<UserPayload, _>("/auth/update", form).await;
        match response.data {
            Some(payload) if response.success => {
                self.session().update_user(payload.user);
                let message = response
                    .message
                    .unwrap_or_else(|| "Profile updated successfully".to_string());
                self.notifier.success(message.clone());
                ActionResult::ok(message)
            }
            _ => {
                let result = ActionResult::from_failure(&response);
                self.notifier.error(result.error.clone().unwrap_or_default());
                result
            }
        }
    }

    /// Reload the profile; a rejected token ends the session
    pub async fn refresh_user(&self) -> ActionResult {
        if !self.session().is_authenticated() {
            return ActionResult::fail("Not logged in.");
        }

        let response = self.api.get::<UserPayload>("/auth/user", &[]).await;
        match response.data {
            Some(payload) if response.success => {
                self.session().update_user(payload.user);
                ActionResult::ok("Profile loaded")
            }
            _ => {
                if response.status == Some(401) {
                    self.session().logout();
                    self.notifier.warning("Your session has expired. Please log in again.");
                }
                ActionResult::from_failure(&response)
            }
        }
    }
}
