use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::Confirm;
use crate::{
    auth::dto::AuthResponse,
    client::{ApiClient, ClientError, Session},
};

pub const MISSING_CREDENTIALS: &str = "Usuario y contraseña son obligatorios";

/// Something that can log a user in. Implementations store the token and
/// identity in `session()` on success.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError>;
    fn session(&self) -> &Arc<Session>;
}

#[async_trait]
impl Authenticator for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        ApiClient::login(self, username, password).await
    }

    fn session(&self) -> &Arc<Session> {
        ApiClient::session(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Pending,
    Authenticated { username: String },
}

/// Where to go after a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    CharacterList,
}

pub struct AuthFlow<A: Authenticator> {
    auth: A,
    state: AuthState,
    error: Option<String>,
}

impl<A: Authenticator> AuthFlow<A> {
    /// Starts from whatever the persisted session says.
    pub fn restore(auth: A) -> Self {
        let state = state_of(auth.session());
        Self {
            auth,
            state,
            error: None,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Inline error from the last attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_admin(&self) -> bool {
        self.auth.session().is_admin()
    }

    pub async fn submit(&mut self, username: &str, password: &str) -> Option<Landing> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            self.error = Some(MISSING_CREDENTIALS.to_string());
            return None;
        }
        self.state = AuthState::Pending;
        self.error = None;
        match self.auth.login(username, password).await {
            Ok(res) => {
                info!(username = %res.user.username, "signed in");
                self.state = AuthState::Authenticated {
                    username: res.user.username,
                };
                Some(Landing::CharacterList)
            }
            Err(e) => {
                warn!(error = %e, "sign in failed");
                // Whoever was signed in before stays signed in.
                self.state = state_of(self.auth.session());
                self.error = Some(e.user_message());
                None
            }
        }
    }

    /// Signs out if the user confirms. Returns whether it happened.
    pub fn logout(&mut self, confirm: &dyn Confirm) -> bool {
        if !confirm.confirm("¿Cerrar sesión?") {
            return false;
        }
        if let Err(e) = self.auth.session().clear() {
            warn!(error = %e, "could not clear session");
        }
        self.state = AuthState::Anonymous;
        self.error = None;
        true
    }

    /// Re-reads the session, e.g. after a rejected token cleared it.
    pub fn refresh_state(&mut self) -> &AuthState {
        if self.state != AuthState::Pending {
            self.state = state_of(self.auth.session());
        }
        &self.state
    }
}

fn state_of(session: &Session) -> AuthState {
    match session.read() {
        Some(data) => AuthState::Authenticated {
            username: data.username,
        },
        None => AuthState::Anonymous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{dto::PublicUser, Role};
    use crate::client::SessionData;
    use parking_lot::Mutex;
    use time::{macros::date, OffsetDateTime};
    use uuid::Uuid;

    struct FakeAuth {
        session: Arc<Session>,
        attempts: Mutex<u32>,
    }

    impl FakeAuth {
        fn new() -> Self {
            Self {
                session: Arc::new(Session::in_memory()),
                attempts: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Authenticator for FakeAuth {
        async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
            *self.attempts.lock() += 1;
            if password != "correct-horse" {
                return Err(ClientError::Unauthorized(
                    r#"{"error":"Credenciales inválidas"}"#.into(),
                ));
            }
            let user = PublicUser {
                id: Uuid::new_v4(),
                first_name: "Rick".into(),
                last_name: "Sanchez".into(),
                email: "rick@example.com".into(),
                username: username.to_string(),
                birth_date: date!(1950 - 03 - 04),
                role: Role::User,
                created_at: OffsetDateTime::UNIX_EPOCH,
            };
            self.session.write(SessionData {
                token: "tok".into(),
                username: user.username.clone(),
                role: Some(user.role),
            })?;
            Ok(AuthResponse {
                token: "tok".into(),
                user,
            })
        }

        fn session(&self) -> &Arc<Session> {
            &self.session
        }
    }

    #[tokio::test]
    async fn successful_login_lands_on_character_list() {
        let mut flow = AuthFlow::restore(FakeAuth::new());
        assert_eq!(flow.state(), &AuthState::Anonymous);

        let landing = flow.submit("rick", "correct-horse").await;
        assert_eq!(landing, Some(Landing::CharacterList));
        assert_eq!(
            flow.state(),
            &AuthState::Authenticated {
                username: "rick".into()
            }
        );
        assert!(flow.auth.session().is_authenticated());
        assert!(flow.error().is_none());
    }

    #[tokio::test]
    async fn failed_login_shows_server_message() {
        let mut flow = AuthFlow::restore(FakeAuth::new());
        assert_eq!(flow.submit("rick", "wrong").await, None);
        assert_eq!(flow.state(), &AuthState::Anonymous);
        assert_eq!(flow.error(), Some("Credenciales inválidas"));
        assert!(!flow.auth.session().is_authenticated());
    }

    #[tokio::test]
    async fn empty_fields_never_reach_the_server() {
        let mut flow = AuthFlow::restore(FakeAuth::new());
        assert_eq!(flow.submit("   ", "pw").await, None);
        assert_eq!(flow.submit("rick", "").await, None);
        assert_eq!(flow.error(), Some(MISSING_CREDENTIALS));
        assert_eq!(*flow.auth.attempts.lock(), 0);
    }

    #[tokio::test]
    async fn logout_needs_confirmation() {
        let mut flow = AuthFlow::restore(FakeAuth::new());
        flow.submit("rick", "correct-horse").await;

        assert!(!flow.logout(&|_: &str| false));
        assert!(flow.auth.session().is_authenticated());

        assert!(flow.logout(&|_: &str| true));
        assert_eq!(flow.state(), &AuthState::Anonymous);
        assert!(!flow.auth.session().is_authenticated());
    }

    #[test]
    fn restore_picks_up_persisted_session() {
        let auth = FakeAuth::new();
        auth.session
            .write(SessionData {
                token: "tok".into(),
                username: "morty".into(),
                role: Some(Role::Admin),
            })
            .unwrap();
        let flow = AuthFlow::restore(auth);
        assert_eq!(
            flow.state(),
            &AuthState::Authenticated {
                username: "morty".into()
            }
        );
        assert!(flow.is_admin());
    }

    #[tokio::test]
    async fn failed_relogin_keeps_the_current_user() {
        let mut flow = AuthFlow::restore(FakeAuth::new());
        flow.submit("rick", "correct-horse").await;

        assert_eq!(flow.submit("morty", "wrong").await, None);
        let signed_in = AuthState::Authenticated {
            username: "rick".into(),
        };
        assert_eq!(flow.state(), &signed_in);
        assert_eq!(flow.error(), Some("Credenciales inválidas"));
        assert_eq!(flow.refresh_state(), &signed_in);
    }

    #[tokio::test]
    async fn refresh_follows_a_cleared_session() {
        let mut flow = AuthFlow::restore(FakeAuth::new());
        flow.submit("rick", "correct-horse").await;
        flow.auth.session().clear().unwrap();
        assert_eq!(flow.refresh_state(), &AuthState::Anonymous);
    }
}
