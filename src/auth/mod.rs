//! Mock sign-in session and the bearer guard protecting dashboard routes.
//!
//! Tokens are compared in constant time to mitigate timing attacks.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::SessionRepository;
use crate::errors::AppError;
use crate::models::{
    LoginRequest, SessionResponse, SignupRequest, SocialLinks, UpdateProfileRequest, User,
};

/// Single-user session: signing in replaces whoever was signed in before.
pub struct AuthSession {
    repo: SessionRepository,
    clock: Arc<dyn Clock>,
    latency: Duration,
}

impl AuthSession {
    pub fn new(repo: SessionRepository, clock: Arc<dyn Clock>, latency: Duration) -> Self {
        Self {
            repo,
            clock,
            latency,
        }
    }

    /// Sign in as a demo user named after the email's local part.
    pub async fn login(&self, request: LoginRequest) -> Result<SessionResponse, AppError> {
        request.validate().map_err(|fields| AppError::Validation {
            message: "Invalid email or password".into(),
            fields,
        })?;
        self.clock.sleep(self.latency).await;

        let name = request
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string();
        let user = User {
            id: "user-123".into(),
            name,
            email: request.email,
            title: Some("Software Engineer".into()),
            company: Some("Tech Company".into()),
            location: Some("San Francisco, CA".into()),
            bio: Some("Passionate about web development and new technologies.".into()),
            phone: Some("+1 (555) 123-4567".into()),
            website: Some("https://example.com".into()),
            social_links: Some(SocialLinks {
                linkedin: "https://linkedin.com/in/example".into(),
                twitter: "https://twitter.com/example".into(),
                github: "https://github.com/example".into(),
                facebook: "https://facebook.com/example".into(),
            }),
            ..Default::default()
        };

        tracing::info!(user_id = %user.id, "User signed in");
        self.start(user).await
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<SessionResponse, AppError> {
        request.validate().map_err(|fields| AppError::Validation {
            message: "Please fix the errors in the form".into(),
            fields,
        })?;
        self.clock.sleep(self.latency).await;

        let suffix = Uuid::new_v4().simple().to_string();
        let user = User {
            id: format!("user-{}", &suffix[..9]),
            name: request.name.trim().to_string(),
            email: request.email,
            title: Some("Software Developer".into()),
            company: Some("New Company".into()),
            location: Some("New York, NY".into()),
            bio: Some("Just joined CertManager to organize my certificates!".into()),
            social_links: Some(SocialLinks::default()),
            ..Default::default()
        };

        tracing::info!(user_id = %user.id, "User signed up");
        self.start(user).await
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.repo.clear().await?;
        tracing::info!("User signed out");
        Ok(())
    }

    pub async fn current(&self) -> Result<Option<User>, AppError> {
        self.repo.load_user().await
    }

    /// Merge `update` into the signed-in user.
    pub async fn update_profile(&self, update: UpdateProfileRequest) -> Result<User, AppError> {
        let mut user = self
            .current()
            .await?
            .ok_or_else(|| AppError::Unauthorized("Not signed in".into()))?;
        user.apply(update);
        self.repo.save_user(&user).await?;
        Ok(user)
    }

    /// `true` when `provided` is the token of the active session.
    pub async fn verify(&self, provided: &str) -> Result<bool, AppError> {
        Ok(match self.repo.load_token().await? {
            Some(expected) => constant_time_compare(provided, &expected),
            None => false,
        })
    }

    async fn start(&self, user: User) -> Result<SessionResponse, AppError> {
        let token = Uuid::new_v4().to_string();
        self.repo.save(&user, &token).await?;
        Ok(SessionResponse { user, token })
    }
}

/// Bearer token guard for dashboard routes.
pub async fn session_auth_layer(auth: Arc<AuthSession>, request: Request, next: Next) -> Response {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string());

    let Some(token) = bearer else {
        return unauthorized_response("Missing session token");
    };

    match auth.verify(&token).await {
        Ok(true) => next.run(request).await,
        Ok(false) => unauthorized_response("Invalid or expired session"),
        Err(err) => err.into_response(),
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::db::init_database;
    use chrono::Utc;
    use tempfile::TempDir;

    async fn session() -> (AuthSession, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("auth.sqlite")).await.unwrap();
        let auth = AuthSession::new(
            SessionRepository::new(pool),
            Arc::new(ManualClock::new(Utc::now())),
            Duration::from_millis(1000),
        );
        (auth, dir)
    }

    fn login_request(email: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: "secret".into(),
        }
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("tok-123", "tok-123"));
        assert!(!constant_time_compare("tok-123", "tok-124"));
        assert!(!constant_time_compare("short", "much-longer-token"));
        assert!(!constant_time_compare("", "not-empty"));
    }

    #[tokio::test]
    async fn test_login_names_user_after_email() {
        let (auth, _dir) = session().await;
        let session = auth.login(login_request("grace@navy.mil")).await.unwrap();

        assert_eq!(session.user.name, "grace");
        assert_eq!(session.user.email, "grace@navy.mil");
        assert!(auth.verify(&session.token).await.unwrap());
        assert!(!auth.verify("forged").await.unwrap());
        assert_eq!(auth.current().await.unwrap(), Some(session.user));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_email() {
        let (auth, _dir) = session().await;
        let err = auth.login(login_request("grace")).await.unwrap_err();
        match err {
            AppError::Validation { fields, .. } => {
                assert_eq!(fields["email"], "Invalid email format")
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(auth.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_signup_profile_and_logout() {
        let (auth, _dir) = session().await;
        let session = auth
            .signup(SignupRequest {
                name: "Grace Hopper".into(),
                email: "grace@navy.mil".into(),
                password: "cobol-1959".into(),
            })
            .await
            .unwrap();
        assert!(session.user.id.starts_with("user-"));
        assert_eq!(session.user.id.len(), "user-".len() + 9);

        let updated = auth
            .update_profile(UpdateProfileRequest {
                company: Some("US Navy".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.company.as_deref(), Some("US Navy"));
        assert_eq!(updated.name, "Grace Hopper");

        auth.logout().await.unwrap();
        assert!(auth.current().await.unwrap().is_none());
        assert!(!auth.verify(&session.token).await.unwrap());
        assert!(matches!(
            auth.update_profile(UpdateProfileRequest::default()).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_new_login_invalidates_old_token() {
        let (auth, _dir) = session().await;
        let first = auth.login(login_request("a@example.com")).await.unwrap();
        let second = auth.login(login_request("b@example.com")).await.unwrap();
        assert!(!auth.verify(&first.token).await.unwrap());
        assert!(auth.verify(&second.token).await.unwrap());
    }
}
