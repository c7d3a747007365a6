//! Signed-in user model.

use serde::{Deserialize, Serialize};

use super::FieldErrors;

/// Minimum accepted password length on sign-up.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Links shown on the public profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub facebook: String,
}

/// The account the session belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
}

impl User {
    /// Merge the provided profile fields over the current ones.
    pub fn apply(&mut self, update: UpdateProfileRequest) {
        let UpdateProfileRequest {
            name,
            email,
            profile_picture,
            title,
            company,
            location,
            bio,
            phone,
            website,
            social_links,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        self.profile_picture = profile_picture.or(self.profile_picture.take());
        self.title = title.or(self.title.take());
        self.company = company.or(self.company.take());
        self.location = location.or(self.location.take());
        self.bio = bio.or(self.bio.take());
        self.phone = phone.or(self.phone.take());
        self.website = website.or(self.website.take());
        self.social_links = social_links.or(self.social_links.take());
    }
}

/// Request body for signing in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&self.email, &mut errors);
        if self.password.is_empty() {
            errors.insert("password".into(), "Password is required".into());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Request body for creating an account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name".into(), "Full name is required".into());
        }
        check_email(&self.email, &mut errors);
        if self.password.is_empty() {
            errors.insert("password".into(), "Password is required".into());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                "password".into(),
                "Password must be at least 8 characters".into(),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if email.is_empty() {
        errors.insert("email".into(), "Email is required".into());
    } else if !looks_like_email(email) {
        errors.insert("email".into(), "Invalid email format".into());
    }
}

/// `local@host.tld` with no whitespace in any part.
pub fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    [local, host, tld]
        .iter()
        .all(|part| !part.is_empty() && !part.contains(char::is_whitespace))
}

/// Partial profile update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub social_links: Option<SocialLinks>,
}

/// A signed-in user and the bearer token that authorizes dashboard calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("ada@example.com"));
        assert!(looks_like_email("a.b@mail.example.org"));
        assert!(!looks_like_email("ada.example.com"));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ada@.com"));
    }

    #[test]
    fn test_signup_validation() {
        let request = SignupRequest {
            name: " ".into(),
            email: "bad".into(),
            password: "short".into(),
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors["name"], "Full name is required");
        assert_eq!(errors["email"], "Invalid email format");
        assert_eq!(errors["password"], "Password must be at least 8 characters");

        let request = SignupRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "analytical".into(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_apply_keeps_unset_fields() {
        let mut user = User {
            id: "user-1".into(),
            name: "ada".into(),
            email: "ada@example.com".into(),
            title: Some("Engineer".into()),
            ..Default::default()
        };
        user.apply(UpdateProfileRequest {
            name: Some("Ada Lovelace".into()),
            bio: Some("First programmer".into()),
            ..Default::default()
        });
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.title.as_deref(), Some("Engineer"));
        assert_eq!(user.bio.as_deref(), Some("First programmer"));
        assert_eq!(user.email, "ada@example.com");
    }
}
