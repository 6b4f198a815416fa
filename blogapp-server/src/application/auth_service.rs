use crate::data::user_repository::UserRepository;
use crate::domain::user::{LoginUserRequest, RegisterUserRequest, UserResponse, PASSWORD_MIN_CHARS};
use crate::domain::{DomainError, FieldErrors, User};
use crate::infrastructure::jwt::JwtService;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::SaltString;
use rand::rngs::OsRng;
use std::sync::Arc;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repo,
            jwt_service,
        }
    }

    pub async fn register(
        &self,
        mut req: RegisterUserRequest,
    ) -> Result<(String, UserResponse), DomainError> {
        req.username = req.username.trim().to_string();
        req.email = req.email.trim().to_string();
        validate_registration(&req)?;

        tracing::debug!("Registering username: {}", req.username);

        if self.user_repo.find_by_username(&req.username).await?.is_some() {
            tracing::warn!("Registration failed: username already exists");
            return Err(DomainError::UserAlreadyExists);
        }
        if self.user_repo.find_by_email(&req.email).await?.is_some() {
            tracing::warn!("Registration failed: email already exists");
            return Err(DomainError::UserAlreadyExists);
        }

        let password_hash = hash_password(&req.password)?;
        let user = self.user_repo.create(req, password_hash).await?;

        let token = self.issue_token(&user)?;
        tracing::info!(
            "User registered successfully: id={}, username={}",
            user.id,
            user.username
        );

        Ok((token, UserResponse::from(user)))
    }

    pub async fn login(
        &self,
        req: LoginUserRequest,
    ) -> Result<(String, UserResponse), DomainError> {
        let user = match self.user_repo.find_by_username(req.username.trim()).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Login failed: unknown username {}", req.username);
                return Err(DomainError::InvalidCredentials);
            }
        };

        let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
            tracing::error!("Invalid password hash format: {}", e);
            DomainError::InternalError(format!("Invalid password hash: {}", e))
        })?;

        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Invalid password for user {}", user.username);
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        tracing::info!(
            "User logged in successfully: id={}, username={}",
            user.id,
            user.username
        );

        Ok((token, UserResponse::from(user)))
    }

    fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.jwt_service
            .generate_token(user.id, user.username.clone())
            .inspect_err(|e| tracing::error!("JWT generation failed: {:?}", e))
    }
}

fn validate_registration(req: &RegisterUserRequest) -> Result<(), DomainError> {
    let mut errors = FieldErrors::new();

    if req.username.is_empty() {
        errors.add("username", "This field may not be blank.");
    }
    if req.email.is_empty() {
        errors.add("email", "This field may not be blank.");
    } else if !req.email.contains('@') {
        errors.add("email", "Enter a valid email address.");
    }
    if req.password.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            "password",
            format!(
                "Ensure this field has at least {} characters.",
                PASSWORD_MIN_CHARS
            ),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::ValidationFailed(errors))
    }
}

fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            DomainError::InternalError(format!("Password hashing failed: {}", e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryUserRepository;

    fn service() -> AuthService {
        let jwt = Arc::new(JwtService::new("auth-service-test-secret-0123456789").unwrap());
        AuthService::new(Arc::new(InMemoryUserRepository::new()), jwt)
    }

    fn registration(username: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_login_round_trip() {
        let auth = service();
        let (token, user) = auth
            .register(registration("testuser1", "testpass1"))
            .await
            .unwrap();
        assert!(!token.is_empty());
        assert_eq!(user.username, "testuser1");

        let (_, logged_in) = auth
            .login(LoginUserRequest {
                username: "testuser1".to_string(),
                password: "testpass1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let auth = service();
        auth.register(registration("testuser1", "testpass1"))
            .await
            .unwrap();

        for (username, password) in [("testuser1", "wrong-pass"), ("ghost", "testpass1")] {
            let err = auth
                .login(LoginUserRequest {
                    username: username.to_string(),
                    password: password.to_string(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn duplicate_and_invalid_registrations_are_rejected() {
        let auth = service();
        auth.register(registration("testuser1", "testpass1"))
            .await
            .unwrap();

        assert!(matches!(
            auth.register(registration("testuser1", "testpass1")).await,
            Err(DomainError::UserAlreadyExists)
        ));

        match auth.register(registration("  ", "short")).await {
            Err(DomainError::ValidationFailed(errors)) => {
                assert!(errors.contains("username"));
                assert!(errors.contains("password"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
