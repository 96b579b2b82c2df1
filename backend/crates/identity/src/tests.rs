//! Use-case flows for the identity crate, run against the in-memory repository

mod support {
    use std::sync::{Arc, Once};

    use crate::application::IdentityConfig;
    use crate::infra::InMemoryUserRepository;

    static TRACING: Once = Once::new();

    pub fn init_tracing() {
        TRACING.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        });
    }

    pub fn repo() -> Arc<InMemoryUserRepository> {
        init_tracing();
        Arc::new(InMemoryUserRepository::new())
    }

    pub fn config() -> Arc<IdentityConfig> {
        Arc::new(IdentityConfig::default())
    }
}

mod registration_tests {
    use super::support::*;
    use crate::application::*;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{auth_provider::AuthProvider, user_role::UserRole};
    use crate::error::IdentityError;

    fn input(email: &str) -> RegisterLocalUserInput {
        RegisterLocalUserInput {
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_local_user() {
        let repo = repo();
        let register = RegisterLocalUserUseCase::new(repo.clone());

        let output = register.execute(input(" Ada@Example.com ")).await.unwrap();
        assert_eq!(output.email, "ada@example.com");

        let user = repo.find_by_id(&output.user_id).await.unwrap().unwrap();
        assert_eq!(user.auth_provider(), AuthProvider::Local);
        assert!(user.has_role(UserRole::User));
        assert!(!user.is_email_verified());
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let repo = repo();
        let register = RegisterLocalUserUseCase::new(repo.clone());
        register.execute(input("ada@example.com")).await.unwrap();

        let err = register
            .execute(input("ADA@example.com"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IdentityError::EmailTaken));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let register = RegisterLocalUserUseCase::new(repo());
        let err = register.execute(input("nope")).await.err().unwrap();
        assert!(matches!(err, IdentityError::Validation(_)));
    }

    #[tokio::test]
    async fn test_provision_user_with_roles() {
        let repo = repo();
        let provision = ProvisionUserUseCase::new(repo.clone());

        let user_id = provision
            .execute(ProvisionUserInput {
                email: "ops@example.com".to_string(),
                password_hash: None,
                first_name: "Ops".to_string(),
                last_name: "Team".to_string(),
                provider: AuthProvider::Local,
                roles: vec![UserRole::Admin],
            })
            .await
            .unwrap();

        let user = repo.find_by_id(&user_id).await.unwrap().unwrap();
        assert!(user.is_email_verified());
        assert!(user.has_role(UserRole::Admin));
        assert!(!user.has_role(UserRole::User));
    }
}

mod federation_tests {
    use super::support::*;
    use crate::application::*;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{attributes::Attributes, auth_provider::AuthProvider};
    use crate::error::IdentityError;
    use serde_json::json;

    fn claims(provider: &str, provider_id: &str, email: &str, name: &str) -> FederatedSignInInput {
        FederatedSignInInput {
            provider: provider.to_string(),
            provider_id: provider_id.to_string(),
            email: email.to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            attributes: [("sub", json!(provider_id)), ("name", json!(name))]
                .into_iter()
                .collect::<Attributes>(),
        }
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_account() {
        let repo = repo();
        let sign_in = FederatedSignInUseCase::new(repo.clone());

        let output = sign_in
            .execute(claims("GitHub", "gh-1", "grace@example.com", "Grace"))
            .await
            .unwrap();
        assert!(output.created);

        let user = repo
            .find_by_provider(AuthProvider::Github, "gh-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id(), output.user_id);
        assert!(user.is_email_verified());
        assert!(user.password().is_none());
        assert_eq!(user.attributes().get_str("name"), Some("Grace"));
    }

    #[tokio::test]
    async fn test_repeat_sign_in_refreshes_claims() {
        let repo = repo();
        let sign_in = FederatedSignInUseCase::new(repo.clone());
        let first = sign_in
            .execute(claims("google", "g-1", "grace@example.com", "Grace"))
            .await
            .unwrap();

        let second = sign_in
            .execute(claims("google", "g-1", "grace@example.com", "Amazing Grace"))
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(first.user_id, second.user_id);

        let user = repo.find_by_id(&first.user_id).await.unwrap().unwrap();
        assert_eq!(user.attributes().get_str("name"), Some("Amazing Grace"));
        assert_eq!(user.version(), 1);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let sign_in = FederatedSignInUseCase::new(repo());
        let err = sign_in
            .execute(claims("facebook", "f-1", "x@example.com", "X"))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, IdentityError::UnknownProvider(ref raw) if raw == "facebook"));
        assert_eq!(err.code(), Some("invalid_provider"));
    }

    #[tokio::test]
    async fn test_local_is_not_a_federated_provider() {
        let sign_in = FederatedSignInUseCase::new(repo());
        let err = sign_in
            .execute(claims("local", "l-1", "x@example.com", "X"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IdentityError::Validation(_)));
    }

    #[tokio::test]
    async fn test_email_owned_by_local_account() {
        let repo = repo();
        RegisterLocalUserUseCase::new(repo.clone())
            .execute(RegisterLocalUserInput {
                email: "grace@example.com".to_string(),
                password_hash: "hash".to_string(),
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
            })
            .await
            .unwrap();

        let err = FederatedSignInUseCase::new(repo.clone())
            .execute(claims("google", "g-9", "grace@example.com", "Grace"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IdentityError::EmailTaken));
    }

    #[tokio::test]
    async fn test_disabled_federated_account() {
        let repo = repo();
        let sign_in = FederatedSignInUseCase::new(repo.clone());
        let output = sign_in
            .execute(claims("google", "g-1", "grace@example.com", "Grace"))
            .await
            .unwrap();
        DeactivateAccountUseCase::new(repo.clone())
            .execute(&output.user_id)
            .await
            .unwrap();

        let err = sign_in
            .execute(claims("google", "g-1", "grace@example.com", "Grace"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IdentityError::AccountDisabled));
    }
}

mod token_flow_tests {
    use super::support::*;
    use crate::application::*;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{UserId, token_type::TokenType};
    use crate::error::IdentityError;
    use chrono::Utc;
    use std::sync::Arc;

    use crate::infra::InMemoryUserRepository;

    async fn registered(repo: &Arc<InMemoryUserRepository>) -> UserId {
        RegisterLocalUserUseCase::new(repo.clone())
            .execute(RegisterLocalUserInput {
                email: "ada@example.com".to_string(),
                password_hash: "hash".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            })
            .await
            .unwrap()
            .user_id
    }

    #[tokio::test]
    async fn test_issue_and_authenticate() {
        let repo = repo();
        let user_id = registered(&repo).await;
        let issued = IssueTokensUseCase::new(repo.clone(), config())
            .execute(&user_id)
            .await
            .unwrap();

        assert_ne!(issued.access_token, issued.refresh_token);
        assert!(issued.access_expires_at > Utc::now());
        assert!(issued.refresh_expires_at > issued.access_expires_at);

        let authenticate = AuthenticateTokenUseCase::new(repo.clone());
        let principal = authenticate.execute(&issued.access_token).await.unwrap();
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.email, "ada@example.com");
        assert_eq!(principal.token_type, TokenType::Access);
        assert!(principal.has_authority("ROLE_USER"));

        let refresh = authenticate.execute(&issued.refresh_token).await.unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
    }

    #[tokio::test]
    async fn test_unknown_bearer() {
        let authenticate = AuthenticateTokenUseCase::new(repo());
        for bearer in ["missing", "", "has space"] {
            let err = authenticate.execute(bearer).await.err().unwrap();
            assert!(matches!(err, IdentityError::TokenNotFound), "{bearer:?}");
        }
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected() {
        let repo = repo();
        let user_id = registered(&repo).await;
        let issued = IssueTokensUseCase::new(repo.clone(), config())
            .execute(&user_id)
            .await
            .unwrap();

        let revoke = RevokeTokenUseCase::new(repo.clone());
        assert!(revoke.execute(&issued.access_token).await.unwrap());
        assert!(!revoke.execute(&issued.access_token).await.unwrap());

        let err = AuthenticateTokenUseCase::new(repo.clone())
            .execute(&issued.access_token)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IdentityError::TokenInvalid));
        assert_eq!(err.code(), Some("invalid_token"));

        // refresh token is untouched
        AuthenticateTokenUseCase::new(repo.clone())
            .execute(&issued.refresh_token)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reissue_purges_revoked_tokens() {
        let repo = repo();
        let user_id = registered(&repo).await;
        let issue = IssueTokensUseCase::new(repo.clone(), config());
        let first = issue.execute(&user_id).await.unwrap();

        RevokeTokenUseCase::new(repo.clone())
            .execute(&first.access_token)
            .await
            .unwrap();
        issue.execute(&user_id).await.unwrap();

        let user = repo.find_by_id(&user_id).await.unwrap().unwrap();
        assert_eq!(user.tokens().len(), 3);
        assert!(user.token(&first.access_token).is_none());
        assert!(user.token(&first.refresh_token).is_some());
    }

    #[tokio::test]
    async fn test_deactivation_cascade_is_persisted() {
        let repo = repo();
        let user_id = registered(&repo).await;
        let issue = IssueTokensUseCase::new(repo.clone(), config());
        let issued = issue.execute(&user_id).await.unwrap();

        let revoked = DeactivateAccountUseCase::new(repo.clone())
            .execute(&user_id)
            .await
            .unwrap();
        assert_eq!(revoked, 2);

        let user = repo.find_by_id(&user_id).await.unwrap().unwrap();
        assert!(!user.is_enabled());
        assert!(user.tokens().iter().all(|t| !t.is_valid()));

        let authenticate = AuthenticateTokenUseCase::new(repo.clone());
        for bearer in [&issued.access_token, &issued.refresh_token] {
            let err = authenticate.execute(bearer).await.err().unwrap();
            assert!(matches!(err, IdentityError::AccountDisabled));
        }

        let err = issue.execute(&user_id).await.err().unwrap();
        assert!(matches!(err, IdentityError::AccountDisabled));
    }

    #[tokio::test]
    async fn test_delete_user_removes_tokens() {
        let repo = repo();
        let user_id = registered(&repo).await;
        let issued = IssueTokensUseCase::new(repo.clone(), config())
            .execute(&user_id)
            .await
            .unwrap();

        let delete = DeleteUserUseCase::new(repo.clone());
        delete.execute(&user_id).await.unwrap();

        assert!(repo.find_by_token(&issued.access_token).await.unwrap().is_none());
        let err = delete.execute(&user_id).await.err().unwrap();
        assert!(matches!(err, IdentityError::UserNotFound));
    }

    #[tokio::test]
    async fn test_issue_with_out_of_range_ttl() {
        let repo = repo();
        let user_id = registered(&repo).await;
        let config = Arc::new(IdentityConfig {
            refresh_token_ttl: std::time::Duration::from_secs(10_000_000_000_000),
            ..IdentityConfig::default()
        });

        let err = IssueTokensUseCase::new(repo.clone(), config)
            .execute(&user_id)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IdentityError::Validation(_)));

        let user = repo.find_by_id(&user_id).await.unwrap().unwrap();
        assert!(user.tokens().is_empty());
        assert_eq!(user.version(), 0);
    }

    #[tokio::test]
    async fn test_issue_for_missing_user() {
        let err = IssueTokensUseCase::new(repo(), config())
            .execute(&UserId::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IdentityError::UserNotFound));
    }
}
