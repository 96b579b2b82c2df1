//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate_token;
pub mod config;
pub mod deactivate_account;
pub mod delete_user;
pub mod federated_sign_in;
pub mod issue_tokens;
pub mod provision_user;
pub mod register_local_user;
pub mod revoke_token;

// Re-exports
pub use authenticate_token::{AuthenticateTokenUseCase, AuthenticatedPrincipal};
pub use config::IdentityConfig;
pub use deactivate_account::DeactivateAccountUseCase;
pub use delete_user::DeleteUserUseCase;
pub use federated_sign_in::{FederatedSignInInput, FederatedSignInOutput, FederatedSignInUseCase};
pub use issue_tokens::{IssueTokensUseCase, IssuedTokens};
pub use provision_user::{ProvisionUserInput, ProvisionUserUseCase};
pub use register_local_user::{
    RegisterLocalUserInput, RegisterLocalUserOutput, RegisterLocalUserUseCase,
};
pub use revoke_token::RevokeTokenUseCase;
