pub mod autoload_domain_service;
pub mod confirmation_token;

pub use autoload_domain_service::AutoloadDomainService;
pub use confirmation_token::ConfirmationTokenService;
