pub mod delete_autoload;
pub mod disable_autoload;
pub mod handle_autoload_action;
pub mod list_autoloads;

pub use delete_autoload::DeleteAutoloadUseCase;
pub use disable_autoload::DisableAutoloadUseCase;
pub use handle_autoload_action::{ActionOutcome, ActionQuery, HandleAutoloadActionUseCase};
pub use list_autoloads::ListAutoloadsUseCase;
