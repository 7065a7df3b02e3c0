pub mod autoload_action;
pub mod autoload_entry;
pub mod operator;
