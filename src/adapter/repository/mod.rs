pub mod settings_mysql;
