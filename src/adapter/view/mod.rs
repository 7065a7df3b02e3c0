pub mod listing;

pub use listing::{render_listing, AdminPage};
