mod api;
mod conn;
mod core;
mod store;
mod util;

pub use api::{make_app, AppState};
pub use util::config::Config;
