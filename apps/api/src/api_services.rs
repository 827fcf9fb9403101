mod contact;
mod database;
mod sessions;
mod workspace;

pub use contact::build_contact_service;
pub use database::connect_and_migrate;
pub use sessions::build_postgres_session_layer;
pub use workspace::{WorkspaceSources, build_workspace};
