pub mod auth;
pub mod categories;
pub mod companies;
pub mod contact;
pub mod departments;
pub mod health;
pub mod imports;
pub mod live;
pub mod news;
pub mod notifications;
pub mod products;
pub mod resources;
pub mod settings;
pub mod uploads;
pub mod users;

#[cfg(test)]
mod tests;
