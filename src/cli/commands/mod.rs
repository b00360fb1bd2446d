pub mod auth;
pub mod db;
pub mod schools;
pub mod students;
