// handlers/public/auth/mod.rs - Token acquisition

pub mod login;
pub mod logout;
pub mod register;

pub use login::login_post;
pub use logout::logout_post;
pub use register::register_post;
