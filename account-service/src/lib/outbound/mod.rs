pub mod avatar;
pub mod cache;
pub mod email;
pub mod repositories;
