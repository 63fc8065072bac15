pub mod gravatar;

pub use gravatar::GravatarResolver;
