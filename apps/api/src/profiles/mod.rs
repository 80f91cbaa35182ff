pub mod avatar;
pub mod handlers;

pub use avatar::AvatarResolver;
