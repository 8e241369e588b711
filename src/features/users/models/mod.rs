mod user_profile;

pub use user_profile::{CreateUserProfile, Role, UserProfile};
