//! User profiles and access.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/me` | Get own profile |
//! | POST | `/api/users/me` | Register as a citizen |
//! | PATCH | `/api/users/me` | Update display name |
//! | GET | `/api/admin/users` | List users (admin) |
//! | PATCH | `/api/admin/users/{id}` | Change role / agency / active flag (admin) |

pub mod access;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use access::AccessResolver;
pub use repository::{PgProfileRepository, ProfileRepository};
pub use services::UserProfileService;
