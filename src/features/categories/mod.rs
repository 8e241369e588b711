//! Emergency categories.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | List categories (public) |
//! | GET | `/api/categories/{id}` | Get a category (public) |
//! | POST | `/api/admin/categories` | Create a category (admin) |
//! | PUT | `/api/admin/categories/{id}` | Update a category (admin) |
//! | DELETE | `/api/admin/categories/{id}` | Delete a category (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
