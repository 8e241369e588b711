//! Responding agencies.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/agencies` | List agencies |
//! | GET | `/api/agencies/{id}` | Get an agency |
//! | POST | `/api/admin/agencies` | Create an agency (admin) |
//! | PUT | `/api/admin/agencies/{id}` | Update an agency (admin) |
//! | DELETE | `/api/admin/agencies/{id}` | Delete an agency (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::AgencyService;
