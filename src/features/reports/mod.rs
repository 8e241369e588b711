//! Emergency reports.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/reports` | Submit a report (citizens, multipart) |
//! | GET | `/api/reports` | List reports in scope |
//! | GET | `/api/reports/{id}` | Get a report |
//! | PATCH | `/api/reports/{id}` | Edit own pending report |
//! | PATCH | `/api/reports/{id}/status` | Change status |
//! | GET | `/api/reports/{id}/updates` | Audit history |
//! | PUT | `/api/admin/reports/{id}/agencies` | Assign agencies (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod submission;

pub use repository::{PgReportRepository, ReportRepository};
pub use services::ReportService;
pub use submission::SubmissionService;
