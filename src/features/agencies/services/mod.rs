pub mod agency_service;

pub use agency_service::*;
