//! Direct per-classroom marks with a free status, kept for older clients.
//!
//! New clients use attendance sessions instead; every route here is marked
//! deprecated in the OpenAPI document.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
