// handlers/mod.rs - Request handlers
//
// api    → JSON endpoints under /api
// pages  → server-rendered HTML (home, form, gallery)
// health → connectivity probe
pub mod api;
pub mod form;
pub mod health;
pub mod pages;

pub use health::health;
