pub mod schools;

// Re-export handler functions for use in routing
pub use schools::get as schools_get;
pub use schools::post as schools_post;
