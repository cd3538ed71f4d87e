pub mod add_school;
pub mod home;
pub mod show_schools;

pub use add_school::{form as add_school_form, submit as add_school_submit};
pub use home::home;
pub use show_schools::show_schools;
