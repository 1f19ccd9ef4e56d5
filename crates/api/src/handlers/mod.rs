pub mod sessions;
pub mod uploads;
