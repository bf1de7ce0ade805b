pub mod app;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod format;
pub mod models;
pub mod numeric;
pub mod series;
pub mod source;
