pub mod config;
pub mod locales;
pub mod setup;
pub mod transcribe;
