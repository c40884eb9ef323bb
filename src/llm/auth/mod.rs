//! Credentials for Google-hosted model endpoints

pub mod adc;

pub use adc::AuthenticationManager;
