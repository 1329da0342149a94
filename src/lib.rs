pub mod assembler;
pub mod config;
pub mod cosine;
pub mod encoder;
pub mod error;
pub mod feedback;
pub mod grouping;
pub mod index;
pub mod partition;
pub mod persistence;
pub mod protocol;
pub mod sample;
pub mod scaler;
pub mod server;
pub mod transport;
pub mod types;
