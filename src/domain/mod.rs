pub mod asset;
pub mod decimal;
pub mod deposit;
pub mod encoding;
pub mod pipeline;
pub mod ports;
pub mod registration;
