pub mod rate_converter;
pub mod sources;
