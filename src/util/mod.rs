pub mod markdown;
pub mod unicode;
