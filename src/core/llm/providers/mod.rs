pub mod google;

pub use google::GeminiProvider;
