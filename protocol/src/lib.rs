mod context_token;
pub use context_token::ContextToken;
pub use context_token::InvalidContextToken;
pub mod autocomplete;
pub mod context;
