pub mod context;
pub mod publishable_key;
pub mod token;

pub use context::ExtensionContext;
pub use publishable_key::{InstanceType, PublishableKey};
pub use token::SessionToken;
