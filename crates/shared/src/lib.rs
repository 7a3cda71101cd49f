mod error;
pub use error::AppError;

mod env;
pub use env::APP_ENV;

mod message;
pub use message::{Message, MessageRole};
