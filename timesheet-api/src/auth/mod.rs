mod extractor;
mod password;
mod router;
mod token;

pub use extractor::AuthUser;
pub use password::PasswordHasher;
pub use router::router;
pub use token::JwtIssuer;
