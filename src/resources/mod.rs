pub mod dns;
pub mod secret;
pub mod sql;

pub use dns::SystemResolver;
pub use secret::{FileCredentialStore, generate_password};
pub use sql::{MysqlClient, SqlError};
