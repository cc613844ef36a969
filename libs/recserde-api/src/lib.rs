pub mod binary;
pub mod error;
pub mod message;
pub mod plugin;
pub mod record;
pub mod registry;
pub mod schema;
pub mod value;

pub use error::{ErrorKind, SerdeError};
pub use record::GenericRecord;
pub use schema::Schema;
pub use value::Value;
