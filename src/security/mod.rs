pub mod operation_key;
pub mod password;
pub use operation_key::*;
pub use password::*;
