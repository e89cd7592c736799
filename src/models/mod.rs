pub mod todo;

pub use todo::{DecodeError, Todo};
