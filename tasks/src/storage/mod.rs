//! Task persistence.

mod file;
mod traits;

pub use file::JsonFileRepository;
pub use traits::TaskRepository;
