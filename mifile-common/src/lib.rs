pub mod file;
pub mod format;

pub use file::SelectedFile;
pub use format::{format_date, format_file_size};
