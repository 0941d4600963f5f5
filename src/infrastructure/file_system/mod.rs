pub mod temp_file_storage;

pub use temp_file_storage::TempFileStorage;
