pub mod playground;
pub mod summary;
