pub mod measurement;
pub mod preference;
pub mod request;
pub mod size;
