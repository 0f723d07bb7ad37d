pub mod extract;
pub mod sheets;
pub mod stamp;
