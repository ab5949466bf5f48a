pub mod device;
pub mod news;

pub use device::*;
pub use news::*;
