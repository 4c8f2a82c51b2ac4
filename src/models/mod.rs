mod device_types;
mod jobs;

pub use device_types::*;
pub use jobs::*;
