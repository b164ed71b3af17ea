pub mod device;
pub mod reading;

pub use device::{Device, DeviceInput};
pub use reading::{IngestReading, Reading, ReadingQuery, ReadingView, SurfaceType};
