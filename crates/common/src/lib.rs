pub mod error;
pub mod installation;

pub use error::{Error, Result};
pub use installation::{request_tag, DeviceInstallation, Installation, Platform};
