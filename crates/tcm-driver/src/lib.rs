//! Host-side driver for the PNI Fieldforce TCM compass module.
//!
//! [`Tcm`] pairs the `tcm-protocol` frame codec with a byte [`Channel`] and
//! exposes one blocking method per module command.
//!
//! ```ignore
//! use tcm_driver::{DriverConfig, SerialChannel, Tcm};
//! use tcm_protocol::COMPONENT_HEADING;
//!
//! let channel = SerialChannel::open(&DriverConfig::for_port("/dev/ttyUSB0"))?;
//! let mut tcm = Tcm::new(channel);
//!
//! println!("Model: {}", tcm.get_model_info()?.device_type_str());
//! tcm.set_data_components(&[COMPONENT_HEADING])?;
//! println!("Heading: {:?}", tcm.get_data()?.heading);
//! ```

mod capture;
pub mod channel;
pub mod config;
mod driver;
mod error;

pub use capture::CaptureReader;
#[cfg(feature = "serial")]
pub use channel::SerialChannel;
pub use channel::{Channel, IoChannel};
pub use config::DriverConfig;
pub use driver::Tcm;
pub use error::{DriverError, DriverResult};
