pub use std::io::Write;
pub use std::sync::Arc;

pub use anyhow::{anyhow, bail, Result};
pub use log::{debug, error, info, trace, warn};
pub use tokio::sync::broadcast;

pub use crate::channels::Channels;
pub use crate::config::{self, Config, ConfigWrapper};
pub use crate::coordinator::{self, Coordinator};
pub use crate::influx::{self, Influx};
pub use crate::inverter::{self, Inverter};
pub use crate::mqtt::{self, Mqtt};
pub use crate::options::Options;
pub use crate::pi30::{self, Protocol, Reading};
pub use crate::scheduler::Scheduler;
