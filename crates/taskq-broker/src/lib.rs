//! taskq broker: task queue plus result store.
//!
//! The [`Broker`] trait is the only thing the gateway and the worker pool share.
//! [`InMemoryBroker`] keeps everything in process and forgets finished results
//! after a configurable TTL.

mod broker;
mod config;
mod error;
mod memory;
mod record;

pub use broker::{Broker, Job};
pub use config::BrokerConfig;
pub use error::BrokerError;
pub use memory::InMemoryBroker;
pub use record::TaskRecord;
