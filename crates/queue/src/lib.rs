//! Broker, scheduler loop, and channel workers for notifyd.

pub mod broker;
pub mod scheduler;
pub mod transport;
pub mod worker;

pub use broker::{BrokerMessage, ConsumeOptions, RedisBroker};
pub use scheduler::{CycleStats, Scheduler, SchedulerConfig};
pub use transport::{InAppTransport, LogTransport};
pub use worker::{ChannelWorker, MessageHandler};
