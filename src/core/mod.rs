//! Hub core: dispatcher, facade and configuration.
//!
//! The public API from this module is [`Hub`] and its [`HubConfig`].
//!
//! Internal modules:
//! - [`dispatcher`]: the single task owning the active subscriber set;
//! - [`hub`]: the cloneable facade used by producers and consumers;
//! - [`config`]: delivery settings.

mod config;
mod dispatcher;
mod hub;

pub use config::{Delivery, HubConfig};
pub use hub::Hub;
