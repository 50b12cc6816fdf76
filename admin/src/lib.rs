//! # sbadmin core library
//!
//! Administration of Service Bus namespace entities: queues, topics,
//! subscriptions and subscription rules, over the Atom/XML management API.
//!
//! ## Modules
//!
//! - [`administration`] - Client, paging, entity models and wire format
//! - [`auth`] - Connection strings and request credentials (SAS, bearer)

pub mod administration;
pub mod auth;
