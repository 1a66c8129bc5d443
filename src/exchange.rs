// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Exchange Definitions
//!
//! Exchanges are the routing entities of RabbitMQ: they receive published
//! messages and forward them to bound queues. This module defines the exchange
//! kinds the driver can declare and a builder describing one declaration.

use crate::configs::ExchangeOptions;
use lapin::{
    options::ExchangeDeclareOptions,
    types::{AMQPValue, FieldTable, ShortString},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Represents the types of exchanges available in RabbitMQ.
///
/// - Direct: routes to queues whose binding key equals the routing key
/// - Fanout: broadcasts to all bound queues regardless of routing keys
/// - Topic: routes on wildcard pattern matching of routing keys
/// - Headers: routes on message header values instead of routing keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    #[default]
    Direct,
    Fanout,
    Topic,
    Headers,
}

impl From<ExchangeKind> for lapin::ExchangeKind {
    fn from(kind: ExchangeKind) -> lapin::ExchangeKind {
        match kind {
            ExchangeKind::Direct => lapin::ExchangeKind::Direct,
            ExchangeKind::Fanout => lapin::ExchangeKind::Fanout,
            ExchangeKind::Headers => lapin::ExchangeKind::Headers,
            ExchangeKind::Topic => lapin::ExchangeKind::Topic,
        }
    }
}

/// Definition of a RabbitMQ exchange with its declaration parameters.
#[derive(Debug, Clone)]
pub struct ExchangeDefinition {
    pub(crate) name: String,
    pub(crate) kind: ExchangeKind,
    pub(crate) delete: bool,
    pub(crate) durable: bool,
    pub(crate) internal: bool,
    pub(crate) no_wait: bool,
    pub(crate) params: BTreeMap<ShortString, AMQPValue>,
}

impl ExchangeDefinition {
    /// Creates a non-durable direct exchange definition with the given name.
    ///
    /// # Parameters
    /// * `name` - The name of the exchange
    ///
    /// # Returns
    /// A new exchange definition with default settings
    pub fn new(name: &str) -> ExchangeDefinition {
        ExchangeDefinition {
            name: name.to_owned(),
            kind: ExchangeKind::Direct,
            delete: false,
            durable: false,
            internal: false,
            no_wait: false,
            params: BTreeMap::default(),
        }
    }

    /// Creates a definition carrying the configured exchange options.
    ///
    /// # Parameters
    /// * `name` - The name of the exchange
    /// * `opts` - Kind and flags to declare it with
    ///
    /// # Returns
    /// An exchange definition mirroring `opts`
    pub fn from_options(name: &str, opts: &ExchangeOptions) -> ExchangeDefinition {
        ExchangeDefinition {
            kind: opts.kind,
            delete: opts.auto_delete,
            durable: opts.durable,
            internal: opts.internal,
            no_wait: opts.no_wait,
            ..ExchangeDefinition::new(name)
        }
    }

    /// # Returns
    /// The exchange name as declared on the broker
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a single declaration argument.
    ///
    /// # Parameters
    /// * `key` - The argument name
    /// * `value` - The argument value
    ///
    /// # Returns
    /// Self for method chaining
    pub fn param(mut self, key: ShortString, value: AMQPValue) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Sets the exchange to auto-delete when no longer used.
    ///
    /// # Returns
    /// Self for method chaining
    pub fn delete(mut self) -> Self {
        self.delete = true;
        self
    }

    /// Makes the exchange durable, persisting across broker restarts.
    ///
    /// # Returns
    /// Self for method chaining
    pub fn durable(mut self) -> Self {
        self.durable = true;
        self
    }

    pub(crate) fn declare_options(&self) -> ExchangeDeclareOptions {
        ExchangeDeclareOptions {
            passive: false,
            durable: self.durable,
            auto_delete: self.delete,
            internal: self.internal,
            nowait: self.no_wait,
        }
    }

    pub(crate) fn arguments(&self) -> FieldTable {
        FieldTable::from(self.params.clone())
    }
}
