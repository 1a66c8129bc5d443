// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Queue Definitions
//!
//! Queue declarations and queue-to-exchange bindings used by the consume
//! topology.

use lapin::options::QueueDeclareOptions;

/// Definition of a RabbitMQ queue with its declaration parameters.
///
/// An empty name asks the broker to generate a unique one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueDefinition {
    pub(crate) name: String,
    pub(crate) durable: bool,
    pub(crate) delete: bool,
    pub(crate) exclusive: bool,
}

impl QueueDefinition {
    /// Creates a new queue definition with the given name.
    ///
    /// By default the queue is non-durable, non-exclusive and kept when unused.
    ///
    /// # Parameters
    /// * `name` - The name of the queue, or empty for a broker-generated one
    ///
    /// # Returns
    /// A new queue definition with default settings
    pub fn new(name: &str) -> QueueDefinition {
        QueueDefinition {
            name: name.to_owned(),
            ..QueueDefinition::default()
        }
    }

    /// A broker-named, non-durable, auto-delete, exclusive queue: a private
    /// subscription that disappears with its consumer.
    pub fn anonymous() -> QueueDefinition {
        QueueDefinition::new("").delete().exclusive()
    }

    /// # Returns
    /// The requested queue name; empty for a broker-named queue
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Makes the queue durable, persisting across broker restarts.
    ///
    /// # Returns
    /// Self for method chaining
    pub fn durable(mut self) -> Self {
        self.durable = true;
        self
    }

    /// Sets the queue to auto-delete when its last consumer goes away.
    ///
    /// # Returns
    /// Self for method chaining
    pub fn delete(mut self) -> Self {
        self.delete = true;
        self
    }

    /// Makes the queue exclusive to the declaring connection.
    ///
    /// # Returns
    /// Self for method chaining
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub(crate) fn declare_options(&self) -> QueueDeclareOptions {
        QueueDeclareOptions {
            passive: false,
            durable: self.durable,
            exclusive: self.exclusive,
            auto_delete: self.delete,
            nowait: false,
        }
    }
}

/// Configuration for binding a queue to an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueBinding {
    pub(crate) queue_name: String,
    pub(crate) exchange_name: String,
    pub(crate) routing_key: String,
}

impl QueueBinding {
    /// Creates a new queue binding for the given queue.
    ///
    /// The exchange name and routing key start empty and are set with
    /// [`QueueBinding::exchange`] and [`QueueBinding::routing_key`].
    pub fn new(queue: &str) -> QueueBinding {
        QueueBinding {
            queue_name: queue.to_owned(),
            exchange_name: String::new(),
            routing_key: String::new(),
        }
    }

    /// # Parameters
    /// * `exchange` - The exchange to bind the queue to
    ///
    /// # Returns
    /// Self for method chaining
    pub fn exchange(mut self, exchange: &str) -> Self {
        self.exchange_name = exchange.to_owned();
        self
    }

    /// # Parameters
    /// * `key` - The binding key deliveries must carry
    ///
    /// # Returns
    /// Self for method chaining
    pub fn routing_key(mut self, key: &str) -> Self {
        self.routing_key = key.to_owned();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_queue_is_private_and_transient() {
        let def = QueueDefinition::anonymous();
        let opts = def.declare_options();

        assert_eq!(def.name(), "");
        assert!(!opts.durable);
        assert!(opts.auto_delete);
        assert!(opts.exclusive);
        assert!(!opts.passive);
        assert!(!opts.nowait);
    }

    #[test]
    fn named_durable_queue_survives_restarts() {
        let def = QueueDefinition::new("audit").durable();
        let opts = def.declare_options();

        assert_eq!(def.name(), "audit");
        assert!(opts.durable);
        assert!(!opts.auto_delete);
        assert!(!opts.exclusive);
    }

    #[test]
    fn binding_builder_sets_exchange_and_key() {
        let binding = QueueBinding::new("amq.gen-1")
            .exchange("orders")
            .routing_key("created");

        assert_eq!(binding.queue_name, "amq.gen-1");
        assert_eq!(binding.exchange_name, "orders");
        assert_eq!(binding.routing_key, "created");
    }
}
