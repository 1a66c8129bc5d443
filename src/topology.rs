// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # RabbitMQ Topology
//!
//! Declares exchanges, queues and bindings on a channel. The consume path
//! installs a [`SubscriptionTopology`]: one exchange, one private queue and
//! the binding between them.

use crate::{
    broker::AmqpChannel,
    errors::AmqpError,
    exchange::ExchangeDefinition,
    queue::{QueueBinding, QueueDefinition},
};
use lapin::{options::QueueBindOptions, types::FieldTable};
use tracing::debug;

/// Declares an exchange. Re-declaring with identical parameters is a no-op at
/// the broker; different parameters on an existing exchange fail.
pub async fn declare_exchange(
    channel: &dyn AmqpChannel,
    def: &ExchangeDefinition,
) -> Result<(), AmqpError> {
    debug!("creating exchange: {}", def.name);

    channel
        .declare_exchange(
            &def.name,
            def.kind.into(),
            def.declare_options(),
            def.arguments(),
        )
        .await?;

    debug!("exchange: {} was created", def.name);
    Ok(())
}

/// Declares a queue and returns its name as known by the broker.
pub async fn declare_queue(
    channel: &dyn AmqpChannel,
    def: &QueueDefinition,
) -> Result<String, AmqpError> {
    debug!("creating queue: {:?}", def.name);

    let name = channel
        .declare_queue(&def.name, def.declare_options(), FieldTable::default())
        .await?;

    debug!("queue: {} was created", name);
    Ok(name)
}

/// Binds a queue to an exchange.
pub async fn bind_queue(
    channel: &dyn AmqpChannel,
    binding: &QueueBinding,
) -> Result<(), AmqpError> {
    debug!(
        "binding queue: {} to the exchange: {} with the key: {}",
        binding.queue_name, binding.exchange_name, binding.routing_key
    );

    channel
        .bind_queue(
            &binding.queue_name,
            &binding.exchange_name,
            &binding.routing_key,
            QueueBindOptions { nowait: false },
            FieldTable::default(),
        )
        .await?;

    debug!("queue was bounded");
    Ok(())
}

/// Exchange, queue and routing key of a single subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionTopology {
    exchange: ExchangeDefinition,
    queue: QueueDefinition,
    routing_key: String,
}

impl SubscriptionTopology {
    /// Creates the topology of one subscription.
    ///
    /// # Parameters
    /// * `exchange` - The exchange to subscribe to
    /// * `queue` - The queue receiving the routed messages
    /// * `routing_key` - The binding key between them
    ///
    /// # Returns
    /// A topology ready to be installed on a channel
    pub fn new(exchange: ExchangeDefinition, queue: QueueDefinition, routing_key: &str) -> Self {
        SubscriptionTopology {
            exchange,
            queue,
            routing_key: routing_key.to_owned(),
        }
    }

    /// Declares the exchange, then the queue, then binds them. Returns the
    /// queue name to consume from.
    pub async fn install(&self, channel: &dyn AmqpChannel) -> Result<String, AmqpError> {
        declare_exchange(channel, &self.exchange).await?;
        let queue_name = declare_queue(channel, &self.queue).await?;

        let binding = QueueBinding::new(&queue_name)
            .exchange(&self.exchange.name)
            .routing_key(&self.routing_key);
        bind_queue(channel, &binding).await?;

        Ok(queue_name)
    }
}
