// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! Publishes a few messages to a direct exchange while consuming them back.
//!
//! Needs a running broker; connection settings come from `RABBITMQ_*`
//! environment variables (defaults to guest@localhost:5672).

use rabbitmq_driver::{configs::RabbitMQConfigs, handler::handler_fn, AmqpError, RabbitMQ};
use std::time::Duration;
use tracing::info;

const EXCHANGE: &str = "orders";
const ROUTING_KEY: &str = "created";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cfg = RabbitMQConfigs::load()?;
    let mut mq = RabbitMQ::from_configs(&cfg);
    mq.dial().await?;

    let handler = handler_fn(|msg| {
        let body = msg.text()?;
        info!(body, routing_key = %msg.routing_key, "received");
        Ok(())
    });

    let producer = async {
        // give the consumer time to bind its queue
        tokio::time::sleep(Duration::from_millis(500)).await;

        for i in 0..5 {
            mq.send(EXCHANGE, ROUTING_KEY, format!("order {i}")).await?;
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok::<(), AmqpError>(())
    };

    tokio::select! {
        res = mq.consume(EXCHANGE, ROUTING_KEY, &handler) => res?,
        res = producer => res?,
    }

    mq.close().await?;
    Ok(())
}
