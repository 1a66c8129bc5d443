// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Consumer Handlers
//!
//! Application code receives deliveries through [`ConsumerHandler`]. Plain
//! closures can be used via [`handler_fn`].

use crate::{broker::Delivery, errors::AmqpError};
use async_trait::async_trait;
use opentelemetry::Context;
use serde::de::DeserializeOwned;

/// Error type handlers may return.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A delivered message as seen by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerMessage {
    pub exchange: String,
    pub routing_key: String,
    pub redelivered: bool,
    pub data: Vec<u8>,
}

impl ConsumerMessage {
    /// The body as UTF-8 text.
    pub fn text(&self) -> Result<&str, AmqpError> {
        std::str::from_utf8(&self.data).map_err(|e| AmqpError::ParsePayloadError(e.to_string()))
    }

    /// The body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AmqpError> {
        serde_json::from_slice(&self.data).map_err(|e| AmqpError::ParsePayloadError(e.to_string()))
    }
}

impl From<Delivery> for ConsumerMessage {
    fn from(delivery: Delivery) -> Self {
        ConsumerMessage {
            exchange: delivery.exchange,
            routing_key: delivery.routing_key,
            redelivered: delivery.redelivered,
            data: delivery.data,
        }
    }
}

/// Processes delivered messages.
///
/// `ctx` carries the trace context propagated by the publisher, if any.
#[async_trait]
pub trait ConsumerHandler: Send + Sync {
    async fn exec(&self, ctx: &Context, msg: &ConsumerMessage) -> Result<(), HandlerError>;
}

/// Handler built from a synchronous closure.
pub struct FnHandler<F> {
    f: F,
}

/// Wraps a closure into a [`ConsumerHandler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&ConsumerMessage) -> Result<(), HandlerError> + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> ConsumerHandler for FnHandler<F>
where
    F: Fn(&ConsumerMessage) -> Result<(), HandlerError> + Send + Sync,
{
    async fn exec(&self, _ctx: &Context, msg: &ConsumerMessage) -> Result<(), HandlerError> {
        (self.f)(msg)
    }
}
