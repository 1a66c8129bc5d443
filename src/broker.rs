// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Broker Client Seam
//!
//! The driver never speaks AMQP itself. Everything that touches the wire goes
//! through the traits below, whose production implementation wraps `lapin`
//! (see [`crate::channel`]). Thread-safety of a connection shared between
//! tasks is whatever the implementation provides; the driver adds no locking.

use crate::errors::AmqpError;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use lapin::{
    options::{
        BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions,
        QueueDeclareOptions,
    },
    types::FieldTable,
    BasicProperties, ExchangeKind,
};

/// Reply code sent when the driver closes a connection or a channel.
pub const REPLY_SUCCESS: u16 = 200;

/// A message handed out by the broker.
#[derive(Debug, Clone, Default)]
pub struct Delivery {
    pub delivery_tag: u64,
    pub exchange: String,
    pub routing_key: String,
    pub redelivered: bool,
    pub headers: Option<FieldTable>,
    pub data: Vec<u8>,
}

/// Lazy sequence of deliveries; it ends when the channel or connection closes.
pub type DeliveryStream = BoxStream<'static, Result<Delivery, AmqpError>>;

/// Establishes broker connections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AmqpConnector: Send + Sync {
    async fn connect(
        &self,
        uri: &str,
        connection_name: &str,
    ) -> Result<Box<dyn AmqpConnection>, AmqpError>;
}

/// An open broker connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AmqpConnection: Send + Sync {
    async fn open_channel(&self) -> Result<Box<dyn AmqpChannel>, AmqpError>;

    async fn close(&self) -> Result<(), AmqpError>;
}

/// A channel multiplexed over a connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AmqpChannel: Send + Sync {
    async fn declare_exchange(
        &self,
        name: &str,
        kind: ExchangeKind,
        options: ExchangeDeclareOptions,
        arguments: FieldTable,
    ) -> Result<(), AmqpError>;

    /// Returns the queue name, which the broker generates for an empty `name`.
    async fn declare_queue(
        &self,
        name: &str,
        options: QueueDeclareOptions,
        arguments: FieldTable,
    ) -> Result<String, AmqpError>;

    async fn bind_queue(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
        options: QueueBindOptions,
        arguments: FieldTable,
    ) -> Result<(), AmqpError>;

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        options: BasicPublishOptions,
        body: &[u8],
        properties: BasicProperties,
    ) -> Result<(), AmqpError>;

    async fn consume(
        &self,
        queue: &str,
        consumer_tag: &str,
        options: BasicConsumeOptions,
        arguments: FieldTable,
    ) -> Result<DeliveryStream, AmqpError>;

    async fn ack(&self, delivery_tag: u64) -> Result<(), AmqpError>;

    async fn nack(&self, delivery_tag: u64, requeue: bool) -> Result<(), AmqpError>;

    async fn close(&self) -> Result<(), AmqpError>;
}
