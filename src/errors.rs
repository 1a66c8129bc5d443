// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Error Types for the RabbitMQ Driver
//!
//! Every failure the driver can report is a variant of [`AmqpError`]. Variants
//! map one-to-one onto the sub-operation that failed (dial, channel, exchange
//! declaration, publish, ...) and carry the broker client's message as-is, so
//! callers see exactly what `lapin` reported.

use thiserror::Error;

/// Represents errors that can occur during AMQP/RabbitMQ operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmqpError {
    /// Error establishing a connection to the RabbitMQ server
    #[error("failure to connect: {0}")]
    ConnectionError(String),

    /// `dial` was called on a live connection and redial is rejected
    #[error("already connected")]
    AlreadyConnectedError,

    /// An operation requiring a connection was called without one
    #[error("not connected")]
    NotConnectedError,

    /// Error creating a channel from an established connection
    #[error("failure to create a channel: {0}")]
    ChannelError(String),

    /// Error declaring an exchange with the given name
    #[error("failure to declare an exchange `{0}`: {1}")]
    DeclareExchangeError(String, String),

    /// Error declaring a queue with the given name
    #[error("failure to declare a queue `{0}`: {1}")]
    DeclareQueueError(String, String),

    /// Error binding a queue to an exchange
    #[error("failure to bind exchange `{0}` to queue `{1}`: {2}")]
    BindingExchangeToQueueError(String, String, String),

    /// Error publishing a message
    #[error("failure to publish: {0}")]
    PublishingError(String),

    /// Error registering a consumer on a queue
    #[error("failure to declare consumer on `{0}`: {1}")]
    ConsumerDeclarationError(String, String),

    /// Error reported by the delivery stream
    #[error("failure to consume message: {0}")]
    ConsumerError(String),

    /// Error acknowledging a message
    #[error("failure to ack message: {0}")]
    AckMessageError(String),

    /// Error negative-acknowledging a message
    #[error("failure to nack message: {0}")]
    NackMessageError(String),

    /// The consumer handler failed while processing a message
    #[error("handler failure: {0}")]
    HandlerError(String),

    /// Error parsing a message payload
    #[error("failure to parse payload: {0}")]
    ParsePayloadError(String),
}
