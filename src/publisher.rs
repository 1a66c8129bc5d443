// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Message Publishing
//!
//! Publishes one message on an already open channel. Messages are sent with
//! `mandatory` and `immediate` off and no publisher confirm is awaited: the
//! broker may drop an unroutable message silently.

use crate::{broker::AmqpChannel, errors::AmqpError, otel};
use lapin::{options::BasicPublishOptions, types::ShortString, BasicProperties};
use opentelemetry::Context;
use tracing::debug;
use uuid::Uuid;

/// A message ready to be published.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PublishMessage<'m> {
    pub(crate) exchange: &'m str,
    pub(crate) routing_key: &'m str,
    pub(crate) content_type: &'m str,
    pub(crate) body: &'m [u8],
}

/// Publishes `msg`, tagging it with a fresh message id and the trace headers
/// of `ctx`.
pub(crate) async fn publish(
    channel: &dyn AmqpChannel,
    ctx: &Context,
    msg: &PublishMessage<'_>,
) -> Result<(), AmqpError> {
    let properties = BasicProperties::default()
        .with_content_type(ShortString::from(msg.content_type))
        .with_message_id(ShortString::from(Uuid::new_v4().to_string()))
        .with_headers(otel::inject_headers(ctx));

    channel
        .publish(
            msg.exchange,
            msg.routing_key,
            BasicPublishOptions {
                immediate: false,
                mandatory: false,
            },
            msg.body,
            properties,
        )
        .await?;

    debug!(
        exchange = msg.exchange,
        routing_key = msg.routing_key,
        "message published"
    );

    Ok(())
}
