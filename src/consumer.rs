// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Message Consumption
//!
//! Drives a delivery stream: every delivery is handed to the handler in the
//! order the stream yields it, then acknowledged according to the configured
//! [`AckMode`]. Handler failures (errors and panics alike) are resolved by the
//! [`HandlerFailurePolicy`].

use crate::{
    broker::{AmqpChannel, Delivery, DeliveryStream},
    configs::{AckMode, DriverOptions, HandlerFailurePolicy},
    errors::AmqpError,
    handler::{ConsumerHandler, ConsumerMessage},
    otel,
};
use futures_util::{FutureExt, StreamExt};
use opentelemetry::{
    global::{self, BoxedTracer},
    trace::{Span, Status},
};
use std::{any::Any, borrow::Cow, panic::AssertUnwindSafe};
use tracing::{debug, error, warn};

/// Runs until the stream ends, or until a handler failure is propagated.
///
/// An error item means the underlying channel went away; it ends the loop
/// like the end of the stream does.
pub(crate) async fn consume_loop<H>(
    channel: &dyn AmqpChannel,
    mut deliveries: DeliveryStream,
    opts: &DriverOptions,
    handler: &H,
) -> Result<(), AmqpError>
where
    H: ConsumerHandler + ?Sized,
{
    let tracer = global::tracer(otel::CONSUMER_TRACER_NAME);

    while let Some(result) = deliveries.next().await {
        match result {
            Ok(delivery) => consume(&tracer, channel, delivery, opts, handler).await?,
            Err(err) => {
                warn!(error = err.to_string(), "delivery stream closed");
                break;
            }
        }
    }

    debug!("consumer finished");
    Ok(())
}

/// Hands one delivery to the handler and settles it.
async fn consume<H>(
    tracer: &BoxedTracer,
    channel: &dyn AmqpChannel,
    delivery: Delivery,
    opts: &DriverOptions,
    handler: &H,
) -> Result<(), AmqpError>
where
    H: ConsumerHandler + ?Sized,
{
    let (ctx, mut span) = otel::new_span(delivery.headers.as_ref(), tracer, &delivery.routing_key);

    debug!(
        "received: {} - exchange: {}",
        delivery.routing_key, delivery.exchange
    );

    let delivery_tag = delivery.delivery_tag;
    let msg = ConsumerMessage::from(delivery);

    let failure = match AssertUnwindSafe(handler.exec(&ctx, &msg))
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.to_string()),
        Err(panic) => Some(panic_reason(panic)),
    };

    let Some(reason) = failure else {
        debug!("message successfully processed");

        if opts.ack_mode == AckMode::Manual {
            if let Err(err) = channel.ack(delivery_tag).await {
                span.record_error(&err);
                span.set_status(Status::Error {
                    description: Cow::from("error to ack msg"),
                });
                return Err(err);
            }
        }

        span.set_status(Status::Ok);
        return Ok(());
    };

    let err = AmqpError::HandlerError(reason);
    span.record_error(&err);
    span.set_status(Status::Error {
        description: Cow::from(err.to_string()),
    });

    if opts.ack_mode == AckMode::Manual {
        channel.nack(delivery_tag, opts.requeue_on_failure).await?;
    }

    match opts.on_handler_error {
        HandlerFailurePolicy::Propagate => {
            error!(error = err.to_string(), "error whiling handling msg");
            Err(err)
        }
        HandlerFailurePolicy::Skip => {
            warn!(error = err.to_string(), "error whiling handling msg, skipping");
            Ok(())
        }
    }
}

fn panic_reason(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        return format!("handler panicked: {msg}");
    }

    if let Some(msg) = panic.downcast_ref::<String>() {
        return format!("handler panicked: {msg}");
    }

    "handler panicked".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{broker::MockAmqpChannel, handler::HandlerError};
    use async_trait::async_trait;
    use futures_util::stream;
    use opentelemetry::Context;
    use std::sync::Mutex;

    /// Records every body it sees and fails on bodies equal to `fail_on`.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
        panic_on: Option<&'static str>,
    }

    #[async_trait]
    impl ConsumerHandler for Recorder {
        async fn exec(&self, _ctx: &Context, msg: &ConsumerMessage) -> Result<(), HandlerError> {
            let body = msg.text()?.to_owned();
            self.seen.lock().unwrap().push(body.clone());

            if self.panic_on == Some(body.as_str()) {
                panic!("boom");
            }

            if self.fail_on == Some(body.as_str()) {
                return Err(format!("cannot handle {body}").into());
            }

            Ok(())
        }
    }

    fn delivery(tag: u64, body: &str) -> Result<Delivery, AmqpError> {
        Ok(Delivery {
            delivery_tag: tag,
            exchange: "orders".to_owned(),
            routing_key: "created".to_owned(),
            data: body.as_bytes().to_vec(),
            ..Delivery::default()
        })
    }

    fn deliveries(items: Vec<Result<Delivery, AmqpError>>) -> DeliveryStream {
        stream::iter(items).boxed()
    }

    fn manual() -> DriverOptions {
        DriverOptions {
            ack_mode: AckMode::Manual,
            ..DriverOptions::default()
        }
    }

    #[tokio::test]
    async fn handles_every_delivery_in_order() {
        let mut channel = MockAmqpChannel::new();
        channel.expect_ack().never();
        channel.expect_nack().never();

        let handler = Recorder::default();
        let stream = deliveries(vec![delivery(1, "a"), delivery(2, "b"), delivery(3, "c")]);

        let res = consume_loop(&channel, stream, &DriverOptions::default(), &handler).await;

        assert_eq!(res, Ok(()));
        assert_eq!(*handler.seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn stream_error_ends_the_loop() {
        let channel = MockAmqpChannel::new();
        let handler = Recorder::default();
        let stream = deliveries(vec![
            delivery(1, "a"),
            Err(AmqpError::ConsumerError("channel closed".to_owned())),
            delivery(2, "b"),
        ]);

        let res = consume_loop(&channel, stream, &DriverOptions::default(), &handler).await;

        assert_eq!(res, Ok(()));
        assert_eq!(*handler.seen.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn propagate_policy_stops_on_handler_error() {
        let channel = MockAmqpChannel::new();
        let handler = Recorder {
            fail_on: Some("b"),
            ..Recorder::default()
        };
        let stream = deliveries(vec![delivery(1, "a"), delivery(2, "b"), delivery(3, "c")]);

        let res = consume_loop(&channel, stream, &DriverOptions::default(), &handler).await;

        assert_eq!(res, Err(AmqpError::HandlerError("cannot handle b".to_owned())));
        assert_eq!(*handler.seen.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn skip_policy_keeps_consuming() {
        let channel = MockAmqpChannel::new();
        let handler = Recorder {
            fail_on: Some("b"),
            ..Recorder::default()
        };
        let opts = DriverOptions {
            on_handler_error: HandlerFailurePolicy::Skip,
            ..DriverOptions::default()
        };
        let stream = deliveries(vec![delivery(1, "a"), delivery(2, "b"), delivery(3, "c")]);

        let res = consume_loop(&channel, stream, &opts, &handler).await;

        assert_eq!(res, Ok(()));
        assert_eq!(*handler.seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn handler_panic_is_a_handler_failure() {
        let channel = MockAmqpChannel::new();
        let handler = Recorder {
            panic_on: Some("a"),
            ..Recorder::default()
        };
        let stream = deliveries(vec![delivery(1, "a")]);

        let res = consume_loop(&channel, stream, &DriverOptions::default(), &handler).await;

        assert_eq!(
            res,
            Err(AmqpError::HandlerError("handler panicked: boom".to_owned()))
        );
    }

    #[tokio::test]
    async fn manual_mode_acks_successes_and_nacks_failures() {
        let mut channel = MockAmqpChannel::new();
        channel
            .expect_ack()
            .withf(|tag| *tag == 1)
            .times(1)
            .returning(|_| Ok(()));
        channel
            .expect_nack()
            .withf(|tag, requeue| *tag == 2 && *requeue)
            .times(1)
            .returning(|_, _| Ok(()));

        let handler = Recorder {
            fail_on: Some("b"),
            ..Recorder::default()
        };
        let opts = DriverOptions {
            on_handler_error: HandlerFailurePolicy::Skip,
            ..manual()
        };
        let stream = deliveries(vec![delivery(1, "a"), delivery(2, "b")]);

        let res = consume_loop(&channel, stream, &opts, &handler).await;
        assert_eq!(res, Ok(()));
    }

    #[tokio::test]
    async fn manual_mode_nacks_without_requeue_when_configured() {
        let mut channel = MockAmqpChannel::new();
        channel
            .expect_nack()
            .withf(|tag, requeue| *tag == 1 && !*requeue)
            .times(1)
            .returning(|_, _| Ok(()));

        let handler = Recorder {
            fail_on: Some("a"),
            ..Recorder::default()
        };
        let opts = DriverOptions {
            requeue_on_failure: false,
            ..manual()
        };
        let stream = deliveries(vec![delivery(1, "a")]);

        let res = consume_loop(&channel, stream, &opts, &handler).await;
        assert!(matches!(res, Err(AmqpError::HandlerError(_))));
    }

    #[tokio::test]
    async fn ack_failure_is_returned() {
        let mut channel = MockAmqpChannel::new();
        channel
            .expect_ack()
            .returning(|_| Err(AmqpError::AckMessageError("channel closed".to_owned())));

        let handler = Recorder::default();
        let stream = deliveries(vec![delivery(1, "a"), delivery(2, "b")]);

        let res = consume_loop(&channel, stream, &manual(), &handler).await;

        assert_eq!(
            res,
            Err(AmqpError::AckMessageError("channel closed".to_owned()))
        );
        assert_eq!(*handler.seen.lock().unwrap(), vec!["a"]);
    }
}
