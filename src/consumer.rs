//! Event consumer: pulls deliveries one at a time, filters them on the `event`
//! header and hands recognized ones to a [`MessageHandler`].

use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use chrono::{SecondsFormat, Utc};
use futures_util::StreamExt;
use lapin::{
    message::Delivery,
    types::{AMQPValue, FieldTable, ShortString},
};
use tokio::sync::watch;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
    clients::rbmq::RabbitMqClient,
    handler::MessageHandler,
    models::{
        event::{EVENT_HEADER, EventRoute, SkipReason},
        message::DeadLetter,
        outcome::{AckDecision, AckMode, HandleOutcome},
    },
};

/// Reads the event type of a delivery from its header table.
pub fn route_event(headers: Option<&FieldTable>) -> EventRoute {
    let key = ShortString::from(EVENT_HEADER);
    let Some(value) = headers.and_then(|table| table.inner().get(&key)) else {
        return EventRoute::MissingEvent;
    };

    let event = match value {
        AMQPValue::LongString(s) => match std::str::from_utf8(s.as_bytes()) {
            Ok(s) => s.to_string(),
            Err(_) => return EventRoute::NonStringEvent,
        },
        AMQPValue::ShortString(s) => s.as_str().to_string(),
        _ => return EventRoute::NonStringEvent,
    };

    match event.parse() {
        Ok(kind) => EventRoute::Recognized(kind),
        Err(()) => EventRoute::Unrelated(event),
    }
}

pub async fn dispatch<H: MessageHandler>(
    handler: &H,
    headers: Option<&FieldTable>,
    body: &[u8],
) -> HandleOutcome {
    let reason = match route_event(headers) {
        EventRoute::Recognized(event) => {
            info!(event = %event, "Dispatching reimbursement event");
            return handler.handle(body).await;
        }
        EventRoute::MissingEvent => SkipReason::MissingEvent,
        EventRoute::NonStringEvent => SkipReason::NonStringEvent,
        EventRoute::Unrelated(event) => SkipReason::UnrelatedEvent(event),
    };

    info!("{}", reason);
    HandleOutcome::Skipped(reason)
}

pub struct EventConsumer {
    rabbitmq: Arc<RabbitMqClient>,
    ack_mode: AckMode,
    dead_letter_enabled: bool,
}

impl EventConsumer {
    pub fn new(
        rabbitmq: Arc<RabbitMqClient>,
        ack_mode: AckMode,
        dead_letter_enabled: bool,
    ) -> Self {
        Self {
            rabbitmq,
            ack_mode,
            dead_letter_enabled,
        }
    }

    /// Consumes until `shutdown` flips. Broker failures end the loop with an error.
    pub async fn run<H: MessageHandler>(
        &self,
        handler: &H,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), Error> {
        let mut consumer = self.rabbitmq.create_consumer(self.ack_mode).await?;

        info!(queue = %self.rabbitmq.queue_name(), "Waiting for messages");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Shutdown signal received, stopping consumer");
                    break;
                }
                delivery = consumer.next() => {
                    let delivery = match delivery {
                        Some(Ok(delivery)) => delivery,
                        Some(Err(e)) => return Err(anyhow!("Consumer stream failed: {}", e)),
                        None => return Err(anyhow!("Consumer stream closed by broker")),
                    };

                    let trace_id = Uuid::new_v4().to_string();
                    let span = info_span!(
                        "delivery",
                        trace_id = %trace_id,
                        delivery_tag = delivery.delivery_tag
                    );

                    self.handle_delivery(handler, &delivery, &trace_id)
                        .instrument(span)
                        .await?;
                }
            }
        }

        Ok(())
    }

    async fn handle_delivery<H: MessageHandler>(
        &self,
        handler: &H,
        delivery: &Delivery,
        trace_id: &str,
    ) -> Result<(), Error> {
        let headers = delivery.properties.headers().as_ref();

        info!(body = %String::from_utf8_lossy(&delivery.data), "Received a message");
        info!(headers = ?headers, "Received a header");

        let outcome = dispatch(handler, headers, &delivery.data).await;

        info!(outcome = outcome.label(), "Message handled");

        match AckDecision::for_outcome(self.ack_mode, self.dead_letter_enabled, &outcome) {
            AckDecision::None => {}
            AckDecision::Ack => self.rabbitmq.acknowledge(delivery.delivery_tag).await?,
            AckDecision::Reject { requeue } => {
                warn!(requeue, "Rejecting message");
                self.rabbitmq.reject(delivery.delivery_tag, requeue).await?;
            }
            AckDecision::DeadLetter { reason } => {
                let event = match route_event(headers) {
                    EventRoute::Recognized(event) => Some(event.to_string()),
                    EventRoute::Unrelated(event) => Some(event),
                    _ => None,
                };

                let dead_letter = DeadLetter {
                    trace_id: trace_id.to_string(),
                    event,
                    payload: String::from_utf8_lossy(&delivery.data).into_owned(),
                    failure_reason: reason,
                    failed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                };

                if let Err(e) = self.rabbitmq.publish_dead_letter(&dead_letter).await {
                    error!(error = %e, "Failed to dead-letter message");
                    return Err(e);
                }

                self.rabbitmq.acknowledge(delivery.delivery_tag).await?;
                warn!("Message moved to dead-letter queue");
            }
        }

        Ok(())
    }
}
