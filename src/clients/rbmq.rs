use anyhow::{Error, Result, anyhow};
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, Consumer,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
        BasicRejectOptions, QueueDeclareOptions,
    },
    types::FieldTable,
};
use tracing::info;

use crate::{
    config::Config,
    models::{message::DeadLetter, outcome::AckMode},
};

pub struct RabbitMqClient {
    connection: Connection,
    pub channel: Channel,
    queue_name: String,
    consumer_tag: String,
    dead_letter_queue: Option<String>,
}

impl RabbitMqClient {
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        info!("Connecting to RabbitMQ...");

        let connection = Connection::connect(&config.rabbitmq_url, ConnectionProperties::default())
            .await
            .map_err(|e| anyhow!("Failed to connect to RabbitMQ: {}", e))?;

        info!("RabbitMQ connection established");

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| anyhow!("Failed to open a channel: {}", e))?;

        info!("RabbitMQ channel created");

        if config.ack_mode == AckMode::Manual {
            channel
                .basic_qos(config.prefetch_count, BasicQosOptions::default())
                .await
                .map_err(|e| anyhow!("Failed to set up QoS: {}", e))?;

            info!(prefetch_count = config.prefetch_count, "Prefetch count set");
        }

        Self::declare_durable(&channel, &config.queue_name).await?;

        info!(queue = %config.queue_name, "Queue declared");

        let dead_letter_queue = config
            .dead_letter_queue
            .clone()
            .filter(|queue| !queue.is_empty());

        if let Some(queue) = &dead_letter_queue {
            Self::declare_durable(&channel, queue).await?;

            info!(queue = %queue, "Dead-letter queue declared");
        }

        Ok(Self {
            connection,
            channel,
            queue_name: config.queue_name.clone(),
            consumer_tag: config.consumer_tag.clone(),
            dead_letter_queue,
        })
    }

    async fn declare_durable(channel: &Channel, queue: &str) -> Result<(), Error> {
        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to declare queue {}: {}", queue, e))?;

        Ok(())
    }

    pub async fn create_consumer(&self, ack_mode: AckMode) -> Result<Consumer, Error> {
        let consumer = self
            .channel
            .basic_consume(
                &self.queue_name,
                &self.consumer_tag,
                BasicConsumeOptions {
                    no_ack: ack_mode == AckMode::Auto,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to register a consumer: {}", e))?;

        info!(
            queue = %self.queue_name,
            consumer_tag = %self.consumer_tag,
            ack_mode = ?ack_mode,
            "Consumer registered"
        );

        Ok(consumer)
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn is_connected(&self) -> bool {
        self.connection.status().connected()
    }

    pub async fn acknowledge(&self, delivery_tag: u64) -> Result<(), Error> {
        self.channel
            .basic_ack(delivery_tag, BasicAckOptions::default())
            .await
            .map_err(|e| anyhow!("Failed to acknowledge message: {}", e))?;

        Ok(())
    }

    pub async fn reject(&self, delivery_tag: u64, requeue: bool) -> Result<(), Error> {
        self.channel
            .basic_reject(delivery_tag, BasicRejectOptions { requeue })
            .await
            .map_err(|e| anyhow!("Failed to reject message: {}", e))?;

        Ok(())
    }

    pub async fn publish_dead_letter(&self, message: &DeadLetter) -> Result<(), Error> {
        let queue = self
            .dead_letter_queue
            .as_deref()
            .ok_or_else(|| anyhow!("No dead-letter queue configured"))?;

        let payload = serde_json::to_vec(message)?;

        self.channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(|e| anyhow!("Failed to publish message to dead-letter queue: {}", e))?
            .await
            .map_err(|e| anyhow!("Dead-letter publish was not confirmed: {}", e))?;

        Ok(())
    }
}
