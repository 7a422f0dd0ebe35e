use crate::prelude::*;

use crate::inverter::WaitForReply;
use crate::pi30::{CommandKind, Value};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ChannelData {
    Shutdown,
    /// run every enabled inverter's status command group
    PollInverters,
    SendCommand { serial: String, command: String },
}

#[derive(Default)]
pub struct ReadingStats {
    pub commands_sent: u64,
    pub readings_decoded: u64,
    pub decode_errors: u64,
    pub setters_refused: u64,
    pub mqtt_messages_sent: u64,
    pub mqtt_errors: u64,
    pub influx_writes: u64,
    pub influx_errors: u64,
    pub inverter_disconnections: HashMap<String, u64>,
}

impl ReadingStats {
    pub fn print_summary(&self) {
        info!("Reading statistics:");
        info!("  Commands sent: {}", self.commands_sent);
        info!("  Readings decoded: {}", self.readings_decoded);
        info!("  Decode errors: {}", self.decode_errors);
        info!("  Setters refused (read_only): {}", self.setters_refused);
        info!("  MQTT:");
        info!("    Messages sent: {}", self.mqtt_messages_sent);
        info!("    Errors: {}", self.mqtt_errors);
        info!("  InfluxDB:");
        info!("    Writes: {}", self.influx_writes);
        info!("    Errors: {}", self.influx_errors);
        info!("  Inverter disconnections by serial:");
        for (serial, count) in &self.inverter_disconnections {
            info!("    {}: {}", serial, count);
        }
    }
}

#[derive(Clone)]
pub struct Coordinator {
    config: ConfigWrapper,
    channels: Channels,
    protocols: Arc<HashMap<String, Protocol>>,
    pub shared_stats: Arc<Mutex<ReadingStats>>,
}

impl Coordinator {
    /// Builds one protocol handler per enabled inverter up front; the
    /// registries are immutable from here on.
    pub fn new(config: ConfigWrapper, channels: Channels) -> Result<Self> {
        let mut protocols = HashMap::new();
        for inverter in config.enabled_inverters() {
            let protocol = Protocol::for_family(inverter.protocol())?;
            info!(
                "inverter {} using protocol {} with {} commands",
                inverter.serial(),
                protocol.id(),
                protocol.registry().len()
            );
            protocols.insert(inverter.serial().to_string(), protocol);
        }

        Ok(Self {
            config,
            channels,
            protocols: Arc::new(protocols),
            shared_stats: Arc::new(Mutex::new(ReadingStats::default())),
        })
    }

    pub async fn start(&self) -> Result<()> {
        if self.config.mqtt().enabled() {
            futures::try_join!(
                self.command_receiver(),
                self.inverter_receiver(),
                self.mqtt_receiver()
            )?;
        } else {
            futures::try_join!(self.command_receiver(), self.inverter_receiver())?;
        }

        Ok(())
    }

    pub fn stop(&self) {
        let _ = self.channels.to_coordinator.send(ChannelData::Shutdown);
        let _ = self
            .channels
            .from_inverter
            .send(inverter::ChannelData::Shutdown);

        if self.config.mqtt().enabled() {
            let _ = self.channels.from_mqtt.send(mqtt::ChannelData::Shutdown);
        }
    }

    // scheduler / mqtt -> coordinator
    async fn command_receiver(&self) -> Result<()> {
        let mut receiver = self.channels.to_coordinator.subscribe();

        loop {
            match receiver.recv().await? {
                ChannelData::Shutdown => break,
                ChannelData::PollInverters => self.poll_inverters().await,
                ChannelData::SendCommand { serial, command } => {
                    match self.config.enabled_inverter_with_serial(&serial) {
                        Some(inverter) => {
                            let _ = self.process_command(&inverter, &command).await;
                        }
                        None => warn!("no enabled inverter with serial {}", serial),
                    }
                }
            }
        }

        Ok(())
    }

    // connection bookkeeping
    async fn inverter_receiver(&self) -> Result<()> {
        let mut receiver = self.channels.from_inverter.subscribe();

        loop {
            match receiver.recv().await? {
                inverter::ChannelData::Disconnect(serial) => {
                    if let Ok(mut stats) = self.shared_stats.lock() {
                        *stats
                            .inverter_disconnections
                            .entry(serial.clone())
                            .or_insert(0) += 1;
                    }
                    warn!("inverter {} disconnected", serial);
                }
                inverter::ChannelData::Shutdown => break,
                _ => {}
            }
        }

        Ok(())
    }

    async fn mqtt_receiver(&self) -> Result<()> {
        let mut receiver = self.channels.from_mqtt.subscribe();

        while let mqtt::ChannelData::Message(message) = receiver.recv().await? {
            let _ = self.process_message(message).await;
        }

        Ok(())
    }

    async fn process_message(&self, message: mqtt::Message) -> Result<()> {
        for inverter in self.config.inverters_for_message(&message)? {
            match message.to_command() {
                Ok(command) => {
                    info!("parsed command {} for {}", command, inverter.serial());
                    let result = self.process_command(&inverter, &command).await;
                    if result.is_err() {
                        self.publish(
                            format!("result/{}/{}", inverter.serial(), command),
                            "FAIL".to_string(),
                        );
                    }
                }
                Err(err) => {
                    error!("{:?}", err);
                }
            }
        }

        Ok(())
    }

    async fn poll_inverters(&self) {
        for inverter in self.config.enabled_inverters() {
            let Some(protocol) = self.protocols.get(inverter.serial()) else {
                continue;
            };

            for command in protocol.registry().status_commands() {
                if let Err(err) = self.process_command(&inverter, command).await {
                    warn!("poll of {} on {} failed: {}", command, inverter.serial(), err);
                }
                tokio::time::sleep(Duration::from_millis(inverter.delay_ms())).await;
            }
        }
    }

    /// One full request/response round trip: resolve and encode, hand
    /// the frame to the transport, decode the reply, publish.
    async fn process_command(&self, inverter: &config::Inverter, command: &str) -> Result<Reading> {
        let serial = inverter.serial();
        let protocol = self
            .protocols
            .get(serial)
            .ok_or_else(|| anyhow!("no protocol handler for {}", serial))?;

        let (definition, _) = protocol.registry().resolve(command)?;
        let is_setter = definition.kind == CommandKind::Setter;
        if is_setter && (self.config.read_only() || inverter.read_only()) {
            if let Ok(mut stats) = self.shared_stats.lock() {
                stats.setters_refused += 1;
            }
            bail!("read_only mode is enabled, refusing setter {}", command);
        }

        let frame = protocol.build_request(command)?;

        let mut receiver = self.channels.from_inverter.subscribe();
        if self
            .channels
            .to_inverter
            .send(inverter::ChannelData::Frame {
                serial: serial.to_string(),
                bytes: frame,
            })
            .is_err()
        {
            bail!("send(to_inverter) failed - channel closed?");
        }
        if let Ok(mut stats) = self.shared_stats.lock() {
            stats.commands_sent += 1;
        }

        let raw = receiver.wait_for_reply(serial).await?;

        let reading = match protocol.decode_response(command, &raw) {
            Ok(reading) => reading,
            Err(err) => {
                if let Ok(mut stats) = self.shared_stats.lock() {
                    stats.decode_errors += 1;
                }
                return Err(err.into());
            }
        };
        if let Ok(mut stats) = self.shared_stats.lock() {
            stats.readings_decoded += 1;
        }

        self.publish_reading(inverter, command, &reading, is_setter)?;

        Ok(reading)
    }

    fn publish_reading(
        &self,
        inverter: &config::Inverter,
        command: &str,
        reading: &Reading,
        is_setter: bool,
    ) -> Result<()> {
        let serial = inverter.serial();

        if self.config.mqtt().enabled() {
            if is_setter {
                // ack outcome to the result topic, like any other
                // command result consumers subscribe to
                let outcome = match reading.fields().first().map(|f| &f.value) {
                    Some(Value::String(outcome)) => outcome.clone(),
                    _ => "FAIL".to_string(),
                };
                self.publish(format!("result/{}/{}", serial, command), outcome);
            } else {
                self.publish(
                    format!("{}/reading/{}", serial, command),
                    serde_json::to_string(reading)?,
                );

                if self.config.mqtt().publish_individual_readings() {
                    for field in reading.fields() {
                        self.publish(
                            format!("{}/{}/{}", serial, command, topic_key(field.label)),
                            serde_json::to_string(&field.value)?,
                        );
                    }
                }
            }
        }

        if self.config.influx().enabled() && !is_setter {
            let data = influx::ChannelData::Reading {
                serial: serial.to_string(),
                reading: reading.clone(),
            };
            if self.channels.to_influx.send(data).is_err() {
                bail!("send(to_influx) failed - channel closed?");
            }
        }

        Ok(())
    }

    fn publish(&self, topic: String, payload: String) {
        let message = mqtt::ChannelData::Message(mqtt::Message {
            topic,
            retain: false,
            payload,
        });
        if self.channels.to_mqtt.send(message).is_err() {
            warn!("send(to_mqtt) failed - channel closed?");
        }
    }
}

/// MQTT/Influx key for a field label: lowercased, spaces to underscores.
pub fn topic_key(label: &str) -> String {
    label.to_lowercase().replace(' ', "_")
}
