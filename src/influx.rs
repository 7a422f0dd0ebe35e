use crate::prelude::*;
use crate::coordinator::{topic_key, ReadingStats};
use crate::pi30::Value;

use std::sync::{Arc, Mutex};

use rinfluxdb::line_protocol::{r#async::Client, LineBuilder};

static MEASUREMENT: &str = "pi30_inverter";

#[derive(PartialEq, Clone, Debug)]
pub enum ChannelData {
    Reading { serial: String, reading: Reading },
    Shutdown,
}

#[derive(Clone)]
pub struct Influx {
    config: ConfigWrapper,
    channels: Channels,
    shared_stats: Arc<Mutex<ReadingStats>>,
}

impl Influx {
    pub fn new(
        config: ConfigWrapper,
        channels: Channels,
        shared_stats: Arc<Mutex<ReadingStats>>,
    ) -> Self {
        Self {
            config,
            channels,
            shared_stats,
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.influx().enabled() {
            info!("influx disabled, skipping");
            return Ok(());
        }

        info!("initializing influx at {}", self.config.influx().url());

        let client = {
            let config = self.config.influx();
            let url = reqwest::Url::parse(config.url())?;
            let credentials = match (config.username(), config.password()) {
                (Some(u), Some(p)) => Some((u, p)),
                _ => None,
            };

            Client::new(url, credentials)?
        };

        self.sender(client).await?;

        Ok(())
    }

    pub fn stop(&self) {
        let _ = self.channels.to_influx.send(ChannelData::Shutdown);
    }

    async fn sender(&self, client: Client) -> Result<()> {
        use ChannelData::*;

        let mut receiver = self.channels.to_influx.subscribe();
        info!("InfluxDB sender started");

        loop {
            match receiver.recv().await {
                Ok(Shutdown) => {
                    info!("InfluxDB sender received shutdown signal");
                    break;
                }
                Ok(Reading { serial, reading }) => {
                    // one point per reading field, flag-sets flattened
                    // to one point per named flag:
                    //   pi30_inverter,serial=X,command=QPIGS,setting=ac_output_load value=10,unit="%"
                    let timestamp = chrono::Utc::now();
                    let mut points = Vec::new();

                    for field in reading.fields() {
                        match &field.value {
                            Value::Flags(flags) => {
                                for flag in flags {
                                    let line = LineBuilder::new(MEASUREMENT)
                                        .insert_tag("serial", serial.as_str())
                                        .insert_tag("command", reading.command.as_str())
                                        .insert_tag("setting", topic_key(flag.name))
                                        .insert_field("value", if flag.active { 1.0 } else { 0.0 })
                                        .set_timestamp(timestamp);
                                    points.push(line.build());
                                }
                            }
                            value => {
                                let mut line = LineBuilder::new(MEASUREMENT)
                                    .insert_tag("serial", serial.as_str())
                                    .insert_tag("command", reading.command.as_str())
                                    .insert_tag("setting", topic_key(field.label))
                                    .set_timestamp(timestamp);

                                line = match value {
                                    Value::Int(n) => line.insert_field("value", *n as f64),
                                    Value::Float(f) => line.insert_field("value", *f),
                                    Value::String(s) => line.insert_field("value", s.clone()),
                                    Value::Flags(_) => unreachable!(),
                                };
                                if !field.unit.is_empty() {
                                    line = line.insert_field("unit", field.unit.to_string());
                                }
                                points.push(line.build());
                            }
                        }
                    }

                    trace!("sending to InfluxDB: {:?}", points);

                    match client.send(&self.database(), &points).await {
                        Ok(_) => {
                            if let Ok(mut stats) = self.shared_stats.lock() {
                                stats.influx_writes += 1;
                            }
                        }
                        Err(err) => {
                            error!("InfluxDB push failed: {:?}", err);
                            if let Ok(mut stats) = self.shared_stats.lock() {
                                stats.influx_errors += 1;
                            }
                        }
                    }
                }
                Err(e) => {
                    error!("error receiving from InfluxDB channel: {}", e);
                }
            }
        }

        info!("InfluxDB sender loop exiting");

        Ok(())
    }

    fn database(&self) -> String {
        self.config.influx().database().to_string()
    }
}
