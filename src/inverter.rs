use crate::prelude::*;

use {
    async_trait::async_trait,
    bytes::BytesMut,
    futures::StreamExt,
    net2::TcpStreamExt,
    std::time::Duration,
    tokio::io::AsyncWriteExt,
    tokio_util::codec::{Decoder, FramedRead},
};

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ChannelData {
    Connected(String),  // strictly speaking, these two only ever go
    Disconnect(String), // inverter->coordinator, but eh.
    /// one full frame, either direction through the channel
    Frame { serial: String, bytes: Vec<u8> },
    Shutdown,
}
pub type Sender = broadcast::Sender<ChannelData>;
pub type Receiver = broadcast::Receiver<ChannelData>;

// WaitForReply {{{
#[async_trait]
pub trait WaitForReply {
    #[cfg(not(feature = "mocks"))]
    const TIMEOUT: u64 = 30;

    #[cfg(feature = "mocks")]
    const TIMEOUT: u64 = 0; // fail immediately in tests

    async fn wait_for_reply(&mut self, serial: &str) -> Result<Vec<u8>>;
}
#[async_trait]
impl WaitForReply for Receiver {
    /// The protocol is strictly one frame in flight per inverter, so
    /// the next frame seen from this serial is the reply.
    async fn wait_for_reply(&mut self, serial: &str) -> Result<Vec<u8>> {
        let start = std::time::Instant::now();
        let timeout_duration = Duration::from_secs(Self::TIMEOUT);

        loop {
            if start.elapsed() >= timeout_duration {
                bail!(
                    "timeout waiting for reply from {} after {} seconds",
                    serial,
                    Self::TIMEOUT
                );
            }

            match self.try_recv() {
                Ok(ChannelData::Frame { serial: from, bytes }) => {
                    if from == serial {
                        return Ok(bytes);
                    }
                }
                Ok(ChannelData::Connected(_)) => {}
                Ok(ChannelData::Disconnect(from)) => {
                    if from == serial {
                        bail!("inverter {} disconnected while waiting for reply", from);
                    }
                }
                Ok(ChannelData::Shutdown) => bail!("shutdown received while waiting for reply"),
                Err(broadcast::error::TryRecvError::Empty) => {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                Err(err) => bail!("channel error while waiting for reply: {:?}", err),
            }
        }
    }
} // }}}

/// Splits the byte stream into CR-terminated frames. The protocol core
/// is handed exactly one frame's worth of bytes per decode call.
struct FrameReader;

impl Decoder for FrameReader {
    type Item = Vec<u8>;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::io::Result<Option<Vec<u8>>> {
        match src.iter().position(|b| *b == pi30::frame::TERMINATOR) {
            Some(position) => Ok(Some(src.split_to(position + 1).to_vec())),
            None => Ok(None),
        }
    }
}

const RECONNECT_DELAY_SECS: u64 = 5;
const TCP_KEEPALIVE_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct Inverter {
    config: ConfigWrapper,
    host: String,
    channels: Channels,
}

impl Inverter {
    pub fn new(config: ConfigWrapper, inverter: &config::Inverter, channels: Channels) -> Self {
        Self {
            config: config.clone(),
            host: inverter.host().to_string(),
            channels,
        }
    }

    pub fn config(&self) -> config::Inverter {
        self.config
            .inverter_with_host(&self.host)
            .expect("can't find my inverter")
    }

    pub async fn start(&self) -> Result<()> {
        while let Err(e) = self.connect().await {
            error!("inverter {}: {}", self.config().serial(), e);
            info!(
                "inverter {}: reconnecting in {}s",
                self.config().serial(),
                RECONNECT_DELAY_SECS
            );
            tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECS)).await;
        }

        Ok(())
    }

    pub fn stop(&self) {
        info!("stopping inverter {}...", self.config().serial());
        let _ = self.channels.to_inverter.send(ChannelData::Shutdown);
    }

    async fn connect(&self) -> Result<()> {
        let inverter_config = self.config();
        let serial = inverter_config.serial().to_string();

        info!(
            "inverter {} connecting to {}:{}",
            serial,
            inverter_config.host(),
            inverter_config.port()
        );

        let inverter_hp = (inverter_config.host().to_owned(), inverter_config.port());
        let stream = tokio::time::timeout(
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            tokio::net::TcpStream::connect(inverter_hp),
        )
        .await
        .map_err(|_| anyhow!("connect timed out"))??;

        if inverter_config.use_tcp_nodelay() {
            stream.set_nodelay(true)?;
        }
        let std_stream = stream.into_std()?;
        std_stream.set_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))?;
        let stream = tokio::net::TcpStream::from_std(std_stream)?;

        info!("inverter {} connected", serial);
        let _ = self
            .channels
            .from_inverter
            .send(ChannelData::Connected(serial.clone()));

        let (reader, writer) = stream.into_split();

        let result = futures::try_join!(
            self.receiver(reader, &serial, inverter_config.read_timeout()),
            self.sender(writer, &serial)
        );

        let _ = self
            .channels
            .from_inverter
            .send(ChannelData::Disconnect(serial));

        result.map(|_| ())
    }

    // inverter -> coordinator
    async fn receiver(
        &self,
        reader: tokio::net::tcp::OwnedReadHalf,
        serial: &str,
        read_timeout: u64,
    ) -> Result<()> {
        let mut framed = FramedRead::new(reader, FrameReader);
        let mut shutdown = self.channels.to_inverter.subscribe();

        loop {
            let next = tokio::select! {
                next = tokio::time::timeout(Duration::from_secs(read_timeout), framed.next()) => next,
                message = shutdown.recv() => {
                    if matches!(message, Ok(ChannelData::Shutdown)) {
                        info!("inverter {} receiver received shutdown signal", serial);
                        return Ok(());
                    }
                    continue;
                }
            };

            let frame = match next {
                Err(_) => bail!("no frame from {} for {}s", serial, read_timeout),
                Ok(None) => bail!("connection closed by {}", serial),
                Ok(Some(frame)) => frame?,
            };

            trace!("inverter {} RX {:?}", serial, frame);

            if self
                .channels
                .from_inverter
                .send(ChannelData::Frame {
                    serial: serial.to_string(),
                    bytes: frame,
                })
                .is_err()
            {
                bail!("send(from_inverter) failed - channel closed?");
            }
        }
    }

    // coordinator -> inverter
    async fn sender(
        &self,
        mut writer: tokio::net::tcp::OwnedWriteHalf,
        serial: &str,
    ) -> Result<()> {
        let mut receiver = self.channels.to_inverter.subscribe();

        loop {
            match receiver.recv().await? {
                ChannelData::Frame { serial: target, bytes } => {
                    if target != serial {
                        continue;
                    }
                    trace!("inverter {} TX {:?}", serial, bytes);
                    writer.write_all(&bytes).await?;
                    writer.flush().await?;
                }
                ChannelData::Shutdown => {
                    info!("inverter {} sender received shutdown signal", serial);
                    break;
                }
                _ => {}
            }
        }

        Ok(())
    }
}
