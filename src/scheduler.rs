use crate::prelude::*;

pub struct Scheduler {
    config: ConfigWrapper,
    channels: Channels,
}

impl Scheduler {
    pub fn new(config: ConfigWrapper, channels: Channels) -> Self {
        Self { config, channels }
    }

    /// Ticks the coordinator into polling every enabled inverter's
    /// status command group. The coordinator owns the per-family
    /// command lists; we just keep time.
    pub async fn start(&self) -> Result<()> {
        let Some(scheduler) = self.config.scheduler() else {
            info!("scheduler not configured, skipping");
            return Ok(());
        };
        if !scheduler.enabled() {
            info!("scheduler disabled, skipping");
            return Ok(());
        }

        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(scheduler.poll_interval_secs()));

        loop {
            interval.tick().await;

            if self
                .channels
                .to_coordinator
                .send(coordinator::ChannelData::PollInverters)
                .is_err()
            {
                bail!("send(to_coordinator) failed - channel closed?");
            }
        }
    }
}
