use pi30_bridge::pi30::frame;

pub struct Factory;

impl Factory {
    /// Build a valid response frame around a payload, the way the
    /// inverter would: leader, payload, checksum, terminator.
    pub fn response(payload: &str) -> Vec<u8> {
        frame::encode(format!("({}", payload).as_bytes())
    }
}
