use super::error::{Error, Result};

/// Byte that opens every response frame from the inverter.
pub const LEADER: u8 = b'(';
/// Byte that terminates every frame in both directions.
pub const TERMINATOR: u8 = b'\r';

// leader, two checksum bytes, terminator
const MIN_FRAME_LEN: usize = 4;

/// PI30 frame checksum: CRC-16/XMODEM over everything preceding the two
/// checksum bytes, stored high byte first. Each stored byte colliding
/// with a reserved wire byte (leader, CR, LF) is bumped by one so it can
/// never be mistaken for framing.
pub fn checksum(data: &[u8]) -> [u8; 2] {
    let crc = crc16::State::<crc16::XMODEM>::calculate(data);
    [bump_reserved((crc >> 8) as u8), bump_reserved(crc as u8)]
}

fn bump_reserved(byte: u8) -> u8 {
    match byte {
        LEADER | TERMINATOR | b'\n' => byte + 1,
        _ => byte,
    }
}

/// Build an outgoing request frame: the command bytes, checksummed and
/// CR-terminated. Requests carry no leader; only responses do.
pub fn encode(command_bytes: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(command_bytes.len() + 3);
    frame.extend_from_slice(command_bytes);
    frame.extend_from_slice(&checksum(command_bytes));
    frame.push(TERMINATOR);
    frame
}

/// Validate an incoming response frame and strip its framing, returning
/// the payload between leader and checksum. Fails without producing a
/// partial payload: a structurally broken frame is Framing, an intact
/// frame with a bad checksum is Checksum.
pub fn decode_frame(raw: &[u8]) -> Result<&[u8]> {
    if raw.len() < MIN_FRAME_LEN {
        return Err(Error::Framing {
            reason: "frame too short",
        });
    }
    if raw[raw.len() - 1] != TERMINATOR {
        return Err(Error::Framing {
            reason: "missing terminator",
        });
    }
    if raw[0] != LEADER {
        return Err(Error::Framing {
            reason: "missing response leader",
        });
    }

    let body = &raw[..raw.len() - 3];
    let got = [raw[raw.len() - 3], raw[raw.len() - 2]];
    let want = checksum(body);
    if got != want {
        return Err(Error::Checksum { got, want });
    }

    Ok(&body[1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_matches_known_frames() {
        // captured device responses with known-good trailers
        assert_eq!(checksum(b"(B"), [0xe7, 0xc9]);
        assert_eq!(checksum(b"(ACK"), [0x39, 0x20]);
        assert_eq!(checksum(b"(NAK"), [0x73, 0x73]);
        assert_eq!(checksum(b"(00238800"), [0x21, 0x4a]);
    }

    #[test]
    fn checksum_bumps_reserved_bytes() {
        // raw CRC-16/XMODEM of these is 0x28ec, 0x0d58 and 0x0e0a
        assert_eq!(checksum(b"A2"), [0x29, 0xec]);
        assert_eq!(checksum(b"B5"), [0x0e, 0x58]);
        assert_eq!(checksum(b"C6"), [0x0e, 0x0b]);
    }

    #[test]
    fn encode_appends_checksum_and_terminator() {
        let frame = encode(b"QPI");
        assert_eq!(&frame[..3], b"QPI");
        assert_eq!(frame[frame.len() - 1], TERMINATOR);
        assert_eq!(frame.len(), 6);
    }

    #[test]
    fn decode_rejects_truncated_frame() {
        let mut frame = encode(b"(QPI");
        frame.pop();
        assert!(matches!(
            decode_frame(&frame),
            Err(Error::Framing { .. })
        ));
    }

    #[test]
    fn decode_rejects_corrupted_checksum() {
        let mut frame = encode(b"(QPI");
        let n = frame.len();
        frame[n - 2] ^= 0x01;
        assert!(matches!(decode_frame(&frame), Err(Error::Checksum { .. })));
    }

    #[test]
    fn round_trip_recovers_payload() {
        let frame = encode(b"(00238800");
        assert_eq!(decode_frame(&frame).unwrap(), b"00238800");
    }
}
