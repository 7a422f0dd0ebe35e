mod common;
use common::*;

use pi30_bridge::pi30::{Error, Protocol, Value};

#[test]
fn positional_keyed_decode() {
    let protocol = Protocol::pi30max().unwrap();

    let reading = protocol
        .decode_response("QMOD", &Factory::response("B"))
        .unwrap();
    assert_eq!(reading.len(), 1);
    assert_eq!(
        reading.get("Device Mode").unwrap().value,
        Value::String("Battery".to_string())
    );
}

#[test]
fn keyed_decode_rejects_unknown_codes() {
    let protocol = Protocol::pi30max().unwrap();

    let err = protocol
        .decode_response("QMOD", &Factory::response("X"))
        .unwrap_err();
    assert_eq!(
        err,
        Error::FieldDecode {
            command: "QMOD".to_string(),
            label: "Device Mode",
            token: "X".to_string(),
        }
    );
}

#[test]
fn ack_decode() {
    let protocol = Protocol::pi30max().unwrap();

    let reading = protocol
        .decode_response("PLEDE1", &Factory::response("NAK"))
        .unwrap();
    assert_eq!(
        reading.get("Command execution").unwrap().value,
        Value::String("Failed".to_string())
    );

    let reading = protocol
        .decode_response("PLEDE0", &Factory::response("ACK"))
        .unwrap();
    assert_eq!(
        reading.get("Command execution").unwrap().value,
        Value::String("Successful".to_string())
    );

    assert!(protocol
        .decode_response("PLEDE1", &Factory::response("MAYBE"))
        .is_err());
}

#[test]
fn sequential_decode_preserves_declaration_order() {
    let protocol = Protocol::pi30max().unwrap();

    let reading = protocol
        .decode_response(
            "QBEQI",
            &Factory::response("1 030 030 080 021 55.40 224 030 0 0234"),
        )
        .unwrap();
    assert_eq!(reading.len(), 10);

    let labels: Vec<&str> = reading.fields().iter().map(|f| f.label).collect();
    assert_eq!(labels[0], "Equalization Enabled");
    assert_eq!(labels[5], "Equalization Voltage");
    assert_eq!(labels[9], "Equalization Elasped Time");

    assert_eq!(
        reading.get("Equalization Enabled").unwrap().value,
        Value::String("Enabled".to_string())
    );
    assert_eq!(
        reading.get("Equalization Voltage").unwrap().value,
        Value::Float(55.40)
    );
    assert_eq!(reading.get("Equalization Voltage").unwrap().unit, "V");
}

#[test]
fn sequential_decode_fails_fast_on_missing_tokens() {
    let protocol = Protocol::pi30max().unwrap();

    let err = protocol
        .decode_response("QBEQI", &Factory::response("1 030 030"))
        .unwrap_err();
    assert_eq!(
        err,
        Error::ShortResponse {
            command: "QBEQI".to_string(),
            needed: 10,
            got: 3,
        }
    );
}

#[test]
fn flags_decode_sets_bit_positions() {
    let protocol = Protocol::pi30().unwrap();

    let reading = protocol
        .decode_response(
            "QPIGS",
            &Factory::response(
                "227.2 50.0 230.3 50.0 0829 0751 010 447 54.50 020 083 0054 02.7 323.6 \
                 00.00 00000 00010110 00 00 00879 010",
            ),
        )
        .unwrap();

    // one entry per field spec, the flag-set is a single value
    assert_eq!(reading.len(), 21);

    let Value::Flags(flags) = &reading.get("Device Status").unwrap().value else {
        panic!("expected a flag-set");
    };
    let active: Vec<&str> = flags.iter().filter(|f| f.active).map(|f| f.name).collect();
    // bit string 00010110: positions 3, 5 and 6 are set
    assert_eq!(
        active,
        vec!["Is Load On", "Is Charging On", "Is SCC Charging On"]
    );
}

#[test]
fn enflags_decode_flips_listed_codes() {
    let protocol = Protocol::pi30max().unwrap();

    let reading = protocol
        .decode_response("QFLAG", &Factory::response("EakxyDbduvz"))
        .unwrap();
    let Value::Flags(flags) = &reading.get("Device Status").unwrap().value else {
        panic!("expected a flag-set");
    };

    // every configured code appears in the token, so every flag is
    // flipped away from its disabled default; E and D are ignored
    assert_eq!(flags.len(), 9);
    assert!(flags.iter().all(|f| f.active));
}

#[test]
fn indexed_decode_ignores_undeclared_tokens() {
    let protocol = Protocol::pi30max().unwrap();

    // QPIGS2 declares indices 1..3; tokens 4..24 must be ignored
    let mut payload = "03.1 327.3 01026".to_string();
    for extra in 0..21 {
        payload.push_str(&format!(" {:04}", extra));
    }

    let reading = protocol
        .decode_response("QPIGS2", &Factory::response(&payload))
        .unwrap();
    assert_eq!(reading.len(), 3);
    assert_eq!(
        reading.get("PV2 Input Current").unwrap().value,
        Value::Float(3.1)
    );
    assert_eq!(
        reading.get("PV2 Charging Power").unwrap().value,
        Value::Int(1026)
    );
}

#[test]
fn indexed_decode_fails_when_an_index_is_beyond_the_tokens() {
    let protocol = Protocol::pi30max().unwrap();

    let err = protocol
        .decode_response("QPIGS2", &Factory::response("03.1 327.3"))
        .unwrap_err();
    assert_eq!(
        err,
        Error::ShortResponse {
            command: "QPIGS2".to_string(),
            needed: 3,
            got: 2,
        }
    );
}

#[test]
fn derived_fields_come_from_the_command_parameter() {
    let protocol = Protocol::pi30max().unwrap();

    let reading = protocol
        .decode_response("QED20210726", &Factory::response("00238800"))
        .unwrap();

    assert_eq!(reading.len(), 4);
    assert_eq!(
        reading.get("PV Generated Energy for Day").unwrap().value,
        Value::Int(238800)
    );
    assert_eq!(
        reading.get("Year").unwrap().value,
        Value::String("2021".to_string())
    );
    assert_eq!(
        reading.get("Month").unwrap().value,
        Value::String("July".to_string())
    );
    assert_eq!(
        reading.get("Day").unwrap().value,
        Value::String("26".to_string())
    );
}

#[test]
fn whole_payload_fields_keep_their_spaces() {
    let protocol = Protocol::pi30max().unwrap();

    let reading = protocol
        .decode_response(
            "QOPPT",
            &Factory::response("2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 0 2 1"),
        )
        .unwrap();
    assert_eq!(reading.len(), 1);
    assert_eq!(
        reading
            .get("Device Output Source Priority Time Order")
            .unwrap()
            .value,
        Value::String("2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 0 2 1".to_string())
    );
}

#[test]
fn build_request_validates_before_encoding() {
    let protocol = Protocol::pi30max().unwrap();

    // the literal command string is the frame body, parameter included
    let frame = protocol.build_request("QPGS0").unwrap();
    assert!(frame.starts_with(b"QPGS0"));
    assert!(frame.ends_with(b"\r"));

    // a malformed parameter is rejected before any frame is built
    assert!(matches!(
        protocol.build_request("QPGSx"),
        Err(Error::ParameterMismatch { .. })
    ));
    assert!(matches!(
        protocol.build_request("NOPE"),
        Err(Error::UnknownCommand { .. })
    ));
}

#[test]
fn reading_serializes_in_field_order() {
    let protocol = Protocol::pi30max().unwrap();

    let reading = protocol
        .decode_response("QED20210726", &Factory::response("00238800"))
        .unwrap();
    let json = serde_json::to_string(&reading).unwrap();

    let command = json.find("\"_command\"").unwrap();
    let energy = json.find("PV Generated Energy for Day").unwrap();
    let year = json.find("\"Year\"").unwrap();
    let day = json.find("\"Day\"").unwrap();
    assert!(command < energy && energy < year && year < day);
}
