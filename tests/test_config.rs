use std::io::Write;

use pi30_bridge::config::Config;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn minimal_config_gets_defaults() {
    let file = write_config(
        r#"
inverters:
  - host: 10.0.0.10
    port: 8000
    serial: "92932004102443"
mqtt:
  host: localhost
influx:
  enabled: false
  url: http://localhost:8086
  database: pi30
"#,
    );

    let config = Config::new(file.path().to_string_lossy().to_string()).unwrap();

    assert_eq!(config.inverters.len(), 1);
    let inverter = &config.inverters[0];
    assert!(inverter.enabled());
    assert_eq!(inverter.protocol(), "pi30max");
    assert_eq!(inverter.serial(), "92932004102443");
    assert_eq!(inverter.read_timeout(), 900);

    assert!(config.mqtt.enabled());
    assert_eq!(config.mqtt.port(), 1883);
    assert_eq!(config.mqtt.namespace(), "pi30");
    assert!(!config.mqtt.publish_individual_readings());

    assert!(!config.influx.enabled());
    assert!(!config.read_only);
    assert_eq!(config.loglevel, "info");
}

#[test]
fn explicit_values_win_over_defaults() {
    let file = write_config(
        r#"
loglevel: debug
read_only: true
inverters:
  - host: 10.0.0.10
    port: 8000
    serial: inv1
    protocol: pi30
    enabled: false
mqtt:
  enabled: false
  host: broker
  port: 8883
  namespace: solar
influx:
  url: http://influx:8086
  database: readings
scheduler:
  poll_interval_secs: 30
"#,
    );

    let config = Config::new(file.path().to_string_lossy().to_string()).unwrap();

    assert_eq!(config.loglevel, "debug");
    assert!(config.read_only);
    assert_eq!(config.inverters[0].protocol(), "pi30");
    assert!(!config.inverters[0].enabled());
    assert_eq!(config.mqtt.namespace(), "solar");
    assert_eq!(config.scheduler.unwrap().poll_interval_secs(), 30);
}

#[test]
fn missing_file_is_an_error() {
    assert!(Config::new("/nonexistent/config.yaml".to_string()).is_err());
}
