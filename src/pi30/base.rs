//! Generic PI30 command table. Device families layer their own
//! additions and removals on top of this (see `max`); nothing here is
//! engineering logic, just the declarative wire schema.

use anyhow::Result;

use super::command::CommandDefinition;
use super::field::FieldSpec;
use super::registry::{Groups, Registry};

pub(crate) const INPUT_VOLTAGE_RANGES: &[&str] = &["Appliance", "UPS"];

pub(crate) const CHARGER_SOURCE_PRIORITIES: &[&str] = &[
    "Utility first",
    "Solar first",
    "Solar + Utility",
    "Only solar charging permitted",
];

pub(crate) const MACHINE_TYPES: &[(&str, &str)] =
    &[("00", "Grid tie"), ("01", "Off Grid"), ("10", "Hybrid")];

pub(crate) const TOPOLOGIES: &[&str] = &["transformerless", "transformer"];

pub(crate) const PV_OK_CONDITIONS: &[&str] = &[
    "As long as one unit of inverters has connect PV, parallel system will consider PV OK",
    "Only All of inverters have connect PV, parallel system will consider PV OK",
];

pub(crate) const PV_POWER_BALANCE: &[&str] = &[
    "PV input max current will be the max charged current",
    "PV input max power will be the sum of the max charged power and loads power",
];

pub(crate) const ENABLED_DISABLED: &[&str] = &["enabled", "disabled"];
pub(crate) const DISABLED_ENABLED: &[&str] = &["disabled", "enabled"];

const BATTERY_TYPES: &[&str] = &["AGM", "Flooded", "User"];

const OUTPUT_SOURCE_PRIORITIES: &[&str] = &["Utility first", "Solar first", "SBU first"];

const OUTPUT_MODES: &[&str] = &[
    "single machine output",
    "parallel output",
    "Phase 1 of 3 Phase output",
    "Phase 2 of 3 Phase output",
    "Phase 3 of 3 Phase output",
];

const DEVICE_MODES: &[(&str, &str)] = &[
    ("P", "Power on"),
    ("S", "Standby"),
    ("L", "Line"),
    ("B", "Battery"),
    ("F", "Fault"),
    ("H", "Power Saving"),
];

const DEVICE_STATUS_FLAGS: &[&str] = &[
    "Is SBU Priority Version Added",
    "Is Configuration Changed",
    "Is SCC Firmware Updated",
    "Is Load On",
    "Is Battery Voltage to Steady While Charging",
    "Is Charging On",
    "Is SCC Charging On",
    "Is AC Charging On",
];

const DEVICE_STATUS2_FLAGS: &[&str] = &[
    "Is Charging to Float",
    "Is Switched On",
    "Is Dustproof Installed",
];

// 32 warning positions; empty names are reserved bits
const WARNING_FLAGS: &[&str] = &[
    "",
    "Inverter fault",
    "Bus over fault",
    "Bus under fault",
    "Bus soft fail fault",
    "Line fail warning",
    "OPV short warning",
    "Inverter voltage too low fault",
    "Inverter voltage too high fault",
    "Over temperature fault",
    "Fan locked fault",
    "Battery voltage to high fault",
    "Battery low alarm warning",
    "",
    "Battery under shutdown warning",
    "",
    "Overload fault",
    "EEPROM fault",
    "Inverter over current fault",
    "Inverter soft fail fault",
    "Self test fail fault",
    "OP DC voltage over fault",
    "Bat open fault",
    "Current sensor fail fault",
    "Battery short fault",
    "Power limit warning",
    "PV voltage high warning",
    "MPPT overload fault",
    "MPPT overload warning",
    "Battery too low to charge warning",
    "",
    "",
];

const SETTING_FLAGS: &[(char, &str, bool)] = &[
    ('a', "Buzzer", false),
    ('b', "Overload Bypass", false),
    ('j', "Power Saving", false),
    ('k', "LCD Reset to Default", false),
    ('u', "Overload Restart", false),
    ('v', "Over Temperature Restart", false),
    ('x', "LCD Backlight", false),
    ('y', "Primary Source Interrupt Alarm", false),
    ('z', "Record Fault Code", false),
];

const CHARGE_STAGES: &[(&str, &str)] = &[
    ("10", "nocharging"),
    ("11", "bulk stage"),
    ("12", "absorb"),
    ("13", "float"),
];

pub fn commands() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::query("QPI", "Device protocol ID inquiry")
            .positional(FieldSpec::string("Protocol ID", ""))
            .fixture(b"(PI30\x9a\x0b\r"),
        CommandDefinition::query("QID", "Device serial number inquiry")
            .positional(FieldSpec::string("Serial Number", ""))
            .fixture(b"(92932004102443\x2e\x2a\r"),
        CommandDefinition::query("QVFW", "Main CPU firmware version inquiry")
            .positional(FieldSpec::string("Main CPU firmware version", ""))
            .fixture(b"(VERFW:00072.70\x53\xa7\r"),
        CommandDefinition::query("QVFW2", "Secondary CPU firmware version inquiry")
            .positional(FieldSpec::string("Secondary CPU firmware version", ""))
            .fixture(b"(VERFW2:00072.70\xa5\xf0\r"),
        CommandDefinition::query("QVFW3", "Remote CPU firmware version inquiry")
            .positional(FieldSpec::string("Remote CPU firmware version", "")),
        CommandDefinition::query("Q1", "Undocumented status inquiry").sequential(vec![
            FieldSpec::int("Time Until Absorb Charging End", "sec"),
            FieldSpec::int("Time Until Float Charging End", "sec"),
            FieldSpec::option(
                "SCC Communication",
                &["Not communicating", "Powered and communicating"],
            ),
            FieldSpec::int("SCC PWM Temperature", "°C"),
            FieldSpec::int("Inverter Temperature", "°C"),
            FieldSpec::int("Battery Temperature", "°C"),
            FieldSpec::int("Transformer Temperature", "°C"),
            FieldSpec::option("Fan Lock Status", &["Not locked", "Locked"]),
            FieldSpec::int("Fan PWM Speed", "%"),
            FieldSpec::int("SCC Charge Power", "W"),
            FieldSpec::float("Sync Frequency", "Hz"),
            FieldSpec::keyed("Inverter Charge Status", CHARGE_STAGES),
        ])
        .fixture(b"(2268 195 1 053 036 034 040 0 0040 0025 50.00 12\xf0\x41\r"),
        CommandDefinition::query("QMOD", "Mode inquiry")
            .positional(FieldSpec::keyed("Device Mode", DEVICE_MODES))
            .fixture(b"(B\xe7\xc9\r"),
        CommandDefinition::query("QPIGS", "General Status Parameters inquiry")
            .sequential(vec![
                FieldSpec::float("AC Input Voltage", "V"),
                FieldSpec::float("AC Input Frequency", "Hz"),
                FieldSpec::float("AC Output Voltage", "V"),
                FieldSpec::float("AC Output Frequency", "Hz"),
                FieldSpec::int("AC Output Apparent Power", "VA"),
                FieldSpec::int("AC Output Active Power", "W"),
                FieldSpec::int("AC Output Load", "%"),
                FieldSpec::int("BUS Voltage", "V"),
                FieldSpec::float("Battery Voltage", "V"),
                FieldSpec::int("Battery Charging Current", "A"),
                FieldSpec::int("Battery Capacity", "%"),
                FieldSpec::int("Inverter Heat Sink Temperature", "°C"),
                FieldSpec::float("PV Input Current for Battery", "A"),
                FieldSpec::float("PV Input Voltage", "V"),
                FieldSpec::float("Battery Voltage from SCC", "V"),
                FieldSpec::int("Battery Discharge Current", "A"),
                FieldSpec::flags("Device Status", DEVICE_STATUS_FLAGS),
                FieldSpec::int("Battery Voltage Offset for Fans On", "10mV"),
                FieldSpec::int("EEPROM Version", ""),
                FieldSpec::int("PV Charging Power", "W"),
                FieldSpec::flags("Device Status2", DEVICE_STATUS2_FLAGS),
            ])
            .fixture(
                b"(227.2 50.0 230.3 50.0 0829 0751 010 447 54.50 020 083 0054 02.7 323.6 \
00.00 00000 00010110 00 00 00879 010\xf1\x8c\r",
            ),
        CommandDefinition::query("QPIRI", "Current Settings inquiry")
            .sequential(vec![
                FieldSpec::float("AC Input Voltage", "V"),
                FieldSpec::float("AC Input Current", "A"),
                FieldSpec::float("AC Output Voltage", "V"),
                FieldSpec::float("AC Output Frequency", "Hz"),
                FieldSpec::float("AC Output Current", "A"),
                FieldSpec::int("AC Output Apparent Power", "VA"),
                FieldSpec::int("AC Output Active Power", "W"),
                FieldSpec::float("Battery Voltage", "V"),
                FieldSpec::float("Battery Recharge Voltage", "V"),
                FieldSpec::float("Battery Under Voltage", "V"),
                FieldSpec::float("Battery Bulk Charge Voltage", "V"),
                FieldSpec::float("Battery Float Charge Voltage", "V"),
                FieldSpec::option("Battery Type", BATTERY_TYPES),
                FieldSpec::int("Max AC Charging Current", "A"),
                FieldSpec::int("Max Charging Current", "A"),
                FieldSpec::option("Input Voltage Range", INPUT_VOLTAGE_RANGES),
                FieldSpec::option("Output Source Priority", OUTPUT_SOURCE_PRIORITIES),
                FieldSpec::option("Charger Source Priority", CHARGER_SOURCE_PRIORITIES),
                FieldSpec::int("Max Parallel Units", "units"),
                FieldSpec::str_keyed("Machine Type", MACHINE_TYPES),
                FieldSpec::option("Topology", TOPOLOGIES),
                FieldSpec::option("Output Mode", OUTPUT_MODES),
                FieldSpec::float("Battery Redischarge Voltage", "V"),
                FieldSpec::option("PV OK Condition", PV_OK_CONDITIONS),
                FieldSpec::option("PV Power Balance", PV_POWER_BALANCE),
            ])
            .fixture(
                b"(230.0 21.7 230.0 50.0 21.7 5000 4000 48.0 46.0 42.0 56.4 54.0 0 10 \
010 1 0 0 6 01 0 0 54.0 0 1\x6f\x7e\r",
            ),
        CommandDefinition::query("QPIWS", "Warning status inquiry")
            .positional(FieldSpec::stat_flags("Warning", WARNING_FLAGS))
            .fixture(b"(00000100000000001000000000000000\x56\xa6\r"),
        CommandDefinition::query("QFLAG", "Flag Status inquiry")
            .positional(FieldSpec::enflags("Device Status", SETTING_FLAGS))
            .fixture(b"(EakxyDbjuvz\x2f\x29\r"),
        CommandDefinition::query("QDI", "Default Settings inquiry")
            .sequential(vec![
                FieldSpec::float("AC Output Voltage", "V"),
                FieldSpec::float("AC Output Frequency", "Hz"),
                FieldSpec::int("Max AC Charging Current", "A"),
                FieldSpec::float("Battery Under Voltage", "V"),
                FieldSpec::float("Battery Float Charge Voltage", "V"),
                FieldSpec::float("Battery Bulk Charge Voltage", "V"),
                FieldSpec::float("Battery Recharge Voltage", "V"),
                FieldSpec::int("Max Charging Current", "A"),
                FieldSpec::option("Input Voltage Range", INPUT_VOLTAGE_RANGES),
                FieldSpec::option("Output Source Priority", OUTPUT_SOURCE_PRIORITIES),
                FieldSpec::option("Charger Source Priority", CHARGER_SOURCE_PRIORITIES),
                FieldSpec::option("Battery Type", BATTERY_TYPES),
                FieldSpec::option("Buzzer", ENABLED_DISABLED),
                FieldSpec::option("Power saving", DISABLED_ENABLED),
                FieldSpec::option("Overload restart", DISABLED_ENABLED),
                FieldSpec::option("Over temperature restart", DISABLED_ENABLED),
                FieldSpec::option("LCD Backlight", DISABLED_ENABLED),
                FieldSpec::option("Primary source interrupt alarm", DISABLED_ENABLED),
                FieldSpec::option("Record fault code", DISABLED_ENABLED),
                FieldSpec::option("Overload bypass", DISABLED_ENABLED),
                FieldSpec::option("LCD reset to default", DISABLED_ENABLED),
                FieldSpec::option("Output mode", OUTPUT_MODES),
                FieldSpec::float("Battery Redischarge Voltage", "V"),
                FieldSpec::option("PV OK condition", PV_OK_CONDITIONS),
                FieldSpec::option("PV Power Balance", PV_POWER_BALANCE),
            ])
            .fixture(
                b"(230.0 50.0 0030 42.0 54.0 56.4 46.0 60 0 0 2 0 0 0 0 0 1 1 1 0 1 0 \
54.0 0 1\xfd\xd8\r",
            ),
        CommandDefinition::query("QMCHGCR", "Max Charging Current Options inquiry")
            .positional(FieldSpec::string("Max Charging Current Options", "A"))
            .fixture(b"(010 020 030 040 050 060 070 080 090 100 110 120\x0c\xcb\r"),
        CommandDefinition::query("QMUCHGCR", "Max Utility Charging Current Options inquiry")
            .positional(FieldSpec::string("Max Utility Charging Current Options", "A"))
            .fixture(b"(002 010 020 030 040 050 060 070 080 090 100 110 120\xca\x23\r"),
        CommandDefinition::query("QOPM", "Output Mode inquiry")
            .positional(FieldSpec::option("Output mode", OUTPUT_MODES))
            .fixture(b"(0\xb9\x1c\r"),
        CommandDefinition::query("QBOOT", "DSP Has Bootstrap inquiry")
            .positional(FieldSpec::option("DSP Has Bootstrap", &["No", "Yes"]))
            .fixture(b"(0\xb9\x1c\r"),
        CommandDefinition::setter("POP", "Set Device Output Source Priority")
            .pattern(r"POP(0[012])$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
        CommandDefinition::setter("PCP", "Set Device Charger Priority")
            .pattern(r"PCP(0[0123])$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
        CommandDefinition::setter("PSDV", "Set Battery Cut-off Voltage")
            .pattern(r"PSDV(\d\d\.\d)$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
        CommandDefinition::setter("PBCV", "Set Battery Re-charge Voltage")
            .pattern(r"PBCV(\d\d\.\d)$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
        CommandDefinition::setter("F", "Set Device Output Frequency")
            .pattern(r"F(50|60)$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
    ]
}

pub fn groups() -> Groups {
    Groups {
        status: vec!["QPIGS"],
        settings: vec!["QPIRI", "QFLAG"],
        default: "QPI",
    }
}

pub fn registry() -> Result<Registry> {
    Registry::build(commands(), groups())
}
