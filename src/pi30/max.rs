//! PI30MAX command table (LV6048MAX and similar inverters): the base
//! PI30 table plus the MAX-specific additions and overrides, minus the
//! commands those units no longer answer.

use anyhow::Result;

use super::base;
use super::base::{
    CHARGER_SOURCE_PRIORITIES, DISABLED_ENABLED, ENABLED_DISABLED, INPUT_VOLTAGE_RANGES,
    MACHINE_TYPES, PV_OK_CONDITIONS, PV_POWER_BALANCE, TOPOLOGIES,
};
use super::command::CommandDefinition;
use super::field::{Derivation, FieldSpec};
use super::registry::{Groups, Registry};

const REMOVED_COMMANDS: &[&str] = &["Q1", "QID", "QVFW3"];

const BATTERY_TYPES: &[&str] = &[
    "AGM",
    "Flooded",
    "User",
    "TBD",
    "Pylontech",
    "WECO",
    "Soltaro",
    "LIb-protocol compatible",
    "3rd party Lithium",
];

const OUTPUT_SOURCE_PRIORITIES: &[&str] = &[
    "Utility Solar Battery",
    "Solar Utility Battery",
    "Solar Battery Utility",
];

const OUTPUT_MODES: &[&str] = &[
    "single machine output",
    "parallel output",
    "Phase 1 of 3 Phase output",
    "Phase 2 of 3 Phase output",
    "Phase 3 of 3 Phase output",
    "Phase 1 of 2 phase output",
    "Phase 2 of 2 phase output (120°)",
    "Phase 2 of 2 phase output (180°)",
    "unknown output",
];

const PARALLEL_OUTPUT_MODES: &[&str] = &[
    "single machine",
    "parallel output",
    "Phase 1 of 3 phase output",
    "Phase 2 of 3 phase output",
    "Phase 3 of 3 phase output",
    "Phase 1 of 2 phase output",
    "Phase 2 of 2 phase output (120°)",
    "Phase 2 of 2 phase output (180°)",
    "Unknown Output Mode",
];

const PARALLEL_CHARGER_PRIORITIES: &[&str] =
    &["Utility first", "Solar first", "Solar + Utility", "Solar only"];

const DEVICE_MODES: &[(&str, &str)] = &[
    ("P", "Power on"),
    ("S", "Standby"),
    ("L", "Line"),
    ("B", "Battery"),
    ("F", "Fault"),
    ("H", "Power Saving"),
    ("D", "Shutdown"),
];

const WORK_MODES: &[(&str, &str)] = &[
    ("P", "Power On Mode"),
    ("S", "Standby Mode"),
    ("L", "Line Mode"),
    ("B", "Battery Mode"),
    ("F", "Fault Mode"),
    ("H", "Power Saving Mode"),
    ("D", "Shutdown Mode"),
];

const FAULT_CODES: &[(&str, &str)] = &[
    ("00", "No fault"),
    ("01", "Fan is locked"),
    ("02", "Over temperature"),
    ("03", "Battery voltage is too high"),
    ("04", "Battery voltage is too low"),
    ("05", "Output short circuited or Over temperature"),
    ("06", "Output voltage is too high"),
    ("07", "Over load time out"),
    ("08", "Bus voltage is too high"),
    ("09", "Bus soft start failed"),
    ("10", "PV over current"),
    ("11", "PV over voltage"),
    ("12", "DC over current"),
    ("13", "Battery discharge over current"),
    ("51", "Over current inverter"),
    ("52", "Bus voltage too low"),
    ("53", "Inverter soft start failed"),
    ("54", "Self-test failed"),
    ("55", "Over DC voltage on output of inverter"),
    ("56", "Battery connection is open"),
    ("57", "Current sensor failed"),
    ("58", "Output voltage is too low"),
    ("60", "Power feedback protection"),
    ("71", "Firmware version different"),
    ("72", "Current sharing fault"),
    ("80", "CAN communication failed"),
    ("81", "Parallel host line lost"),
    ("82", "Parallel synchronized signal lost"),
    ("83", "Parallel battery voltage detect different"),
    ("84", "AC input voltage or frequency detected different"),
    ("85", "AC output current unbalanced"),
    ("86", "AC output mode setting different"),
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

const INVERTER_STATUS_FLAGS: &[&str] = &[
    "Is SCC OK",
    "Is AC Charging",
    "Is SCC Charging",
    "Is Battery Over Voltage",
    "Is Battery Under Voltage",
    "Is Line Lost",
    "Is Load On",
    "Is Configuration Changed",
];

// 36 warning positions on MAX units; empty names are reserved bits
const WARNING_FLAGS: &[&str] = &[
    "PV loss warning",
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
    "Reserved",
    "Battery under shutdown warning",
    "Battery derating warning",
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
    "Battery weak 1",
    "Battery weak 2",
    "Battery weak 3",
    "",
    "Battery equalisation warning",
];

const SETTING_FLAGS: &[(char, &str, bool)] = &[
    ('a', "Buzzer", false),
    ('b', "Overload Bypass", false),
    ('d', "Solar Feed to Grid", false),
    ('k', "LCD Reset to Default", false),
    ('u', "Overload Restart", false),
    ('v', "Over Temperature Restart", false),
    ('x', "LCD Backlight", false),
    ('y', "Primary Source Interrupt Alarm", false),
    ('z', "Record Fault Code", false),
];

const COUNTRY_CODES: &[(&str, &str)] = &[
    ("00", "India"),
    ("01", "Germany"),
    ("02", "South America"),
];

const HOURLY_CHARGER_PRIORITIES: &[&str] =
    &["undefined", "Solar first", "Solar + Utility", "Only Solar"];

const CHARGER_PRIORITY_HOURS: &[&str] = &[
    "Charger Source Priority 00 hours",
    "Charger Source Priority 01 hours",
    "Charger Source Priority 02 hours",
    "Charger Source Priority 03 hours",
    "Charger Source Priority 04 hours",
    "Charger Source Priority 05 hours",
    "Charger Source Priority 06 hours",
    "Charger Source Priority 07 hours",
    "Charger Source Priority 08 hours",
    "Charger Source Priority 09 hours",
    "Charger Source Priority 10 hours",
    "Charger Source Priority 11 hours",
    "Charger Source Priority 12 hours",
    "Charger Source Priority 13 hours",
    "Charger Source Priority 14 hours",
    "Charger Source Priority 15 hours",
    "Charger Source Priority 16 hours",
    "Charger Source Priority 17 hours",
    "Charger Source Priority 18 hours",
    "Charger Source Priority 19 hours",
    "Charger Source Priority 20 hours",
    "Charger Source Priority 21 hours",
    "Charger Source Priority 22 hours",
    "Charger Source Priority 23 hours",
];

fn charger_priority_schedule() -> Vec<FieldSpec> {
    let mut fields: Vec<FieldSpec> = CHARGER_PRIORITY_HOURS
        .iter()
        .copied()
        .map(|label| FieldSpec::option(label, HOURLY_CHARGER_PRIORITIES))
        .collect();
    fields.extend([
        FieldSpec::option("Device Charger Source Priority", HOURLY_CHARGER_PRIORITIES),
        FieldSpec::option(
            "Selection of Charger Source Priority Order 1",
            HOURLY_CHARGER_PRIORITIES,
        ),
        FieldSpec::option(
            "Selection of Charger Source Priority Order 2",
            HOURLY_CHARGER_PRIORITIES,
        ),
        FieldSpec::option(
            "Selection of Charger Source Priority Order 3",
            HOURLY_CHARGER_PRIORITIES,
        ),
    ]);
    fields
}

fn query_commands() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::query("QSID", "Device serial number inquiry (long form)")
            .positional(FieldSpec::string("Serial Number", ""))
            .fixture(b"(1492932105105335005535\x94\x0e\r"),
        CommandDefinition::query("VERFW", "Bluetooth version inquiry")
            .positional(FieldSpec::string("Bluetooth version", ""))
            .fixture(b"(00072.70\x23\xf3\r"),
        CommandDefinition::query("QPIRI", "Current Settings inquiry").sequential(vec![
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
            FieldSpec::int("Max charging time for CV stage", "min"),
            FieldSpec::option(
                "Operation Logic",
                &["Automatic mode", "On-line mode", "ECO mode"],
            ),
            FieldSpec::int("Max discharging current", "A"),
        ]),
        CommandDefinition::query("QFLAG", "Flag Status inquiry")
            .positional(FieldSpec::enflags("Device Status", SETTING_FLAGS))
            .fixture(b"(EakxyDbduvz\x8d\x73\r"),
        CommandDefinition::query("QPIGS", "General Status Parameters inquiry")
            .indexed(vec![
                FieldSpec::float("AC Input Voltage", "V").at(1).icon("mdi:power-plug"),
                FieldSpec::float("AC Input Frequency", "Hz").at(2).icon("mdi:current-ac"),
                FieldSpec::float("AC Output Voltage", "V").at(3).icon("mdi:power-plug"),
                FieldSpec::float("AC Output Frequency", "Hz").at(4).icon("mdi:current-ac"),
                FieldSpec::int("AC Output Apparent Power", "VA").at(5).icon("mdi:power-plug"),
                FieldSpec::int("AC Output Active Power", "W").at(6).icon("mdi:power-plug"),
                FieldSpec::int("AC Output Load", "%").at(7).icon("mdi:brightness-percent"),
                FieldSpec::int("BUS Voltage", "V").at(8).icon("mdi:details"),
                FieldSpec::float("Battery Voltage", "V").at(9).icon("mdi:battery-outline"),
                FieldSpec::int("Battery Charging Current", "A").at(10).icon("mdi:current-dc"),
                FieldSpec::int("Battery Capacity", "%").at(11).icon("mdi:battery-outline"),
                FieldSpec::int("Inverter Heat Sink Temperature", "°C").at(12).icon("mdi:details"),
                FieldSpec::float("PV1 Input Current", "A").at(13).icon("mdi:solar-power"),
                FieldSpec::float("PV1 Input Voltage", "V").at(14).icon("mdi:solar-power"),
                FieldSpec::float("Battery Voltage from SCC", "V").at(15).icon("mdi:battery-outline"),
                FieldSpec::int("Battery Discharge Current", "A").at(16).icon("mdi:battery-negative"),
                FieldSpec::flags("Device Status", DEVICE_STATUS_FLAGS).at(17),
                FieldSpec::int("Battery Voltage Offset for Fans On", "10mV").at(18),
                FieldSpec::int("EEPROM Version", "").at(19),
                FieldSpec::int("PV1 Charging Power", "W").at(20).icon("mdi:solar-power"),
                FieldSpec::flags("Device Status2", DEVICE_STATUS2_FLAGS).at(21),
                FieldSpec::option("Solar Feed to Grid", &["Disabled", "Enabled"]).at(22),
                FieldSpec::keyed("Country", COUNTRY_CODES).at(23),
                FieldSpec::int("Solar Feed to Grid Power", "W").at(24),
            ])
            .fixture(
                b"(227.2 50.0 230.3 50.0 0829 0751 010 447 54.50 020 083 0054 02.7 323.6 \
00.00 00000 00010110 00 00 00879 010 0 00 00000\xb5\x1b\r",
            ),
        CommandDefinition::query("QPIGS2", "General Status Parameters inquiry 2")
            .indexed(vec![
                FieldSpec::float("PV2 Input Current", "A").at(1).icon("mdi:solar-power"),
                FieldSpec::float("PV2 Input Voltage", "V").at(2).icon("mdi:solar-power"),
                FieldSpec::int("PV2 Charging Power", "W").at(3).icon("mdi:solar-power"),
            ])
            .fixture(b"(03.1 327.3 01026 \xc9\x8b\r"),
        CommandDefinition::query("QPGS", "Parallel Information inquiry")
            .indexed(vec![
                FieldSpec::option("Parallel instance number", &["Not valid", "valid"]).at(1),
                FieldSpec::string("Serial number", "").at(2),
                FieldSpec::keyed("Work mode", WORK_MODES).at(3),
                FieldSpec::keyed("Fault code", FAULT_CODES).at(4),
                FieldSpec::float("Grid Voltage", "V").at(5).icon("mdi:power-plug"),
                FieldSpec::float("Grid Frequency", "Hz").at(6).icon("mdi:current-ac"),
                FieldSpec::float("AC Output Voltage", "V").at(7).icon("mdi:power-plug"),
                FieldSpec::float("AC Output Frequency", "Hz").at(8).icon("mdi:current-ac"),
                FieldSpec::int("AC Output Apparent Power", "VA").at(9).icon("mdi:power-plug"),
                FieldSpec::int("AC Output Active Power", "W").at(10).icon("mdi:power-plug"),
                FieldSpec::int("Load Percentage", "%").at(11).icon("mdi:brightness-percent"),
                FieldSpec::float("Battery Voltage", "V").at(12).icon("mdi:battery-outline"),
                FieldSpec::int("Battery Charging Current", "A").at(13).icon("mdi:current-dc"),
                FieldSpec::int("Battery Capacity", "%").at(14).icon("mdi:battery-outline"),
                FieldSpec::float("PV1 Input Voltage", "V").at(15).icon("mdi:solar-power"),
                FieldSpec::int("Total Charging Current", "A").at(16),
                FieldSpec::int("Total AC Output Apparent Power", "VA").at(17).icon("mdi:power-plug"),
                FieldSpec::int("Total Output Active Power", "W").at(18).icon("mdi:power-plug"),
                FieldSpec::int("Total AC Output Percentage", "%").at(19).icon("mdi:brightness-percent"),
                FieldSpec::flags("Inverter Status", INVERTER_STATUS_FLAGS).at(20),
                FieldSpec::option("Output mode", PARALLEL_OUTPUT_MODES).at(21),
                FieldSpec::option("Charger source priority", PARALLEL_CHARGER_PRIORITIES).at(22),
                FieldSpec::int("Max Charger Current", "A").at(23),
                FieldSpec::int("Max Charger Range", "A").at(24),
                FieldSpec::int("Max AC Charger Current", "A").at(25),
                FieldSpec::int("PV1 Input Current", "A").at(26).icon("mdi:solar-power"),
                FieldSpec::int("Battery Discharge Current", "A").at(27).icon("mdi:battery-negative"),
                FieldSpec::float("PV2 Input Voltage", "V").at(28).icon("mdi:solar-power"),
                FieldSpec::int("PV2 Input Current", "A").at(29).icon("mdi:solar-power"),
            ])
            .pattern(r"QPGS(\d+)$")
            .fixture(
                b"(0 92932105105315 B 00 000.0 00.00 230.0 50.00 0989 0907 012 53.2 009 \
090 349.8 009 00989 00907 011 10100110 0 1 100 120 030 02 000 275.3 02i]\r",
            ),
        CommandDefinition::query("QMOD", "Mode inquiry")
            .positional(FieldSpec::keyed("Device Mode", DEVICE_MODES))
            .fixture(b"(S\xe5\xd9\r")
            .fixture(b"(B\xe7\xc9\r"),
        CommandDefinition::query("QPIWS", "Warning status inquiry")
            .positional(FieldSpec::stat_flags("Warning", WARNING_FLAGS))
            .fixture(b"(000000000000000000000000000000000000<\x8e\r"),
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
                FieldSpec::option("Output Source Priority", &["Utility first", "Solar first", "SBU first"]),
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
                FieldSpec::int("Max Charging Time at CV", "min"),
                FieldSpec::int("Max Discharging current", "A"),
            ])
            .fixture(
                b"(230.0 50.0 0030 44.0 54.0 56.4 46.0 60 0 0 2 0 0 0 0 0 1 1 1 0 1 0 \
54.0 0 1 224 030\x85\x15\r",
            ),
        CommandDefinition::query("QOPPT", "Device Output Source Priority Time Order inquiry")
            .positional(FieldSpec::string(
                "Device Output Source Priority Time Order",
                "",
            ))
            .fixture(b"(2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 2 0 2 1>>\r"),
        CommandDefinition::query("QCHPT", "Device Charger Source Priority Time Order inquiry")
            .sequential(charger_priority_schedule())
            .fixture(b"(3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 3 0 0 0\xd0\x8b\r"),
        CommandDefinition::query("QT", "Device Time inquiry")
            .sequential(vec![FieldSpec::string("Device Time", "")])
            .fixture(b"(20210726122606JF\r"),
        CommandDefinition::query("QBEQI", "Battery Equalization Status Parameters inquiry")
            .sequential(vec![
                FieldSpec::option("Equalization Enabled", &["Disabled", "Enabled"]),
                FieldSpec::int("Equalization Time", "min"),
                FieldSpec::int("Equalization Period", "day"),
                FieldSpec::int("Equalization Max Current", "A"),
                FieldSpec::string("Reserved1", ""),
                FieldSpec::float("Equalization Voltage", "V"),
                FieldSpec::string("Reserved2", ""),
                FieldSpec::int("Equalization Over Time", "min"),
                FieldSpec::option("Equalization Active", &["Inactive", "Active"]),
                FieldSpec::int("Equalization Elasped Time", "hour"),
            ])
            .fixture(b"(1 030 030 080 021 55.40 224 030 0 0234y?\r"),
        CommandDefinition::query("QET", "Total PV Generated Energy inquiry")
            .sequential(vec![FieldSpec::int("Total PV Generated Energy", "Wh")])
            .fixture(b"(00238800!J\r"),
        CommandDefinition::query("QEY", "Yearly PV Generated Energy inquiry")
            .sequential(vec![
                FieldSpec::int("PV Generated Energy for Year", "Wh"),
                FieldSpec::derived("Year", Derivation::YearFromPrefix),
            ])
            .pattern(r"QEY(\d\d\d\d)$")
            .fixture(b"(00238800!J\r"),
        CommandDefinition::query("QEM", "Monthly PV Generated Energy inquiry")
            .sequential(vec![
                FieldSpec::int("PV Generated Energy for Month", "Wh"),
                FieldSpec::derived("Year", Derivation::YearFromPrefix),
                FieldSpec::derived("Month", Derivation::MonthNameFromDigits),
            ])
            .pattern(r"QEM(\d\d\d\d\d\d)$")
            .fixture(b"(00238800!J\r"),
        CommandDefinition::query("QED", "Daily PV Generated Energy inquiry")
            .sequential(vec![
                FieldSpec::int("PV Generated Energy for Day", "Wh"),
                FieldSpec::derived("Year", Derivation::YearFromPrefix),
                FieldSpec::derived("Month", Derivation::MonthNameFromDigits),
                FieldSpec::derived("Day", Derivation::DayFromSuffix),
            ])
            .pattern(r"QED(\d\d\d\d\d\d\d\d)$")
            .fixture(b"(00238800!J\r"),
        CommandDefinition::query("QLT", "Total Output Load Energy inquiry")
            .sequential(vec![FieldSpec::int("Total Output Load Energy", "Wh")])
            .fixture(b"(00238800!J\r"),
        CommandDefinition::query("QLY", "Yearly Output Load Energy inquiry")
            .sequential(vec![
                FieldSpec::int("Output Load Energy for Year", "Wh"),
                FieldSpec::derived("Year", Derivation::YearFromPrefix),
            ])
            .pattern(r"QLY(\d\d\d\d)$")
            .fixture(b"(00238800!J\r"),
        CommandDefinition::query("QLM", "Monthly Output Load Energy inquiry")
            .sequential(vec![
                FieldSpec::int("Output Load Energy for Month", "Wh"),
                FieldSpec::derived("Year", Derivation::YearFromPrefix),
                FieldSpec::derived("Month", Derivation::MonthNameFromDigits),
            ])
            .pattern(r"QLM(\d\d\d\d\d\d)$")
            .fixture(b"(00238800!J\r"),
        CommandDefinition::query("QLD", "Daily Output Load Energy inquiry")
            .sequential(vec![
                FieldSpec::int("Output Load Energy for Day", "Wh"),
                FieldSpec::derived("Year", Derivation::YearFromPrefix),
                FieldSpec::derived("Month", Derivation::MonthNameFromDigits),
                FieldSpec::derived("Day", Derivation::DayFromSuffix),
            ])
            .pattern(r"QLD(\d\d\d\d\d\d\d\d)$")
            .fixture(b"(00238800!J\r"),
        CommandDefinition::query("QLED", "LED Status Parameters inquiry")
            .sequential(vec![
                FieldSpec::option("LED Enabled", &["Disabled", "Enabled"]),
                FieldSpec::option("LED Speed", &["Low", "Medium", "Fast"]),
                FieldSpec::option(
                    "LED Effect",
                    &["Breathing", "Unknown", "Solid", "Right Scrolling"],
                ),
                FieldSpec::int("LED Brightness", ""),
                FieldSpec::int("LED Number of Colors", ""),
                FieldSpec::string("RGB", ""),
            ])
            .fixture(b"(1 1 2 5 3 148000211255255255000255255\xdaj\r"),
    ]
}

fn setter_commands() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::setter("PLEDE", "Enable/disable LED function")
            .pattern(r"PLEDE([01])$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
        CommandDefinition::setter("PLEDS", "Set LED speed")
            .pattern(r"PLEDS([012])$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
        CommandDefinition::setter("PLEDM", "Set LED effect")
            .pattern(r"PLEDM([0123])$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
        CommandDefinition::setter("PLEDB", "Set LED brightness")
            .pattern(r"PLEDB([123456789])$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
        CommandDefinition::setter("PLEDT", "Set LED total number of colors")
            .pattern(r"PLEDT([123])$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
        CommandDefinition::setter("PLEDC", "Set LED color")
            .pattern(r"PLEDC(\d\d\d\d\d\d\d\d\d\d)$")
            .fixture(b"(NAK\x73\x73\r")
            .fixture(b"(ACK\x39\x20\r"),
    ]
}

pub fn groups() -> Groups {
    Groups {
        status: vec!["QPIGS", "QPIGS2"],
        settings: vec!["QPIRI", "QFLAG"],
        default: "QPI",
    }
}

/// The MAX registry is the base registry with this family's additions
/// applied and the commands those units dropped removed.
pub fn registry() -> Result<Registry> {
    let mut additions = query_commands();
    additions.extend(setter_commands());

    base::registry()?.layer(additions, REMOVED_COMMANDS, groups())
}
