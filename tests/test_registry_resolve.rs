use pi30_bridge::pi30::{base, max, Error, Protocol, ResponseLayout};

#[test]
fn exact_names_beat_parameter_patterns() {
    let protocol = Protocol::pi30max().unwrap();

    // QED carries both an exact name and a QED(\d{8}) pattern; the
    // bare name must resolve to the exact entry with no parameter
    let (definition, param) = protocol.registry().resolve("QED").unwrap();
    assert_eq!(definition.name, "QED");
    assert_eq!(param, None);

    let (definition, param) = protocol.registry().resolve("QED20210726").unwrap();
    assert_eq!(definition.name, "QED");
    assert_eq!(param.as_deref(), Some("20210726"));
}

#[test]
fn patterns_must_match_the_whole_command() {
    let protocol = Protocol::pi30max().unwrap();

    let (definition, param) = protocol.registry().resolve("QPGS0").unwrap();
    assert_eq!(definition.name, "QPGS");
    assert_eq!(param.as_deref(), Some("0"));

    // eight digits required, not four
    assert_eq!(
        protocol.registry().resolve("QED2021").unwrap_err(),
        Error::ParameterMismatch {
            command: "QED2021".to_string(),
            name: "QED".to_string(),
        }
    );
}

#[test]
fn unknown_commands_are_reported_as_such() {
    let protocol = Protocol::pi30max().unwrap();
    assert_eq!(
        protocol.registry().resolve("XYZZY").unwrap_err(),
        Error::UnknownCommand {
            command: "XYZZY".to_string(),
        }
    );
}

#[test]
fn layering_adds_overrides_and_removes() {
    let base = base::registry().unwrap();
    let max = max::registry().unwrap();

    // additions
    assert!(base.get("QSID").is_none());
    assert!(max.get("QSID").is_some());

    // removals
    for name in ["Q1", "QID", "QVFW3"] {
        assert!(base.get(name).is_some(), "{} should be in the base table", name);
        assert!(max.get(name).is_none(), "{} should be removed from MAX", name);
    }

    // overrides replace in place: the MAX QPIGS is the indexed variant
    assert_eq!(base.get("QPIGS").unwrap().layout, ResponseLayout::Sequential);
    assert_eq!(max.get("QPIGS").unwrap().layout, ResponseLayout::Indexed);

    // the base registry is untouched by the layering
    assert_eq!(base.status_commands(), &["QPIGS"]);
    assert_eq!(max.status_commands(), &["QPIGS", "QPIGS2"]);
    assert_eq!(max.settings_commands(), &["QPIRI", "QFLAG"]);
    assert_eq!(max.default_command(), "QPI");
}

#[test]
fn removing_an_absent_name_is_not_an_error() {
    let base = base::registry().unwrap();
    let layered = base
        .layer(Vec::new(), &["NOSUCH"], pi30_bridge::pi30::Groups {
            status: vec!["QPIGS"],
            settings: vec!["QPIRI"],
            default: "QPI",
        })
        .unwrap();
    assert_eq!(layered.len(), base.len());
}

#[test]
fn group_lists_must_reference_real_commands() {
    let result = base::registry().unwrap().layer(
        Vec::new(),
        &[],
        pi30_bridge::pi30::Groups {
            status: vec!["NOSUCH"],
            settings: vec![],
            default: "QPI",
        },
    );
    assert!(result.is_err());
}
