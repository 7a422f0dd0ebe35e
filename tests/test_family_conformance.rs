use pi30_bridge::pi30::Protocol;

#[test]
fn pi30_fixtures_decode() {
    Protocol::pi30().unwrap().verify_fixtures().unwrap();
}

#[test]
fn pi30max_fixtures_decode() {
    Protocol::pi30max().unwrap().verify_fixtures().unwrap();
}

#[test]
fn families_are_selected_by_name() {
    assert_eq!(Protocol::for_family("pi30").unwrap().id(), "PI30");
    assert_eq!(Protocol::for_family("pi30max").unwrap().id(), "PI30MAX");
    assert!(Protocol::for_family("pi99").is_err());
}

#[test]
fn every_group_command_resolves() {
    for protocol in [Protocol::pi30().unwrap(), Protocol::pi30max().unwrap()] {
        let registry = protocol.registry();
        for name in registry
            .status_commands()
            .iter()
            .chain(registry.settings_commands())
            .chain(std::iter::once(&registry.default_command()))
        {
            assert!(
                registry.resolve(name).is_ok(),
                "{}: group command {} must resolve",
                protocol.id(),
                name
            );
        }
    }
}
