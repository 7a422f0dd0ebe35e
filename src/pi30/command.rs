use super::field::FieldSpec;

/// Standard setter acknowledgement outcomes shared by every SETTER
/// definition in the PI30 families.
pub const ACK_OUTCOMES: &[(&str, &str)] = &[("NAK", "Failed"), ("ACK", "Successful")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Query,
    Setter,
}

/// How payload tokens are mapped onto FieldSpecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseLayout {
    /// the whole payload feeds the single declared field
    Positional,
    /// whitespace-split tokens consumed 1:1 in declaration order
    Sequential,
    /// each field names an explicit 1-based token index
    Indexed,
}

/// Declarative description of one protocol command: how to ask for it
/// and how to decode what comes back.
#[derive(Debug, Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: CommandKind,
    pub layout: ResponseLayout,
    pub fields: Vec<FieldSpec>,
    /// regex matched against the full command string for parameterized
    /// commands (e.g. QPGS0, QED20210726); compiled at registry build
    pub pattern: Option<&'static str>,
    /// literal example response frames used by the conformance check
    pub fixtures: Vec<&'static [u8]>,
}

impl CommandDefinition {
    pub fn query(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind: CommandKind::Query,
            layout: ResponseLayout::Positional,
            fields: Vec::new(),
            pattern: None,
            fixtures: Vec::new(),
        }
    }

    /// Setter responses are always the single standard ack field,
    /// whatever the layout says.
    pub fn setter(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind: CommandKind::Setter,
            layout: ResponseLayout::Positional,
            fields: vec![FieldSpec::ack("Command execution", ACK_OUTCOMES)],
            pattern: None,
            fixtures: Vec::new(),
        }
    }

    pub fn positional(mut self, field: FieldSpec) -> Self {
        self.layout = ResponseLayout::Positional;
        self.fields = vec![field];
        self
    }

    pub fn sequential(mut self, fields: Vec<FieldSpec>) -> Self {
        self.layout = ResponseLayout::Sequential;
        self.fields = fields;
        self
    }

    pub fn indexed(mut self, fields: Vec<FieldSpec>) -> Self {
        self.layout = ResponseLayout::Indexed;
        self.fields = fields;
        self
    }

    pub fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn fixture(mut self, raw: &'static [u8]) -> Self {
        self.fixtures.push(raw);
        self
    }

    /// Number of fields that consume a payload token (derived fields
    /// re-derive from the command parameter instead).
    pub fn wire_field_count(&self) -> usize {
        self.fields.iter().filter(|f| !f.is_derived()).count()
    }
}
