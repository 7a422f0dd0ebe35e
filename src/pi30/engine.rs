use anyhow::{Context, Result as AnyResult};
use log::debug;
use std::collections::BTreeSet;

use super::command::{CommandDefinition, CommandKind, ResponseLayout};
use super::error::{Error, Result};
use super::field::{FieldFailure, FieldKind, FieldSpec};
use super::frame;
use super::reading::{Reading, ReadingField};
use super::registry::Registry;
use super::{base, max};

/// A device family's protocol handler: its command registry plus the
/// request/response codec. Everything here is a pure function of the
/// inputs and the immutable registry; all blocking I/O happens outside,
/// between `build_request` and `decode_response`.
pub struct Protocol {
    id: &'static str,
    registry: Registry,
}

impl Protocol {
    pub fn new(id: &'static str, registry: Registry) -> Self {
        Self { id, registry }
    }

    /// Generic PI30 family.
    pub fn pi30() -> AnyResult<Self> {
        Ok(Self::new("PI30", base::registry()?))
    }

    /// PI30MAX family (LV6048MAX and similar inverters).
    pub fn pi30max() -> AnyResult<Self> {
        Ok(Self::new("PI30MAX", max::registry()?))
    }

    pub fn for_family(family: &str) -> AnyResult<Self> {
        match family {
            "pi30" => Self::pi30(),
            "pi30max" => Self::pi30max(),
            other => anyhow::bail!("unknown protocol family: {}", other),
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Validate the caller's command string against the registry and
    /// build the outgoing frame. The literal string is the command
    /// bytes; parameters are never synthesized here.
    pub fn build_request(&self, command: &str) -> Result<Vec<u8>> {
        self.registry.resolve(command)?;
        Ok(frame::encode(command.as_bytes()))
    }

    /// Decode one full response frame for the given command into an
    /// ordered Reading. Fail-fast: the first bad field aborts the whole
    /// decode and no partial Reading escapes.
    pub fn decode_response(&self, command: &str, raw: &[u8]) -> Result<Reading> {
        let (definition, param) = self.registry.resolve(command)?;
        let payload = frame::decode_frame(raw)?;
        let payload = String::from_utf8_lossy(payload);
        self.decode_payload(command, definition, &payload, param.as_deref())
    }

    fn decode_payload(
        &self,
        command: &str,
        definition: &CommandDefinition,
        payload: &str,
        param: Option<&str>,
    ) -> Result<Reading> {
        let mut reading = Reading::new(command, definition.description);

        // setter replies are a bare ACK/NAK whatever the layout says
        if definition.kind == CommandKind::Setter {
            let field = &definition.fields[0];
            push_decoded(&mut reading, command, field, payload.trim())?;
            return Ok(reading);
        }

        match definition.layout {
            ResponseLayout::Positional => {
                let field = &definition.fields[0];
                let token = match field.kind {
                    FieldKind::String => payload,
                    _ => payload.trim(),
                };
                push_decoded(&mut reading, command, field, token)?;
            }
            ResponseLayout::Sequential => {
                let tokens: Vec<&str> = payload.split_whitespace().collect();
                let mut next = 0;
                for field in &definition.fields {
                    if field.is_derived() {
                        push_derived(&mut reading, command, field, param)?;
                        continue;
                    }
                    let Some(token) = tokens.get(next) else {
                        return Err(Error::ShortResponse {
                            command: command.to_string(),
                            needed: definition.wire_field_count(),
                            got: tokens.len(),
                        });
                    };
                    next += 1;
                    push_decoded(&mut reading, command, field, token)?;
                }
            }
            ResponseLayout::Indexed => {
                let tokens: Vec<&str> = payload.split_whitespace().collect();
                for field in &definition.fields {
                    if field.is_derived() {
                        push_derived(&mut reading, command, field, param)?;
                        continue;
                    }
                    // registry build guarantees the index is present
                    let index = field.index.unwrap_or_default();
                    let Some(token) = index.checked_sub(1).and_then(|i| tokens.get(i)) else {
                        return Err(Error::ShortResponse {
                            command: command.to_string(),
                            needed: index,
                            got: tokens.len(),
                        });
                    };
                    push_decoded(&mut reading, command, field, token)?;
                }
            }
        }

        Ok(reading)
    }

    /// Decode every fixture payload carried by the registry and check
    /// the resulting field counts. Run by the test suite for each
    /// family so a table edit cannot silently break its own examples.
    pub fn verify_fixtures(&self) -> AnyResult<()> {
        for definition in self.registry.commands() {
            let expected = expected_fixture_fields(definition);

            for (nth, fixture) in definition.fixtures.iter().enumerate() {
                let reading = self
                    .decode_response(definition.name, fixture)
                    .with_context(|| {
                        format!("{}: fixture {} failed to decode", definition.name, nth)
                    })?;

                if reading.len() != expected {
                    anyhow::bail!(
                        "{}: fixture {} decoded {} fields, expected {}",
                        definition.name,
                        nth,
                        reading.len(),
                        expected
                    );
                }
                debug!("{}: fixture {} ok ({} fields)", definition.name, nth, expected);
            }
        }

        Ok(())
    }
}

/// Fixtures carry no caller command string, so derived fields are
/// skipped when decoding them: the expected count covers wire fields
/// only (for INDEXED layouts, the distinct declared indices).
fn expected_fixture_fields(definition: &CommandDefinition) -> usize {
    match definition.layout {
        ResponseLayout::Indexed => definition
            .fields
            .iter()
            .filter_map(|f| f.index)
            .collect::<BTreeSet<_>>()
            .len(),
        _ => definition.wire_field_count(),
    }
}

fn push_decoded(
    reading: &mut Reading,
    command: &str,
    field: &FieldSpec,
    token: &str,
) -> Result<()> {
    let value = field.decode_token(token).map_err(|failure| match failure {
        FieldFailure::Short { needed, got } => Error::ShortResponse {
            command: command.to_string(),
            needed,
            got,
        },
        FieldFailure::Invalid => Error::FieldDecode {
            command: command.to_string(),
            label: field.label,
            token: token.to_string(),
        },
    })?;

    reading.push(ReadingField {
        label: field.label,
        value,
        unit: field.unit,
        icon: field.icon,
    });
    Ok(())
}

fn push_derived(
    reading: &mut Reading,
    command: &str,
    field: &FieldSpec,
    param: Option<&str>,
) -> Result<()> {
    // no captured parameter means nothing to derive from (fixture
    // decodes take this path)
    let Some(param) = param else { return Ok(()) };

    let value = field.derive(param).map_err(|_| Error::FieldDecode {
        command: command.to_string(),
        label: field.label,
        token: param.to_string(),
    })?;

    reading.push(ReadingField {
        label: field.label,
        value,
        unit: field.unit,
        icon: field.icon,
    });
    Ok(())
}
