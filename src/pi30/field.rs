use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// One decoded value. Flag-family fields decode to a single structured
/// flag-set so a FieldSpec always contributes exactly one reading entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Flags(Vec<Flag>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flag {
    pub name: &'static str,
    pub active: bool,
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Flags(flags) => {
                let mut map = serializer.serialize_map(Some(flags.len()))?;
                for flag in flags {
                    map.serialize_entry(flag.name, &flag.active)?;
                }
                map.end()
            }
        }
    }
}

/// Values re-derived from the caller's captured command parameter (never
/// from payload tokens). A closed set selected by tag; no expression
/// evaluation happens at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// first four digits of the parameter
    YearFromPrefix,
    /// month name from digits five and six of the parameter
    MonthNameFromDigits,
    /// everything after digit six of the parameter
    DayFromSuffix,
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// How one raw token (or the whole payload) is turned into a Value.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// token text verbatim; under a POSITIONAL layout this receives the
    /// full undivided payload
    String,
    Int,
    Float,
    /// token is a zero-based index into the label list
    Option { labels: &'static [&'static str] },
    /// exact-match code lookup
    Keyed {
        map: &'static [(&'static str, &'static str)],
    },
    StrKeyed {
        map: &'static [(&'static str, &'static str)],
    },
    /// (code char, display name, enabled-by-default); a code present in
    /// the token flips that flag away from its default, unknown token
    /// characters are ignored
    EnFlags {
        flags: &'static [(char, &'static str, bool)],
    },
    /// fixed-width bit string, one named position per bit; empty names
    /// are reserved positions, computed but not emitted
    Flags { names: &'static [&'static str] },
    StatFlags { names: &'static [&'static str] },
    /// exact-match setter acknowledgement
    Ack {
        map: &'static [(&'static str, &'static str)],
    },
    Derived(Derivation),
}

/// Why a single field failed to decode. The engine wraps this with the
/// command/label context the caller needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFailure {
    Invalid,
    Short { needed: usize, got: usize },
}

/// Schema for one decoded value within a command's response.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub label: &'static str,
    pub unit: &'static str,
    pub kind: FieldKind,
    /// 1-based token index, for INDEXED layouts
    pub index: Option<usize>,
    /// opaque display hint, carried through unexamined
    pub icon: Option<&'static str>,
}

impl FieldSpec {
    fn new(label: &'static str, unit: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            unit,
            kind,
            index: None,
            icon: None,
        }
    }

    pub fn string(label: &'static str, unit: &'static str) -> Self {
        Self::new(label, unit, FieldKind::String)
    }

    pub fn int(label: &'static str, unit: &'static str) -> Self {
        Self::new(label, unit, FieldKind::Int)
    }

    pub fn float(label: &'static str, unit: &'static str) -> Self {
        Self::new(label, unit, FieldKind::Float)
    }

    pub fn option(label: &'static str, labels: &'static [&'static str]) -> Self {
        Self::new(label, "", FieldKind::Option { labels })
    }

    pub fn keyed(label: &'static str, map: &'static [(&'static str, &'static str)]) -> Self {
        Self::new(label, "", FieldKind::Keyed { map })
    }

    pub fn str_keyed(label: &'static str, map: &'static [(&'static str, &'static str)]) -> Self {
        Self::new(label, "", FieldKind::StrKeyed { map })
    }

    pub fn enflags(label: &'static str, flags: &'static [(char, &'static str, bool)]) -> Self {
        Self::new(label, "", FieldKind::EnFlags { flags })
    }

    pub fn flags(label: &'static str, names: &'static [&'static str]) -> Self {
        Self::new(label, "", FieldKind::Flags { names })
    }

    pub fn stat_flags(label: &'static str, names: &'static [&'static str]) -> Self {
        Self::new(label, "", FieldKind::StatFlags { names })
    }

    pub fn ack(label: &'static str, map: &'static [(&'static str, &'static str)]) -> Self {
        Self::new(label, "", FieldKind::Ack { map })
    }

    pub fn derived(label: &'static str, derivation: Derivation) -> Self {
        Self::new(label, "", FieldKind::Derived(derivation))
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.kind, FieldKind::Derived(_))
    }

    /// Decode one raw token against this field's tag.
    pub fn decode_token(&self, token: &str) -> Result<Value, FieldFailure> {
        match &self.kind {
            FieldKind::String => Ok(Value::String(token.to_string())),
            FieldKind::Int => token
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| FieldFailure::Invalid),
            FieldKind::Float => token
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| FieldFailure::Invalid),
            FieldKind::Option { labels } => {
                let index: usize = token.parse().map_err(|_| FieldFailure::Invalid)?;
                labels
                    .get(index)
                    .map(|label| Value::String(label.to_string()))
                    .ok_or(FieldFailure::Invalid)
            }
            FieldKind::Keyed { map } | FieldKind::StrKeyed { map } | FieldKind::Ack { map } => map
                .iter()
                .find(|(code, _)| *code == token)
                .map(|(_, label)| Value::String(label.to_string()))
                .ok_or(FieldFailure::Invalid),
            FieldKind::EnFlags { flags } => Ok(Value::Flags(
                flags
                    .iter()
                    .map(|&(code, name, default)| Flag {
                        name,
                        active: default != token.contains(code),
                    })
                    .collect(),
            )),
            FieldKind::Flags { names } | FieldKind::StatFlags { names } => {
                decode_bit_string(token, names)
            }
            FieldKind::Derived(_) => Err(FieldFailure::Invalid),
        }
    }

    /// Evaluate a derived field against the captured command parameter.
    pub fn derive(&self, param: &str) -> Result<Value, FieldFailure> {
        let FieldKind::Derived(derivation) = self.kind else {
            return Err(FieldFailure::Invalid);
        };

        match derivation {
            Derivation::YearFromPrefix => param
                .get(..4)
                .map(|year| Value::String(year.to_string()))
                .ok_or(FieldFailure::Invalid),
            Derivation::MonthNameFromDigits => {
                let digits = param.get(4..6).ok_or(FieldFailure::Invalid)?;
                let month: usize = digits.parse().map_err(|_| FieldFailure::Invalid)?;
                MONTH_NAMES
                    .get(month.wrapping_sub(1))
                    .map(|name| Value::String(name.to_string()))
                    .ok_or(FieldFailure::Invalid)
            }
            Derivation::DayFromSuffix => param
                .get(6..)
                .filter(|day| !day.is_empty())
                .map(|day| Value::String(day.to_string()))
                .ok_or(FieldFailure::Invalid),
        }
    }
}

fn decode_bit_string(
    token: &str,
    names: &'static [&'static str],
) -> Result<Value, FieldFailure> {
    if token.len() < names.len() {
        return Err(FieldFailure::Short {
            needed: names.len(),
            got: token.len(),
        });
    }

    let mut flags = Vec::with_capacity(names.len());
    for (name, bit) in names.iter().copied().zip(token.chars()) {
        let active = match bit {
            '1' => true,
            '0' => false,
            _ => return Err(FieldFailure::Invalid),
        };
        if !name.is_empty() {
            flags.push(Flag { name, active });
        }
    }

    Ok(Value::Flags(flags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_string_sets_named_positions() {
        let names: &[&str] = &["a", "b", "c", "d", "e", "f", "g", "h"];
        let spec = FieldSpec::flags("Device Status", names);
        let Value::Flags(flags) = spec.decode_token("00010110").unwrap() else {
            panic!("expected flags");
        };
        let active: Vec<&str> = flags.iter().filter(|f| f.active).map(|f| f.name).collect();
        assert_eq!(active, vec!["d", "f", "g"]);
    }

    #[test]
    fn bit_string_skips_reserved_names() {
        let names: &[&str] = &["a", "", "c"];
        let spec = FieldSpec::stat_flags("Warning", names);
        let Value::Flags(flags) = spec.decode_token("101").unwrap() else {
            panic!("expected flags");
        };
        assert_eq!(flags.len(), 2);
    }

    #[test]
    fn short_bit_string_reports_lengths() {
        let names: &[&str] = &["a", "b", "c", "d"];
        let spec = FieldSpec::flags("Device Status", names);
        assert_eq!(
            spec.decode_token("01"),
            Err(FieldFailure::Short { needed: 4, got: 2 })
        );
    }

    #[test]
    fn enflags_flips_present_codes_only() {
        let flags: &[(char, &str, bool)] =
            &[('a', "Buzzer", false), ('b', "Overload Bypass", false)];
        let spec = FieldSpec::enflags("Device Status", flags);
        let Value::Flags(decoded) = spec.decode_token("Eb").unwrap() else {
            panic!("expected flags");
        };
        // unknown 'E' ignored, 'b' flipped from its default
        assert_eq!(
            decoded,
            vec![
                Flag { name: "Buzzer", active: false },
                Flag { name: "Overload Bypass", active: true },
            ]
        );
    }

    #[test]
    fn keyed_decode_is_exact_match_only() {
        let map: &[(&str, &str)] =
            &[("00", "India"), ("01", "Germany"), ("02", "South America")];
        let spec = FieldSpec::keyed("Country", map);
        assert_eq!(
            spec.decode_token("01"),
            Ok(Value::String("Germany".to_string()))
        );
        assert_eq!(spec.decode_token("99"), Err(FieldFailure::Invalid));
        assert_eq!(spec.decode_token("0"), Err(FieldFailure::Invalid));
    }

    #[test]
    fn month_derivation_uses_fixed_table() {
        let spec = FieldSpec::derived("Month", Derivation::MonthNameFromDigits);
        assert_eq!(
            spec.derive("20210907"),
            Ok(Value::String("September".to_string()))
        );
        assert_eq!(spec.derive("20211307"), Err(FieldFailure::Invalid));
    }
}
