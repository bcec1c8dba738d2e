//! Command dictionary model for seqlint.
//!
//! Defines the data structures describing valid command stems, their typed
//! arguments, enumerations and repeat groups, plus the auxiliary parameter and
//! channel dictionaries consumed by argument overrides. Dictionaries are
//! deserialized from JSON and are immutable once loaded; every validation
//! call borrows them.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use thiserror::Error;

/// Errors that can occur when loading or validating a dictionary.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// JSON deserialization failed.
    #[error("invalid dictionary JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A numeric range has `min > max`.
    #[error("{owner}.{arg}: range min ({min}) exceeds max ({max})")]
    InvalidRange {
        /// Stem or parameter owning the argument.
        owner: String,
        /// Argument name.
        arg: String,
        /// Declared minimum.
        min: f64,
        /// Declared maximum.
        max: f64,
    },

    /// A repeat group has `min > max`.
    #[error("{owner}.{arg}: repeat min ({min}) exceeds max ({max})")]
    InvalidRepeat {
        /// Stem or parameter owning the argument.
        owner: String,
        /// Argument name.
        arg: String,
        /// Declared minimum repetitions.
        min: u32,
        /// Declared maximum repetitions.
        max: u32,
    },

    /// Two commands share a stem.
    #[error("duplicate command stem '{0}'")]
    DuplicateStem(String),

    /// Two enums share a name.
    #[error("duplicate enum '{0}'")]
    DuplicateEnum(String),
}

/// Which kind of target a command is sent to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CommandCategory {
    /// Flight software command.
    #[default]
    Flight,
    /// Hardware command, dispatched without flight software involvement.
    Hardware,
}

impl std::fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandCategory::Flight => write!(f, "flight"),
            CommandCategory::Hardware => write!(f, "hardware"),
        }
    }
}

/// Top-level command dictionary.
///
/// Stem and enum lookups are indexed lazily on first use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDictionary {
    /// Mission the dictionary belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_name: Option<String>,
    /// Dictionary version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// All command definitions, in dictionary order.
    pub commands: Vec<CommandDef>,
    /// All enumerations referenced by enum arguments.
    #[serde(default)]
    pub enums: Vec<EnumDef>,

    /// Cached stem → index into `commands`.
    #[serde(skip)]
    stem_map: OnceLock<HashMap<String, usize>>,
    /// Cached enum name → index into `enums`.
    #[serde(skip)]
    enum_map: OnceLock<HashMap<String, usize>>,
}

impl CommandDictionary {
    /// Create a dictionary from command and enum definitions.
    pub fn new(commands: Vec<CommandDef>, enums: Vec<EnumDef>) -> Self {
        Self {
            mission_name: None,
            version: None,
            commands,
            enums,
            stem_map: OnceLock::new(),
            enum_map: OnceLock::new(),
        }
    }

    fn stem_map(&self) -> &HashMap<String, usize> {
        self.stem_map.get_or_init(|| {
            self.commands
                .iter()
                .enumerate()
                .map(|(i, c)| (c.stem.clone(), i))
                .collect()
        })
    }

    fn enum_map(&self) -> &HashMap<String, usize> {
        self.enum_map.get_or_init(|| {
            self.enums
                .iter()
                .enumerate()
                .map(|(i, e)| (e.name.clone(), i))
                .collect()
        })
    }

    /// Look up a command by exact, case-sensitive stem.
    pub fn command(&self, stem: &str) -> Option<&CommandDef> {
        self.stem_map().get(stem).map(|&i| &self.commands[i])
    }

    /// Look up an enumeration by exact name.
    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enum_map().get(name).map(|&i| &self.enums[i])
    }

    /// Ordered symbols of the named enumeration.
    pub fn enum_symbols(&self, name: &str) -> Option<&[EnumSymbol]> {
        self.enum_def(name).map(|e| e.values.as_slice())
    }

    /// All stems in dictionary order.
    pub fn stems(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.stem.as_str())
    }

    /// Check the load-time invariants: unique stems and enum names, ranges
    /// with `min <= max`, repeat groups with `min <= max`.
    pub fn validate(&self) -> Result<(), DictionaryError> {
        let mut stems = HashSet::new();
        for cmd in &self.commands {
            if !stems.insert(cmd.stem.as_str()) {
                return Err(DictionaryError::DuplicateStem(cmd.stem.clone()));
            }
            for arg in &cmd.arguments {
                validate_arg(&cmd.stem, arg)?;
            }
        }
        let mut names = HashSet::new();
        for e in &self.enums {
            if !names.insert(e.name.as_str()) {
                return Err(DictionaryError::DuplicateEnum(e.name.clone()));
            }
        }
        Ok(())
    }
}

fn validate_arg(owner: &str, arg: &ArgDef) -> Result<(), DictionaryError> {
    if let Some(range) = arg.kind.numeric_range()
        && range.min > range.max
    {
        return Err(DictionaryError::InvalidRange {
            owner: owner.to_string(),
            arg: arg.name.clone(),
            min: range.min,
            max: range.max,
        });
    }
    if let ArgKind::Repeat {
        arguments,
        min,
        max,
    } = &arg.kind
    {
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(DictionaryError::InvalidRepeat {
                owner: owner.to_string(),
                arg: arg.name.clone(),
                min: *min,
                max: *max,
            });
        }
        for sub in arguments {
            validate_arg(owner, sub)?;
        }
    }
    Ok(())
}

/// Load and validate a command dictionary from JSON.
pub fn load_dictionary_from_str(json: &str) -> Result<CommandDictionary, DictionaryError> {
    let dictionary: CommandDictionary = serde_json::from_str(json)?;
    dictionary.validate()?;
    Ok(dictionary)
}

/// A single command definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDef {
    /// Command stem (e.g., `"TURN_ON"`).
    pub stem: String,
    /// Flight software or hardware command.
    #[serde(default)]
    pub category: CommandCategory,
    /// Ordered argument definitions.
    #[serde(default)]
    pub arguments: Vec<ArgDef>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A single argument definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArgDef {
    /// Argument name.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value used when a fix action inserts this argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    /// Typed shape of the argument.
    #[serde(flatten)]
    pub kind: ArgKind,
}

impl ArgDef {
    /// Create an argument definition with no description or default.
    pub fn new(name: impl Into<String>, kind: ArgKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            default_value: None,
            kind,
        }
    }
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NumericRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl NumericRange {
    /// Whether `value` lies within the range.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Argument kinds, tagged by `"type"` in JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ArgKind {
    /// Signed integer.
    Integer {
        /// Optional inclusive range.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<NumericRange>,
    },
    /// Unsigned integer.
    Unsigned {
        /// Optional inclusive range.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<NumericRange>,
    },
    /// Floating point number.
    Float {
        /// Optional inclusive range.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<NumericRange>,
    },
    /// Any number, integer or floating point.
    Numeric {
        /// Optional inclusive range.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<NumericRange>,
    },
    /// Boolean flag.
    Boolean,
    /// Symbol from a named enumeration.
    Enum {
        /// Name of the enumeration in the dictionary's enum table.
        enum_name: String,
        /// Inline symbol list used when the enum table has no entry.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Vec<String>>,
    },
    /// Fixed-length string.
    FixedString,
    /// Variable-length string.
    VarString {
        /// Maximum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<u32>,
    },
    /// Variable-length sequence of fixed-size argument tuples.
    Repeat {
        /// Arguments making up one repetition.
        arguments: Vec<ArgDef>,
        /// Minimum repetitions (default 0).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<u32>,
        /// Maximum repetitions (default unbounded).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<u32>,
    },
    /// Time value.
    Time,
}

impl ArgKind {
    /// Lower-case type name as written in the dictionary.
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgKind::Integer { .. } => "integer",
            ArgKind::Unsigned { .. } => "unsigned",
            ArgKind::Float { .. } => "float",
            ArgKind::Numeric { .. } => "numeric",
            ArgKind::Boolean => "boolean",
            ArgKind::Enum { .. } => "enum",
            ArgKind::FixedString => "fixed_string",
            ArgKind::VarString { .. } => "var_string",
            ArgKind::Repeat { .. } => "repeat",
            ArgKind::Time => "time",
        }
    }

    /// Range of a numeric kind, if declared.
    pub fn numeric_range(&self) -> Option<NumericRange> {
        match self {
            ArgKind::Integer { range }
            | ArgKind::Unsigned { range }
            | ArgKind::Float { range }
            | ArgKind::Numeric { range } => *range,
            _ => None,
        }
    }

    /// Whether this is one of the numeric kinds.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ArgKind::Integer { .. }
                | ArgKind::Unsigned { .. }
                | ArgKind::Float { .. }
                | ArgKind::Numeric { .. }
        )
    }

    /// Whether this kind only accepts whole numbers.
    pub fn is_integral(&self) -> bool {
        matches!(self, ArgKind::Integer { .. } | ArgKind::Unsigned { .. })
    }

    /// Whether this kind is written as a string literal.
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            ArgKind::FixedString | ArgKind::VarString { .. } | ArgKind::Time
        )
    }
}

/// A named enumeration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    /// Enumeration name.
    pub name: String,
    /// Ordered symbols.
    pub values: Vec<EnumSymbol>,
}

/// One symbol of an enumeration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnumSymbol {
    /// Symbol text.
    pub symbol: String,
    /// Numeric encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<i64>,
}

// ─── Auxiliary dictionaries ─────────────────────────────────────────────────

/// Flight software parameters, keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterDictionary {
    /// All parameter definitions.
    #[serde(default)]
    pub parameters: Vec<ParameterDef>,

    #[serde(skip)]
    name_map: OnceLock<HashMap<String, usize>>,
}

impl ParameterDictionary {
    /// Create a parameter dictionary from definitions.
    pub fn new(parameters: Vec<ParameterDef>) -> Self {
        Self {
            parameters,
            name_map: OnceLock::new(),
        }
    }

    /// Look up a parameter by exact name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterDef> {
        let map = self.name_map.get_or_init(|| {
            self.parameters
                .iter()
                .enumerate()
                .map(|(i, p)| (p.name.clone(), i))
                .collect()
        });
        map.get(name).map(|&i| &self.parameters[i])
    }
}

/// A single flight software parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDef {
    /// Parameter name.
    pub name: String,
    /// Numeric identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Shape of the parameter's value.
    pub arg: ArgDef,
}

/// Telemetry channels, keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelDictionary {
    /// All channel definitions.
    #[serde(default)]
    pub channels: Vec<ChannelDef>,
}

impl ChannelDictionary {
    /// Create a channel dictionary from definitions.
    pub fn new(channels: Vec<ChannelDef>) -> Self {
        Self { channels }
    }

    /// Whether a channel with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.channels.iter().any(|c| c.name == name)
    }

    /// All channel names in dictionary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }
}

/// A single telemetry channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelDef {
    /// Channel name.
    pub name: String,
    /// Numeric identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

/// Load and validate a parameter dictionary from JSON.
pub fn load_parameter_dictionary_from_str(json: &str) -> Result<ParameterDictionary, DictionaryError> {
    let dictionary: ParameterDictionary = serde_json::from_str(json)?;
    for p in &dictionary.parameters {
        validate_arg(&p.name, &p.arg)?;
    }
    Ok(dictionary)
}

/// Load a channel dictionary from JSON.
pub fn load_channel_dictionary_from_str(json: &str) -> Result<ChannelDictionary, DictionaryError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "missionName": "demo",
        "commands": [
            {
                "stem": "TURN_ON",
                "arguments": [
                    { "name": "level", "type": "integer", "range": { "min": 0, "max": 10 } },
                    { "name": "mode", "type": "enum", "enumName": "MODE" }
                ]
            },
            {
                "stem": "HW_RESET",
                "category": "hardware",
                "arguments": [
                    {
                        "name": "pairs",
                        "type": "repeat",
                        "min": 1,
                        "max": 3,
                        "arguments": [
                            { "name": "a", "type": "unsigned" },
                            { "name": "b", "type": "boolean" }
                        ]
                    }
                ]
            }
        ],
        "enums": [
            { "name": "MODE", "values": [ { "symbol": "ON", "numeric": 1 }, { "symbol": "OFF", "numeric": 0 } ] }
        ]
    }"#;

    #[test]
    fn loads_commands_enums_and_kinds() {
        let dict = load_dictionary_from_str(SAMPLE).expect("valid dictionary");
        assert_eq!(dict.mission_name.as_deref(), Some("demo"));
        let on = dict.command("TURN_ON").expect("TURN_ON present");
        assert_eq!(on.category, CommandCategory::Flight);
        assert_eq!(
            on.arguments[0].kind,
            ArgKind::Integer {
                range: Some(NumericRange { min: 0.0, max: 10.0 })
            }
        );
        assert_eq!(on.arguments[1].kind.type_name(), "enum");
        let hw = dict.command("HW_RESET").expect("HW_RESET present");
        assert_eq!(hw.category, CommandCategory::Hardware);
        match &hw.arguments[0].kind {
            ArgKind::Repeat {
                arguments,
                min,
                max,
            } => {
                assert_eq!(arguments.len(), 2);
                assert_eq!((*min, *max), (Some(1), Some(3)));
                assert_eq!(arguments[1].kind, ArgKind::Boolean);
            }
            other => panic!("expected repeat, got {other:?}"),
        }
        let symbols: Vec<_> = dict
            .enum_symbols("MODE")
            .unwrap()
            .iter()
            .map(|s| s.symbol.as_str())
            .collect();
        assert_eq!(symbols, ["ON", "OFF"]);
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let dict = load_dictionary_from_str(SAMPLE).unwrap();
        assert!(dict.command("turn_on").is_none());
        assert!(dict.enum_symbols("mode").is_none());
        assert_eq!(dict.stems().collect::<Vec<_>>(), ["TURN_ON", "HW_RESET"]);
    }

    #[test]
    fn rejects_inverted_range() {
        let json = r#"{"commands":[{"stem":"X","arguments":[
            {"name":"n","type":"float","range":{"min":5,"max":1}}]}]}"#;
        let err = load_dictionary_from_str(json).unwrap_err();
        assert!(matches!(err, DictionaryError::InvalidRange { .. }), "{err}");
    }

    #[test]
    fn rejects_nested_inverted_repeat() {
        let json = r#"{"commands":[{"stem":"X","arguments":[
            {"name":"r","type":"repeat","arguments":[
                {"name":"inner","type":"repeat","min":4,"max":2,"arguments":[{"name":"v","type":"integer"}]}
            ]}]}]}"#;
        let err = load_dictionary_from_str(json).unwrap_err();
        assert!(matches!(err, DictionaryError::InvalidRepeat { min: 4, max: 2, .. }), "{err}");
    }

    #[test]
    fn rejects_duplicate_stems() {
        let json = r#"{"commands":[{"stem":"X"},{"stem":"X"}]}"#;
        let err = load_dictionary_from_str(json).unwrap_err();
        assert!(matches!(err, DictionaryError::DuplicateStem(ref s) if s == "X"));
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(
            load_dictionary_from_str("{"),
            Err(DictionaryError::InvalidJson(_))
        ));
    }

    #[test]
    fn parameter_and_channel_dictionaries() {
        let params = load_parameter_dictionary_from_str(
            r#"{"parameters":[{"name":"GAIN","id":7,"arg":{"name":"value","type":"float","range":{"min":0,"max":1}}}]}"#,
        )
        .unwrap();
        let gain = params.parameter("GAIN").expect("GAIN present");
        assert_eq!(gain.id, Some(7));
        assert!(gain.arg.kind.is_numeric());
        assert!(params.parameter("gain").is_none());

        let channels =
            load_channel_dictionary_from_str(r#"{"channels":[{"name":"BATT_V"},{"name":"TEMP"}]}"#)
                .unwrap();
        assert!(channels.contains("TEMP"));
        assert_eq!(channels.names().collect::<Vec<_>>(), ["BATT_V", "TEMP"]);
    }
}
