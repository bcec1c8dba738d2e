//! Argument definition overrides.
//!
//! Some commands take arguments whose type depends on an earlier argument,
//! for example a parameter name followed by that parameter's value. An
//! [`ArgumentOverride`] is consulted immediately before each argument is
//! checked and may replace the dictionary's static definition.

use crate::grammar::lexer::unquote;
use seqlint_dictionary::{ArgDef, ArgKind, ChannelDictionary, ParameterDictionary};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// An argument that has already been checked on the current command.
#[derive(Debug, Clone)]
pub struct PrecedingArgument<'a> {
    /// Effective definition the argument was checked against.
    pub definition: Cow<'a, ArgDef>,
    /// Source text of the argument, quotes included.
    pub value: &'a str,
}

/// Everything an override may inspect for one argument.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentContext<'a> {
    /// Command stem.
    pub stem: &'a str,
    /// Zero-based argument index within its container.
    pub index: usize,
    /// Static definition from the command dictionary.
    pub definition: &'a ArgDef,
    /// Arguments before this one, in order.
    pub preceding: &'a [PrecedingArgument<'a>],
    /// Host-supplied parameter dictionaries.
    pub parameter_dictionaries: &'a [ParameterDictionary],
    /// Host-supplied channel dictionary.
    pub channel_dictionary: Option<&'a ChannelDictionary>,
}

/// Hook that may replace an argument's definition.
pub trait ArgumentOverride: Send + Sync {
    /// Return a replacement definition, or `None` to keep the static one.
    fn override_argument(&self, ctx: &ArgumentContext<'_>) -> Option<ArgDef>;
}

/// Resolves parameter-value and channel-name arguments from auxiliary dictionaries.
///
/// For each configured stem, an argument immediately following a string
/// argument that names a known parameter takes that parameter's definition.
/// Arguments whose name is listed in `channel_arguments` become an enum over
/// the channel dictionary's names.
#[derive(Debug, Clone, Default)]
pub struct ParameterValueOverride {
    parameter_stems: HashSet<String>,
    channel_arguments: HashMap<String, HashSet<String>>,
}

impl ParameterValueOverride {
    /// Create an override for the given parameter stems.
    ///
    /// `channel_arguments` pairs a stem with the name of an argument that
    /// holds a channel name.
    pub fn new<S, C>(parameter_stems: S, channel_arguments: C) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        C: IntoIterator<Item = (String, String)>,
    {
        let mut channels: HashMap<String, HashSet<String>> = HashMap::new();
        for (stem, arg) in channel_arguments {
            channels.entry(stem).or_default().insert(arg);
        }
        Self {
            parameter_stems: parameter_stems.into_iter().map(Into::into).collect(),
            channel_arguments: channels,
        }
    }

    fn parameter_definition(&self, ctx: &ArgumentContext<'_>) -> Option<ArgDef> {
        if !self.parameter_stems.contains(ctx.stem) {
            return None;
        }
        let previous = ctx.preceding.last()?;
        let name = unquote(previous.value);
        ctx.parameter_dictionaries
            .iter()
            .find_map(|dict| dict.parameter(name))
            .map(|param| {
                let mut def = param.arg.clone();
                def.name.clone_from(&ctx.definition.name);
                def
            })
    }

    fn channel_definition(&self, ctx: &ArgumentContext<'_>) -> Option<ArgDef> {
        let channels = ctx.channel_dictionary?;
        let names = self.channel_arguments.get(ctx.stem)?;
        if !names.contains(&ctx.definition.name) {
            return None;
        }
        let kind = ArgKind::Enum {
            enum_name: String::new(),
            range: Some(channels.names().map(str::to_string).collect()),
        };
        Some(ArgDef::new(ctx.definition.name.clone(), kind))
    }
}

impl ArgumentOverride for ParameterValueOverride {
    fn override_argument(&self, ctx: &ArgumentContext<'_>) -> Option<ArgDef> {
        self.channel_definition(ctx)
            .or_else(|| self.parameter_definition(ctx))
    }
}
