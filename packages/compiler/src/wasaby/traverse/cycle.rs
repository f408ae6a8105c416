//! Cycle Parameters
//!
//! Parses the `data` of `ws:for` (or the legacy `for` attribute) into either the
//! `init; test; update` form or the `[index,] iterator in collection` form.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CompilerError, Result};
use crate::expression_parser::{Expression, Parser, ProgramNode};

static ALIAS_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\S+)\s+as\s+(\S+)\s*$").unwrap());

const FOREACH_SEPARATOR: &str = " in ";

#[derive(Debug, Clone, PartialEq)]
pub enum CycleParameters {
    For {
        init: Option<ProgramNode>,
        test: ProgramNode,
        update: Option<ProgramNode>,
    },
    Foreach {
        index: Option<ProgramNode>,
        iterator: ProgramNode,
        collection: ProgramNode,
    },
}

pub fn parse_cycle(parser: &Parser, data: &str) -> Result<CycleParameters> {
    let data = strip_mustache(data.trim());
    if data.contains(';') {
        parse_for(parser, data)
    } else {
        parse_foreach(parser, data)
    }
}

fn strip_mustache(data: &str) -> &str {
    data.strip_prefix("{{")
        .and_then(|inner| inner.strip_suffix("}}"))
        .map_or(data, str::trim)
}

fn parse_for(parser: &Parser, data: &str) -> Result<CycleParameters> {
    let parts: Vec<&str> = data.split(';').map(str::trim).collect();
    let valid_shape = parts.len() == 3 || (parts.len() == 4 && parts[3].is_empty());
    if !valid_shape {
        return Err(CompilerError::parse(format!(
            "Wrong number of for-cycle parameters in \"{}\": expected \"init; test; update\"",
            data
        )));
    }
    let init = parse_optional(parser, parts[0], "init")?;
    if parts[1].is_empty() {
        return Err(CompilerError::parse(format!(
            "For-cycle test is required in \"{}\"",
            data
        )));
    }
    let test = parse_part(parser, parts[1], "test")?;
    let update = parse_optional(parser, parts[2], "update")?;
    Ok(CycleParameters::For { init, test, update })
}

fn parse_foreach(parser: &Parser, data: &str) -> Result<CycleParameters> {
    let parts: Vec<&str> = data.split(FOREACH_SEPARATOR).collect();
    if parts.len() != 2 || parts[1].trim().is_empty() {
        return Err(CompilerError::parse(format!(
            "Wrong foreach-cycle parameters in \"{}\": expected \"[index,] iterator in collection\"",
            data
        )));
    }
    let variables = ALIAS_REGEXP.replace(parts[0], "$1, $2");
    let identifiers: Vec<&str> = variables.split(',').map(str::trim).collect();
    let (index, iterator) = match identifiers.as_slice() {
        [iterator] => (None, parse_identifier(parser, iterator, "iterator")?),
        [index, iterator] => (
            Some(parse_identifier(parser, index, "index")?),
            parse_identifier(parser, iterator, "iterator")?,
        ),
        _ => {
            return Err(CompilerError::parse(format!(
                "Wrong foreach-cycle variables \"{}\": expected one or two identifiers",
                parts[0].trim()
            )))
        }
    };
    let collection = parse_part(parser, parts[1].trim(), "collection")?;
    Ok(CycleParameters::Foreach {
        index,
        iterator,
        collection,
    })
}

fn parse_part(parser: &Parser, source: &str, part: &str) -> Result<ProgramNode> {
    parser.parse(source).map_err(|err| {
        CompilerError::parse(format!("Error in cycle {} \"{}\": {}", part, source, err))
    })
}

fn parse_optional(parser: &Parser, source: &str, part: &str) -> Result<Option<ProgramNode>> {
    if source.is_empty() {
        return Ok(None);
    }
    parse_part(parser, source, part).map(Some)
}

fn parse_identifier(parser: &Parser, source: &str, part: &str) -> Result<ProgramNode> {
    let program = parse_part(parser, source, part)?;
    match program.single() {
        Some(Expression::Identifier(_)) => Ok(program),
        _ => Err(CompilerError::parse(format!(
            "Cycle {} \"{}\" must be an identifier",
            part, source
        ))),
    }
}
