use std::{
    fs,
    io::{self, Read},
    num::ParseIntError,
    path::Path,
};

use anyhow::{Context, Result};
use miette::{GraphicalReportHandler, GraphicalTheme};
use nom::{
    character::complete::digit1,
    combinator::map_res,
    error::{FromExternalError, ParseError},
    IResult,
};
use nom_locate::LocatedSpan;
use nom_supreme::{
    error::{ErrorTree, GenericErrorTree},
    final_parser::final_parser,
};
use tracing_subscriber::EnvFilter;

// Thanks to FasterThanLime! https://fasterthanli.me/series/advent-of-code-2022/part-11

pub type Span<'a> = LocatedSpan<&'a str>;

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
#[error("bad input")]
pub struct BadInput {
    #[source_code]
    src: String,

    #[label("{kind}")]
    bad_bit: miette::SourceSpan,

    kind: String,
}

impl BadInput {
    /// Byte offset into the line where parsing gave up.
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn render(&self) -> String {
        let mut s = String::new();
        match GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .render_report(&mut s, self)
        {
            Ok(()) => s,
            Err(_) => format!("{self}: {} at offset {}", self.kind, self.offset()),
        }
    }
}

/// A run of decimal digits as an `i64`. Values too large for `i64` fail as an
/// external error rather than wrapping.
pub fn parse_unsigned<'a, E>(i: Span<'a>) -> IResult<Span<'a>, i64, E>
where
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, ParseIntError>,
{
    map_res(digit1, |digits: Span<'a>| digits.fragment().parse::<i64>())(i)
}

fn innermost_failure(tree: ErrorTree<Span<'_>>) -> (usize, String) {
    match tree {
        GenericErrorTree::Base { location, kind } => (location.location_offset(), kind.to_string()),
        GenericErrorTree::Stack { base, .. } => innermost_failure(*base),
        GenericErrorTree::Alt(alternatives) => alternatives
            .into_iter()
            .map(innermost_failure)
            .max_by_key(|(offset, _)| *offset)
            .unwrap_or_else(|| (0, "no alternative matched".to_string())),
    }
}

/// Runs `parse_fun` over the whole of `l`, turning a failure into a
/// diagnostic that points at the offending column.
pub fn parse_nice<'a, T, F>(l: &'a str, parse_fun: F) -> Result<T, BadInput>
where
    F: FnMut(Span<'a>) -> IResult<Span<'a>, T, ErrorTree<Span<'a>>>,
{
    let line_span = Span::new(l);
    final_parser(parse_fun)(line_span).map_err(|e: ErrorTree<Span<'a>>| {
        let (offset, kind) = innermost_failure(e);
        BadInput {
            src: l.to_string(),
            bad_bit: (offset, 0).into(),
            kind,
        }
    })
}

pub fn read_input_as_string() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .lock()
        .read_to_string(&mut input)
        .context("Couldn't read puzzle input from stdin")?;

    Ok(input)
}

pub fn read_input_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("Couldn't read puzzle input {}", path.display()))
}

/// Log to stderr so stdout carries only the answers. Filter with `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .without_time()
        .init();
}
