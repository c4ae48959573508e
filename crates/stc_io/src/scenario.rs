//! Scenario script parser.
//!
//! Grammar, one command per line, `#` starts a comment:
//!
//! ```text
//! variant line|grid
//! switch <num>
//! hold <n>
//! glitch <num> <reads>
//! fault none|stuck|corrupt <n>
//! expect runs <n>
//! ```
//!
//! Numbers are decimal, `0x` hex or `0b` binary.

use anyhow::{Context, Result, bail};
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{digit1, hex_digit1, space1};
use nom::combinator::{all_consuming, map, map_res, value};
use nom::sequence::{pair, preceded, separated_pair, terminated};
use stc_core::sim::Fault;
use std::fs;
use std::path::Path;

/// Which bitstream a scenario targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Line,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Selects the harness configuration. Only valid before the first poll.
    Variant(VariantKind),
    /// Sets the switch word and polls once.
    Switch(u32),
    /// Polls `n` more times with the switches untouched.
    Hold(u32),
    /// Shows `raw` for `reads` switch reads, then polls once.
    Glitch { raw: u32, reads: u32 },
    /// Changes the model's injected fault.
    Fault(Fault),
    /// Asserts the harness run count.
    ExpectRuns(u32),
}

/// A command together with the 1-based line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub command: Command,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    pub lines: Vec<Line>,
}

impl Scenario {
    /// The declared variant, `Line` when the script does not name one.
    pub fn variant(&self) -> VariantKind {
        self.lines
            .iter()
            .find_map(|l| match l.command {
                Command::Variant(v) => Some(v),
                _ => None,
            })
            .unwrap_or(VariantKind::Line)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.lines.iter().map(|l| &l.command)
    }
}

fn hex(i: &str) -> IResult<&str, u32> {
    map_res(
        preceded(alt((tag("0x"), tag("0X"))), hex_digit1),
        |s: &str| u32::from_str_radix(s, 16),
    )(i)
}

fn binary(i: &str) -> IResult<&str, u32> {
    map_res(
        preceded(
            alt((tag("0b"), tag("0B"))),
            take_while1(|c: char| c == '0' || c == '1'),
        ),
        |s: &str| u32::from_str_radix(s, 2),
    )(i)
}

fn decimal(i: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>())(i)
}

pub(crate) fn number(i: &str) -> IResult<&str, u32> {
    alt((hex, binary, decimal))(i)
}

/// Parses one complete number token.
pub fn parse_number(token: &str) -> Result<u32> {
    match all_consuming(number)(token) {
        Ok((_, n)) => Ok(n),
        Err(_) => bail!("invalid number `{}`", token),
    }
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(word), space1)
}

fn variant_kind(i: &str) -> IResult<&str, VariantKind> {
    alt((
        value(VariantKind::Line, tag("line")),
        value(VariantKind::Grid, tag("grid")),
    ))(i)
}

fn fault(i: &str) -> IResult<&str, Fault> {
    alt((
        value(Fault::None, tag("none")),
        value(Fault::Stuck, tag("stuck")),
        map(preceded(keyword("corrupt"), number), |n| Fault::Corrupt {
            every: n as usize,
        }),
    ))(i)
}

fn command(i: &str) -> IResult<&str, Command> {
    alt((
        map(preceded(keyword("variant"), variant_kind), Command::Variant),
        map(preceded(keyword("switch"), number), Command::Switch),
        map(preceded(keyword("hold"), number), Command::Hold),
        map(
            preceded(keyword("glitch"), separated_pair(number, space1, number)),
            |(raw, reads)| Command::Glitch { raw, reads },
        ),
        map(preceded(keyword("fault"), fault), Command::Fault),
        map(
            preceded(pair(keyword("expect"), keyword("runs")), number),
            Command::ExpectRuns,
        ),
    ))(i)
}

/// Parses a scenario from text.
pub fn parse_scenario(text: &str) -> Result<Scenario> {
    let mut scenario = Scenario::default();

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let command = match all_consuming(command)(line) {
            Ok((_, command)) => command,
            Err(_) => bail!("line {}: unrecognised command `{}`", number, line),
        };

        if matches!(command, Command::Variant(_))
            && scenario
                .commands()
                .any(|c| !matches!(c, Command::Variant(_) | Command::Fault(_)))
        {
            bail!("line {}: `variant` must precede switch activity", number);
        }

        scenario.lines.push(Line { number, command });
    }

    Ok(scenario)
}

/// Reads and parses a scenario file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open scenario {}", path.display()))?;
    parse_scenario(&text).with_context(|| format!("Failed to parse scenario {}", path.display()))
}
