use std::collections::HashSet;

use tracing::{debug, warn};
use winnow::{
    ascii::multispace0,
    combinator::{alt, delimited, opt, separated_pair},
    error::ContextError,
    token::{any, take_till},
    Parser,
};

use crate::descriptor::Direction;

use super::{identifier, val_i64, ws, Res};

/// Signal declaration found in a HDL source
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    pub name: String,
    pub direction: Direction,
    pub nbits: u32,
}

impl Signal {
    pub fn new(name: &str, direction: Direction, nbits: u32) -> Self {
        Signal { name: name.to_owned(), direction, nbits }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExtractMode {
    /// Only module ports (input/output/inout)
    Ports,
    /// Ports and internal `logic`/`wire`/`reg` declarations
    AllSignals,
}

const KEYWORDS: [&str; 18] = [
    "input", "output", "inout", "wire", "logic", "reg", "tri", "var", "signed", "unsigned",
    "module", "endmodule", "assign", "always", "parameter", "localparam", "begin", "end",
];

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn decl_keyword(word: &str, mode: ExtractMode) -> Option<Direction> {
    match word {
        "input" => Some(Direction::Input),
        "output" => Some(Direction::Output),
        "inout" => Some(Direction::Bidir),
        "logic" | "wire" | "reg" if mode == ExtractMode::AllSignals => Some(Direction::Other),
        _ => None,
    }
}

/// Packed range: `Some(width)` when both bounds are literal, `None` when parametrized
fn packed_range<'a>(input: &mut &'a str) -> Res<'a, Option<u32>> {
    alt((
        delimited('[', separated_pair(ws(val_i64), ':', ws(val_i64)), ']')
            .map(|(msb, lsb)| Some(((msb - lsb).unsigned_abs() + 1) as u32)),
        delimited('[', take_till(0.., ']'), ']').value(None),
    ))
    .parse_next(input)
}

fn net_type<'a>(input: &mut &'a str) -> Res<'a, &'a str> {
    identifier
        .verify(|w: &str| matches!(w, "wire" | "logic" | "reg" | "tri" | "var"))
        .parse_next(input)
}

fn signedness<'a>(input: &mut &'a str) -> Res<'a, &'a str> {
    identifier
        .verify(|w: &str| matches!(w, "signed" | "unsigned"))
        .parse_next(input)
}

/// Body of a declaration following its direction keyword:
/// optional net type, signedness, packed range then a comma separated list of names
fn decl_body<'a>(input: &mut &'a str) -> Res<'a, (Option<u32>, Vec<&'a str>)> {
    let _ = opt(ws(net_type)).parse_next(input)?;
    let _ = opt(ws(signedness)).parse_next(input)?;
    let width = opt(ws(packed_range)).parse_next(input)?.unwrap_or(Some(1));
    let mut name = ws(identifier).verify(|w: &str| !is_keyword(w)).parse_next(input)?;
    // User defined type: the real name follows the type name
    let checkpoint = *input;
    match ws(identifier).parse_next(input) {
        Ok(id) if !is_keyword(id) => name = id,
        _ => *input = checkpoint,
    }
    let mut names = vec![name];
    loop {
        let _ = opt(ws(packed_range)).parse_next(input)?;
        let checkpoint = *input;
        let next = (ws(','), ws(identifier)).parse_next(input);
        match next {
            Ok((_, id)) if !is_keyword(id) => names.push(id),
            _ => {
                *input = checkpoint;
                break;
            }
        }
    }
    Ok((width, names))
}

/// Replace comments by spaces, keeping line breaks
pub fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Extract all signal declarations from a HDL source text.
/// When `name_filter` is set only signals starting with it are kept.
/// Each name is reported once, first declaration wins.
pub fn extract_signals(src: &str, mode: ExtractMode, name_filter: Option<&str>) -> Vec<Signal> {
    let text = strip_comments(src);
    let mut input = text.as_str();
    let mut signals = Vec::new();
    let mut seen = HashSet::new();
    while !input.is_empty() {
        let _ = multispace0::<_, ContextError>.parse_next(&mut input);
        if input.is_empty() {
            break;
        }
        let Ok(word) = identifier.parse_next(&mut input) else {
            let _ = any::<_, ContextError>.parse_next(&mut input);
            continue;
        };
        let Some(direction) = decl_keyword(word, mode) else {
            continue;
        };
        let checkpoint = input;
        match decl_body.parse_next(&mut input) {
            Ok((width, names)) => {
                let nbits = width.unwrap_or_else(|| {
                    warn!("Unable to resolve width of {names:?}, assuming single bit");
                    1
                });
                for name in names {
                    if name_filter.is_some_and(|p| !name.starts_with(p)) {
                        continue;
                    }
                    if seen.insert(name.to_owned()) {
                        signals.push(Signal::new(name, direction, nbits));
                    }
                }
            }
            Err(_) => input = checkpoint,
        }
    }
    debug!("Extracted {} signals", signals.len());
    signals
}

//------- TEST -------//

#[cfg(test)]
mod tests_parsing {
    use super::*;

    const TOP_SV: &str = r#"
module TOP (
    input  wire        SC_PAD_ST,   // control
    input  logic [3:0] SC_PAD_DS,
    input  logic       CLK,
    output logic       UART_TX,
    input  wire        GPIO0_PORTEN, GPIO0_PORTIN,
    output wire        GPIO0_PORTOUT,
    /* input logic COMMENTED, */
    inout  tri         SDA
);
  logic [7:0] r_count;
endmodule
"#;

    #[test]
    fn test_ports() {
        let signals = extract_signals(TOP_SV, ExtractMode::Ports, None);
        assert_eq!(
            signals,
            vec![
                Signal::new("SC_PAD_ST", Direction::Input, 1),
                Signal::new("SC_PAD_DS", Direction::Input, 4),
                Signal::new("CLK", Direction::Input, 1),
                Signal::new("UART_TX", Direction::Output, 1),
                Signal::new("GPIO0_PORTEN", Direction::Input, 1),
                Signal::new("GPIO0_PORTIN", Direction::Input, 1),
                Signal::new("GPIO0_PORTOUT", Direction::Output, 1),
                Signal::new("SDA", Direction::Bidir, 1),
            ]
        );
    }

    #[test]
    fn test_all_signals_with_filter() {
        let src = "
module csr_user;
  logic [15:0] csr_ctrl, csr_mode;
  wire csr_status;
  output reg [0:2] csr_flags;
  logic other_sig;
  regbus_t csr_bus;
endmodule";
        let signals = extract_signals(src, ExtractMode::AllSignals, Some("csr_"));
        assert_eq!(
            signals,
            vec![
                Signal::new("csr_ctrl", Direction::Other, 16),
                Signal::new("csr_mode", Direction::Other, 16),
                Signal::new("csr_status", Direction::Other, 1),
                Signal::new("csr_flags", Direction::Output, 3),
            ]
        );
    }

    #[test]
    fn test_non_ansi_and_param_width() {
        let src = "module m(a, b, c);\n input a, b;\n output [W-1:0] c;\n output c;\nendmodule";
        let signals = extract_signals(src, ExtractMode::Ports, None);
        assert_eq!(
            signals,
            vec![
                Signal::new("a", Direction::Input, 1),
                Signal::new("b", Direction::Input, 1),
                Signal::new("c", Direction::Output, 1),
            ]
        );
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("a // b\nc /* d\ne */ f"), "a \nc \n  f");
    }
}
