use winnow::{
    ascii::space0,
    combinator::{alt, delimited, repeat, separated},
    token::take_till,
    Parser,
};

use super::{Res, ResF};

/// Double-quoted cell, `""` stands for a literal quote
fn quoted_cell<'a>(input: &mut &'a str) -> Res<'a, String> {
    delimited(
        (space0, '"'),
        repeat(0.., alt((take_till(1.., '"'), "\"\"".value("\"")))).map(|v: Vec<&str>| v.concat()),
        ('"', space0),
    )
    .parse_next(input)
}

fn bare_cell<'a>(input: &mut &'a str) -> Res<'a, String> {
    take_till(0.., ',')
        .map(|s: &str| s.trim().to_owned())
        .parse_next(input)
}

pub fn csv_cell<'a>(input: &mut &'a str) -> Res<'a, String> {
    alt((quoted_cell, bare_cell)).parse_next(input)
}

/// Parse one CSV line into its cells (line terminator already removed)
pub fn csv_row(input: &str) -> ResF<Vec<String>> {
    separated(1.., csv_cell, ',').parse(input)
}

/// Quote a cell only when needed to round-trip through `csv_row`
pub fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"']) || cell.starts_with(' ') || cell.ends_with(' ') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_owned()
    }
}

//------- TEST -------//
