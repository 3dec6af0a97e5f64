use winnow::{
    ascii::space0,
    combinator::{alt, preceded},
    token::take_while,
    Parser,
};

use super::ResF;

/// Keyword introducing a template tag, following a comment marker
pub const TAG_KEYWORD: &str = "VGEN:";

/// Parse a sentinel line `<comment-marker> VGEN: <TAG NAME>` and return the tag name.
/// Accepted comment markers are `//`, `#` and `--`.
pub fn sentinel(line: &str) -> ResF<&str> {
    preceded(
        (space0, alt(("//", "#", "--")), space0, TAG_KEYWORD, space0),
        take_while(0.., |_c: char| true),
    )
    .map(str::trim_end)
    .parse(line)
}

//------- TEST -------//
