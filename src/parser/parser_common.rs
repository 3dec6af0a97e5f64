use winnow::{
    ascii::{digit1, hex_digit1, multispace0, space0, Caseless},
    combinator::{alt, delimited, eof, preceded, repeat},
    error::{self, ContextError, ParseError},
    stream::{AsChar, Stream, StreamIsPartial},
    token::{one_of, take_while},
    PResult, Parser,
};

//--------------------------------
// General parsing rules
pub type Res<'a, T> = PResult<T>;
pub type ResF<'a, T> = Result<T, ParseError<&'a str, ContextError>>;

pub fn ws<I, O, E: error::ParserError<I>, F>(inner: F) -> impl Parser<I, O, E>
where
    I: StreamIsPartial + Stream,
    <I as Stream>::Token: AsChar + Copy,
    F: Parser<I, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

/// Verilog-style identifier: letter or underscore followed by word characters or `$`
pub fn identifier<'a>(input: &mut &'a str) -> Res<'a, &'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
    )
        .recognize()
        .parse_next(input)
}

pub fn identifier_last(input: &str) -> ResF<&str> {
    ws(identifier).parse(input)
}

pub fn parse_bool<'a>(input: &mut &'a str) -> Res<'a, bool> {
    alt((
        ws(Caseless("true")).value(true),
        ws(Caseless("false")).value(false),
        ws(Caseless("yes")).value(true),
        ws(Caseless("no")).value(false),
        ws("1").value(true),
        ws("0").value(false),
    ))
    .parse_next(input)
}

/// Boolean cell: blank is interpreted as the default value
pub fn bool_or_default(input: &str, def: bool) -> ResF<bool> {
    alt((
        parse_bool,
        (space0, eof).value(def),
    )).parse(input)
}

pub fn val_u32<'a>(input: &mut &'a str) -> Res<'a, u32> {
    digit1.try_map(|v: &str| v.parse::<u32>()).parse_next(input)
}

pub fn val_i64<'a>(input: &mut &'a str) -> Res<'a, i64> {
    digit1.try_map(|v: &str| v.parse::<i64>()).parse_next(input)
}

/// Hexadecimal value with mandatory `0x` prefix, underscores allowed as separator
pub fn val_hex<'a>(input: &mut &'a str) -> Res<'a, u64> {
    preceded(
        alt(("0x", "0X")),
        repeat(1.., alt((hex_digit1, "_"))).map(|v: Vec<&str>| v.concat()),
    )
    .try_map(|v: String| u64::from_str_radix(&v.replace('_', ""), 16))
    .parse_next(input)
}

pub fn u32_last(input: &str) -> ResF<u32> {
    ws(val_u32).parse(input)
}

pub fn hex_last(input: &str) -> ResF<u64> {
    ws(val_hex).parse(input)
}

//------- TEST -------//
