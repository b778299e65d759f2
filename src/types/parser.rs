use super::{
    span::{Parse, ParseResult, RawSpan},
    TypeDescriptor,
};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::multispace0,
    combinator::value,
    multi::separated_list1,
    sequence::delimited,
};

#[derive(Debug, PartialEq, Eq)]
pub struct ParsedType(pub TypeDescriptor);

fn separator<'a>(
    sep: &'static str,
) -> impl FnMut(RawSpan<'a>) -> ParseResult<'a, RawSpan<'a>> {
    delimited(multispace0, tag(sep), multispace0)
}

fn parse_primitive(input: RawSpan) -> ParseResult<TypeDescriptor> {
    // NOTE: Longer keywords first, `integer` would otherwise match as `int`
    alt((
        value(TypeDescriptor::Boolean, tag_no_case("boolean")),
        value(TypeDescriptor::TinyInt, tag_no_case("tinyint")),
        value(TypeDescriptor::SmallInt, tag_no_case("smallint")),
        value(TypeDescriptor::BigInt, tag_no_case("bigint")),
        value(TypeDescriptor::Int, tag_no_case("integer")),
        value(TypeDescriptor::Int, tag_no_case("int")),
        value(TypeDescriptor::Float, tag_no_case("float")),
        value(TypeDescriptor::Double, tag_no_case("double")),
        value(TypeDescriptor::String, tag_no_case("string")),
        value(TypeDescriptor::Timestamp, tag_no_case("timestamp")),
    ))(input)
}

fn parse_array(input: RawSpan) -> ParseResult<TypeDescriptor> {
    let (input, _) = tag_no_case("array")(input)?;
    let (input, _) = separator("<")(input)?;
    let (input, ParsedType(inner)) = ParsedType::parse(input)?;
    let (input, _) = separator(">")(input)?;

    Ok((input, TypeDescriptor::Array(Box::new(inner))))
}

fn parse_map(input: RawSpan) -> ParseResult<TypeDescriptor> {
    let (input, _) = tag_no_case("map")(input)?;
    let (input, _) = separator("<")(input)?;
    let (input, ParsedType(key)) = ParsedType::parse(input)?;
    let (input, _) = separator(",")(input)?;
    let (input, ParsedType(value)) = ParsedType::parse(input)?;
    let (input, _) = separator(">")(input)?;

    Ok((input, TypeDescriptor::Map(Box::new(key), Box::new(value))))
}

fn parse_field(input: RawSpan) -> ParseResult<(String, TypeDescriptor)> {
    let (input, name) = take_while1(|x: char| x.is_alphanumeric() || x == '_')(input)?;
    let (input, _) = separator(":")(input)?;
    let (input, ParsedType(ty)) = ParsedType::parse(input)?;

    Ok((input, ((*name.fragment()).to_owned(), ty)))
}

fn parse_struct(input: RawSpan) -> ParseResult<TypeDescriptor> {
    let (input, _) = tag_no_case("struct")(input)?;
    let (input, _) = separator("<")(input)?;
    let (input, fields) = separated_list1(separator(","), parse_field)(input)?;
    let (input, _) = separator(">")(input)?;

    Ok((input, TypeDescriptor::Struct(fields)))
}

impl<'a> Parse<'a> for ParsedType {
    fn parse(input: RawSpan<'a>) -> ParseResult<'a, Self> {
        let (input, ty) = alt((parse_array, parse_map, parse_struct, parse_primitive))(input)?;
        Ok((input, Self(ty)))
    }
}

pub fn parse_type_name(name: &str) -> crate::Result<TypeDescriptor> {
    let invalid = || crate::Error::InvalidTypeName(name.to_owned());

    match ParsedType::parse_from_raw(name.trim()) {
        Ok((rest, ParsedType(ty))) => {
            if rest.fragment().is_empty() {
                Ok(ty)
            } else {
                log::debug!(
                    "unexpected input after type name {name:?} at offset {}",
                    rest.location_offset()
                );
                Err(invalid())
            }
        }
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
            log::debug!(
                "failed to parse type name {name:?} at offset {}",
                e.input.location_offset()
            );
            Err(invalid())
        }
        Err(nom::Err::Incomplete(_)) => Err(invalid()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parse_type_primitive() {
        assert_eq!(TypeDescriptor::Double, parse_type_name("double").unwrap());
        assert_eq!(TypeDescriptor::Float, parse_type_name("float").unwrap());
        assert_eq!(TypeDescriptor::Int, parse_type_name("int").unwrap());
        assert_eq!(TypeDescriptor::Boolean, parse_type_name("boolean").unwrap());
        assert_eq!(TypeDescriptor::String, parse_type_name("string").unwrap());
        assert_eq!(TypeDescriptor::BigInt, parse_type_name("bigint").unwrap());
    }

    #[test]
    fn parse_type_case_and_alias() {
        assert_eq!(TypeDescriptor::Int, parse_type_name("INTEGER").unwrap());
        assert_eq!(TypeDescriptor::Double, parse_type_name("  Double ").unwrap());
    }

    #[test]
    fn parse_type_array() {
        assert_eq!(
            TypeDescriptor::Array(Box::new(TypeDescriptor::Int)),
            parse_type_name("array<int>").unwrap()
        );
        assert_eq!(
            TypeDescriptor::Array(Box::new(TypeDescriptor::Array(Box::new(
                TypeDescriptor::Double
            )))),
            parse_type_name("array< array<double> >").unwrap()
        );
    }

    #[test]
    fn parse_type_map() {
        assert_eq!(
            TypeDescriptor::Map(
                Box::new(TypeDescriptor::String),
                Box::new(TypeDescriptor::Float)
            ),
            parse_type_name("map<string, float>").unwrap()
        );
    }

    #[test]
    fn parse_type_struct() {
        assert_eq!(
            TypeDescriptor::Struct(vec![
                ("a".into(), TypeDescriptor::Int),
                (
                    "b_2".into(),
                    TypeDescriptor::Array(Box::new(TypeDescriptor::Double))
                ),
            ]),
            parse_type_name("struct<a:int, b_2 : array<double>>").unwrap()
        );
    }

    #[test]
    fn parse_type_display_is_parseable() {
        for name in [
            "int",
            "array<float>",
            "map<string,array<int>>",
            "struct<x:double,y:map<int,boolean>>",
        ] {
            assert_eq!(name, parse_type_name(name).unwrap().to_string());
        }
    }

    #[test]
    fn parse_type_invalid() {
        for name in [
            "",
            "decimal",
            "intx",
            "array<int",
            "array<>",
            "map<int>",
            "struct<>",
            "struct<:int>",
            "double double",
        ] {
            assert!(
                matches!(
                    parse_type_name(name),
                    Err(crate::Error::InvalidTypeName(n)) if n == name
                ),
                "{name:?} should not parse"
            );
        }
    }
}
