use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::opt,
    multi::separated_list1,
    sequence::{delimited, tuple},
    IResult,
};

use crate::error::EngineError;

/// A parsed sum-of-products aggregate query:
/// `SELECT SUM(a*b), ... FROM R NATURAL JOIN S;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateQuery {
    pub sums: Vec<(String, String)>,
    pub relations: Vec<String>,
}

// Helper function to recognize identifiers
pub fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

// Parser for a single SUM(a*b) term
pub fn sum_term(input: &str) -> IResult<&str, (String, String)> {
    let (input, _) = tag("SUM")(input)?;
    let (input, _) = char('(')(input)?;
    let (input, first) = identifier(input)?;
    let (input, _) = char('*')(input)?;
    let (input, second) = identifier(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, (first.to_string(), second.to_string())))
}

// Parser for the comma-separated SELECT list
fn select_list(input: &str) -> IResult<&str, Vec<(String, String)>> {
    separated_list1(tuple((multispace0, char(','), multispace0)), sum_term)(input)
}

// Parser for the NATURAL JOIN chain in the FROM clause
fn relation_list(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(
        delimited(multispace1, tag("NATURAL JOIN"), multispace1),
        identifier,
    )(input)
}

fn aggregate_query(input: &str) -> IResult<&str, AggregateQuery> {
    let (input, _) = multispace0(input)?;
    let (input, _) = tag("SELECT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, sums) = select_list(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag("FROM")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, relations) = relation_list(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(char(';'))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((
        input,
        AggregateQuery {
            sums,
            relations: relations.into_iter().map(|s| s.to_string()).collect(),
        },
    ))
}

/// Parse an aggregate query, requiring the whole input to be consumed.
pub fn parse_aggregate_query(input: &str) -> Result<AggregateQuery, EngineError> {
    match aggregate_query(input) {
        Ok(("", query)) => Ok(query),
        Ok((rest, _)) => Err(EngineError::Query(format!(
            "unexpected trailing input: '{}'",
            rest.trim()
        ))),
        Err(err) => Err(EngineError::Query(format!("syntax error: {err}"))),
    }
}
