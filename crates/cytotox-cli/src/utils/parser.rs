use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid dilution format for '{0}'. Expected 'NAME=START:FACTOR' (e.g., 'MS309=100:3').")]
    InvalidDrugFormat(String),

    #[error("Invalid control format for '{0}'. Expected 'DRUG=CONTROL' (e.g., 'MS309=DMSO').")]
    InvalidControlFormat(String),

    #[error("Invalid number '{value}' for the {component} of '{name}'.")]
    InvalidNumber {
        component: &'static str,
        name: String,
        value: String,
    },

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },
}

/// A `--drug NAME=START:FACTOR` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugSpec {
    pub name: String,
    pub start: f64,
    pub factor: f64,
}

fn split_pair<'a>(input: &'a str, separator: char) -> Option<(&'a str, &'a str)> {
    input
        .split_once(separator)
        .map(|(left, right)| (left.trim(), right.trim()))
}

fn non_empty<'a>(value: &'a str, component: &'static str, input: &str) -> Result<&'a str, ParseError> {
    if value.is_empty() {
        Err(ParseError::EmptyComponent {
            component,
            input: input.to_string(),
        })
    } else {
        Ok(value)
    }
}

/// Parses a number, accepting a decimal comma.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub fn parse_drug(input: &str) -> Result<DrugSpec, ParseError> {
    let (name, series) =
        split_pair(input, '=').ok_or_else(|| ParseError::InvalidDrugFormat(input.to_string()))?;
    let (start, factor) =
        split_pair(series, ':').ok_or_else(|| ParseError::InvalidDrugFormat(input.to_string()))?;

    let name = non_empty(name, "name", input)?;
    let number = |component: &'static str, value: &str| -> Result<f64, ParseError> {
        non_empty(value, component, input)?;
        parse_number(value).ok_or_else(|| ParseError::InvalidNumber {
            component,
            name: name.to_string(),
            value: value.to_string(),
        })
    };

    Ok(DrugSpec {
        name: name.to_string(),
        start: number("start", start)?,
        factor: number("factor", factor)?,
    })
}

pub fn parse_control(input: &str) -> Result<(String, String), ParseError> {
    let (drug, control) =
        split_pair(input, '=').ok_or_else(|| ParseError::InvalidControlFormat(input.to_string()))?;
    let drug = non_empty(drug, "drug", input)?;
    let control = non_empty(control, "control", input)?;
    Ok((drug.to_string(), control.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_drug_with_decimal_comma() {
        let spec = parse_drug("MMAE=0,5:10").unwrap();
        assert_eq!(
            spec,
            DrugSpec {
                name: "MMAE".to_string(),
                start: 0.5,
                factor: 10.0,
            }
        );
    }

    #[test]
    fn drug_without_separator_is_rejected() {
        assert_eq!(
            parse_drug("MS309:100:3"),
            Err(ParseError::InvalidDrugFormat("MS309:100:3".to_string()))
        );
        assert_eq!(
            parse_drug("MS309=100"),
            Err(ParseError::InvalidDrugFormat("MS309=100".to_string()))
        );
    }

    #[test]
    fn drug_with_non_numeric_factor_is_rejected() {
        assert_eq!(
            parse_drug("MS309=100:x"),
            Err(ParseError::InvalidNumber {
                component: "factor",
                name: "MS309".to_string(),
                value: "x".to_string(),
            })
        );
    }

    #[test]
    fn empty_components_are_reported() {
        assert!(matches!(
            parse_drug("=1:2"),
            Err(ParseError::EmptyComponent { component: "name", .. })
        ));
        assert!(matches!(
            parse_control("MS309="),
            Err(ParseError::EmptyComponent { component: "control", .. })
        ));
    }

    #[test]
    fn parses_control_pair() {
        assert_eq!(
            parse_control("MS309 = DMSO").unwrap(),
            ("MS309".to_string(), "DMSO".to_string())
        );
        assert!(matches!(
            parse_control("MS309"),
            Err(ParseError::InvalidControlFormat(_))
        ));
    }
}
