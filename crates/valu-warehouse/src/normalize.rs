/// A scraped field, before normalisation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawValue<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(text: &'a str) -> Self {
        RawValue::Text(text)
    }
}

impl From<f64> for RawValue<'_> {
    fn from(number: f64) -> Self {
        RawValue::Number(number)
    }
}

impl<'a> From<Option<&'a str>> for RawValue<'a> {
    fn from(text: Option<&'a str>) -> Self {
        text.map_or(RawValue::Missing, RawValue::Text)
    }
}

/// Transform a scraped field into a number, e.g.,
///             `"12.5%"`       -> `Some(12.5)`
///             `"1,234"`       -> `Some(1234.0)`
///             `"N/A"`         -> `None`
///
/// Anything unparseable (or not finite) is treated as no value at all.
pub fn normalize<'a>(raw: impl Into<RawValue<'a>>) -> Option<f64> {
    let value = match raw.into() {
        RawValue::Text(text) => {
            let cleaned: String = text.chars().filter(|c| !matches!(c, '%' | ',')).collect();
            cleaned.trim().parse::<f64>().ok()?
        }
        RawValue::Number(number) => number,
        RawValue::Missing => return None,
    };
    value.is_finite().then_some(value)
}
