use crate::errors::PropertyError;

/// A parsed `${key}` or `${key:default}` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyExpr<'a> {
    pub key: &'a str,
    pub default: Option<&'a str>,
}

impl<'a> PropertyExpr<'a> {
    /// `Ok(None)` if `text` is not an expression at all
    ///
    /// The default is everything after the first `:`, so it may itself be an expression:
    /// `${a:${b}}` has the key `a` and the default `${b}`.
    pub fn parse(text: &'a str) -> Result<Option<Self>, PropertyError> {
        let Some(inner) = text
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
        else {
            return Ok(None);
        };

        let (key, default) = match inner.split_once(':') {
            Some((key, default)) => (key, Some(default)),
            None => (inner, None),
        };
        if key.is_empty() {
            return Err(PropertyError::InvalidKey(text.to_string()));
        }
        Ok(Some(PropertyExpr { key, default }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain_key("${app.name}", "app.name", None)]
    #[case::with_default("${app.name:grove}", "app.name", Some("grove"))]
    #[case::empty_default("${app.name:}", "app.name", Some(""))]
    #[case::nested_default("${a:${b}}", "a", Some("${b}"))]
    #[case::colon_in_default("${url:http://localhost}", "url", Some("http://localhost"))]
    fn parses_expressions(
        #[case] text: &str,
        #[case] key: &str,
        #[case] default: Option<&str>,
    ) {
        assert_eq!(
            PropertyExpr::parse(text).unwrap(),
            Some(PropertyExpr { key, default })
        );
    }

    #[rstest]
    #[case("app.name")]
    #[case("${app.name")]
    #[case("$app.name}")]
    #[case("")]
    fn plain_text_is_not_an_expression(#[case] text: &str) {
        assert_eq!(PropertyExpr::parse(text).unwrap(), None);
    }

    #[rstest]
    #[case("${}")]
    #[case("${:fallback}")]
    fn empty_keys_are_rejected(#[case] text: &str) {
        assert_eq!(
            PropertyExpr::parse(text).unwrap_err(),
            PropertyError::InvalidKey(text.to_string())
        );
    }
}
