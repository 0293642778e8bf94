use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    fmt::Display,
    str::FromStr,
    sync::Arc,
};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use grove_di::{Injectable, Instance, TypeInfo};

use crate::errors::PropertyError;

type Converter = Arc<dyn Fn(&str) -> Result<Instance, PropertyError> + Send + Sync>;

/// Turns raw property text into typed values, keyed by the target type
#[derive(Clone)]
pub struct Converters {
    converters: HashMap<TypeId, Converter>,
}
impl std::fmt::Debug for Converters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converters")
            .field("len", &self.converters.len())
            .finish()
    }
}

impl Default for Converters {
    /// Strings, booleans, chars, every integer and float, and the chrono date and time types
    fn default() -> Self {
        let mut converters = Converters {
            converters: HashMap::new(),
        };
        converters
            .insert::<String, _>(|value| Ok(value.to_string()))
            .insert::<bool, _>(parse_bool)
            .insert_parsed::<char>()
            .insert_parsed::<i8>()
            .insert_parsed::<i16>()
            .insert_parsed::<i32>()
            .insert_parsed::<i64>()
            .insert_parsed::<i128>()
            .insert_parsed::<isize>()
            .insert_parsed::<u8>()
            .insert_parsed::<u16>()
            .insert_parsed::<u32>()
            .insert_parsed::<u64>()
            .insert_parsed::<u128>()
            .insert_parsed::<usize>()
            .insert_parsed::<f32>()
            .insert_parsed::<f64>()
            .insert_parsed::<NaiveDate>()
            .insert_parsed::<NaiveTime>()
            .insert_parsed::<NaiveDateTime>()
            .insert_parsed::<DateTime<FixedOffset>>();
        converters
    }
}

impl Converters {
    /// Registers or replaces the converter for `T`
    pub fn insert<T, F>(&mut self, convert: F) -> &mut Self
    where
        T: Injectable,
        F: Fn(&str) -> Result<T, PropertyError> + Send + Sync + 'static,
    {
        self.converters.insert(
            TypeId::of::<T>(),
            Arc::new(move |value: &str| convert(value).map(Instance::new)),
        );
        self
    }

    /// Registers `T` using its [FromStr] implementation
    pub fn insert_parsed<T>(&mut self) -> &mut Self
    where
        T: FromStr + Injectable,
        T::Err: Display,
    {
        self.insert::<T, _>(|value| {
            value
                .parse::<T>()
                .map_err(|error| conversion_error::<T>(value, error))
        })
    }

    pub fn supports(&self, ty: TypeInfo) -> bool {
        self.converters.contains_key(&ty.type_id)
    }

    pub fn convert(&self, ty: TypeInfo, value: &str) -> Result<Instance, PropertyError> {
        let convert = self
            .converters
            .get(&ty.type_id)
            .ok_or(PropertyError::Unsupported(ty.type_name))?;
        convert(value)
    }
}

/// `true` and `false` in any case, anything else is an error
fn parse_bool(value: &str) -> Result<bool, PropertyError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(conversion_error::<bool>(value, "expected true or false"))
    }
}

fn conversion_error<T>(value: &str, reason: impl Display) -> PropertyError {
    PropertyError::Conversion {
        value: value.to_string(),
        type_name: type_name::<T>(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn converters() -> Converters {
        Converters::default()
    }

    fn convert<T: Injectable + Clone>(converters: &Converters, value: &str) -> T {
        let instance = converters.convert(TypeInfo::of::<T>(), value).unwrap();
        T::clone(&instance.downcast::<T>().unwrap())
    }

    #[rstest]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("False", false)]
    fn booleans(converters: Converters, #[case] value: &str, #[case] expected: bool) {
        assert_eq!(convert::<bool>(&converters, value), expected);
    }

    #[rstest]
    #[case("0", 0)]
    #[case("8080", 8080)]
    #[case("-17", -17)]
    fn integers(converters: Converters, #[case] value: &str, #[case] expected: i64) {
        assert_eq!(convert::<i64>(&converters, value), expected);
        assert_eq!(convert::<i32>(&converters, value), expected as i32);
    }

    #[rstest]
    fn scalars(converters: Converters) {
        assert_eq!(convert::<u16>(&converters, "65535"), u16::MAX);
        assert_eq!(convert::<f64>(&converters, "2.5"), 2.5);
        assert_eq!(convert::<char>(&converters, "x"), 'x');
        assert_eq!(convert::<String>(&converters, " padded "), " padded ");
    }

    #[rstest]
    fn dates_and_times(converters: Converters) {
        let date = convert::<NaiveDate>(&converters, "2023-07-13");
        assert_eq!((date.year(), date.month(), date.day()), (2023, 7, 13));

        let time = convert::<NaiveTime>(&converters, "10:15:30");
        assert_eq!((time.hour(), time.minute(), time.second()), (10, 15, 30));

        let date_time = convert::<NaiveDateTime>(&converters, "2023-07-13T10:15:30");
        assert_eq!(date_time.date(), date);
        assert_eq!(date_time.time(), time);

        let zoned = convert::<DateTime<FixedOffset>>(&converters, "2023-07-13T10:15:30+02:00");
        assert_eq!(zoned.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(zoned.naive_local(), date_time);
    }

    #[rstest]
    #[case::bool(TypeInfo::of::<bool>(), "yes")]
    #[case::overflow(TypeInfo::of::<u8>(), "256")]
    #[case::not_a_number(TypeInfo::of::<i32>(), "eight")]
    #[case::not_a_date(TypeInfo::of::<NaiveDate>(), "2023-13-45")]
    #[case::two_chars(TypeInfo::of::<char>(), "xy")]
    fn malformed_values_are_conversion_errors(
        converters: Converters,
        #[case] ty: TypeInfo,
        #[case] value: &str,
    ) {
        let error = converters.convert(ty, value).unwrap_err();
        let PropertyError::Conversion {
            value: converted,
            type_name,
            ..
        } = &error
        else {
            panic!("expected a conversion error, got {error:?}");
        };
        assert_eq!(converted, value);
        assert_eq!(*type_name, ty.type_name);
    }

    #[rstest]
    fn unknown_types_are_unsupported(converters: Converters) {
        struct Endpoint;
        let ty = TypeInfo::of::<Endpoint>();
        assert!(!converters.supports(ty));
        assert_eq!(
            converters.convert(ty, "localhost").unwrap_err(),
            PropertyError::Unsupported(ty.type_name)
        );
    }

    #[rstest]
    fn custom_converters_extend_the_defaults(mut converters: Converters) {
        #[derive(Clone, Debug, PartialEq)]
        struct Port(u16);
        converters.insert::<Port, _>(|value| {
            value
                .trim_start_matches(':')
                .parse()
                .map(Port)
                .map_err(|error| conversion_error::<Port>(value, error))
        });
        assert_eq!(convert::<Port>(&converters, ":8080"), Port(8080));
    }
}
