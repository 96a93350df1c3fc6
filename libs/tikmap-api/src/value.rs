/// Conversion between a wire string and a typed entity field.
///
/// Every field bound by `#[derive(Entity)]` must implement this trait.
/// `parse_field` reports malformed input instead of substituting a fallback;
/// the materializer turns the message into `LoadError::InvalidValue`.
pub trait FieldValue: Sized {
    fn parse_field(raw: &str) -> Result<Self, String>;

    fn format_field(&self) -> String;
}

impl FieldValue for String {
    fn parse_field(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn format_field(&self) -> String {
        self.clone()
    }
}

/// Accepts both spellings the device uses: `true`/`false` and `yes`/`no`.
impl FieldValue for bool {
    fn parse_field(raw: &str) -> Result<Self, String> {
        match raw {
            "true" | "yes" => Ok(true),
            "false" | "no" => Ok(false),
            other => Err(format!("expected boolean, got '{other}'")),
        }
    }

    fn format_field(&self) -> String {
        let text = if *self { "true" } else { "false" };
        text.to_string()
    }
}

macro_rules! numeric_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn parse_field(raw: &str) -> Result<Self, String> {
                    raw.parse::<$ty>()
                        .map_err(|e| format!("expected {}, got '{raw}': {e}", stringify!($ty)))
                }

                fn format_field(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

numeric_field_value!(i32, i64, u16, u32, u64, usize, f64);

/// Empty string maps to `None`.
impl<V: FieldValue> FieldValue for Option<V> {
    fn parse_field(raw: &str) -> Result<Self, String> {
        if raw.is_empty() {
            Ok(None)
        } else {
            V::parse_field(raw).map(Some)
        }
    }

    fn format_field(&self) -> String {
        match self {
            Some(v) => v.format_field(),
            None => String::new(),
        }
    }
}
