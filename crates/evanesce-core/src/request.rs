use crate::error::ValidationError;
use crate::paste::NewPaste;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::{NonZeroU32, NonZeroU64};
use typed_builder::TypedBuilder;

/// Largest integer a client can send as a JSON number without losing precision.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

const NOT_POSITIVE: &str = "must be a positive integer";
const ABOVE_U32: &str = "must be at most 4294967295";

/// A request to create a paste, as received from a client.
///
/// Fields are kept as raw JSON values so that wrongly typed input (a number
/// for `content`, `1.5` for `maxViews`) is reported against the offending
/// field by [`validate`](Self::validate) instead of failing to decode.
/// `null` is treated the same as an absent field.
///
/// ```
/// use evanesce_core::CreatePasteRequest;
///
/// let request = CreatePasteRequest::builder()
///     .content("hello")
///     .max_views(3)
///     .build();
/// let paste = request.validate().unwrap();
/// assert_eq!(paste.content(), "hello");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct CreatePasteRequest {
    /// The text to store. Must be a non-empty string.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub content: Option<Value>,
    /// Seconds until the paste expires. Positive integer, optional.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub expires_in: Option<Value>,
    /// Number of reads allowed before the paste is destroyed. Positive integer, optional.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub max_views: Option<Value>,
}

impl CreatePasteRequest {
    /// Checks every field and produces the paste to store.
    ///
    /// Fields are checked in order `content`, `expiresIn`, `maxViews`; the
    /// first invalid one is reported.
    pub fn validate(&self) -> Result<NewPaste, ValidationError> {
        let content = match &self.content {
            Some(Value::String(content)) => content.clone(),
            None | Some(Value::Null) => return Err(ValidationError::Content("is required".into())),
            Some(_) => return Err(ValidationError::Content("must be a string".into())),
        };
        if content.is_empty() {
            return Err(ValidationError::Content("must not be empty".into()));
        }

        let expires_in = match optional(&self.expires_in).map(positive_integer) {
            None => None,
            Some(Some(secs)) => Some(secs),
            Some(None) => return Err(ValidationError::ExpiresIn(NOT_POSITIVE.into())),
        };

        let max_views = match optional(&self.max_views).map(positive_integer) {
            None => None,
            Some(Some(views)) => match u32::try_from(views.get()) {
                Ok(views) => NonZeroU32::new(views),
                Err(_) => return Err(ValidationError::MaxViews(ABOVE_U32.into())),
            },
            Some(None) => return Err(ValidationError::MaxViews(NOT_POSITIVE.into())),
        };

        NewPaste::new(content, expires_in, max_views)
    }
}

fn optional(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

/// Accepts integral JSON numbers greater than zero, including integral
/// floats such as `3.0`.
fn positive_integer(value: &Value) -> Option<NonZeroU64> {
    let Value::Number(number) = value else {
        return None;
    };

    if let Some(n) = number.as_u64() {
        return NonZeroU64::new(n);
    }

    let n = number.as_f64()?;
    if n.fract() == 0.0 && (1.0..=MAX_SAFE_INTEGER).contains(&n) {
        NonZeroU64::new(n as u64)
    } else {
        None
    }
}
