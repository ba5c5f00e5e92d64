use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::json::{self, JsonLoad, JsonStore, Object};
use crate::outcome::{Notes, Outcome};

/// `Last-Modified` layouts accepted by [`DatesInfo::from_http_date`]:
/// RFC 1123 first, then the obsolete RFC 850 form.
const HTTP_DATE_FORMATS: [&str; 2] = ["%a, %d %b %Y %T GMT", "%A, %d-%b-%y %T GMT"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatesInfo {
    pub published: Option<DateTime<Utc>>,
    pub stream: Option<DateTime<Utc>>,
    pub poster: Option<DateTime<Utc>>,
}

impl DatesInfo {
    pub fn is_empty(&self) -> bool {
        self.published.is_none() && self.stream.is_none() && self.poster.is_none()
    }

    pub fn from_http_date(header: &str) -> Option<DateTime<Utc>> {
        HTTP_DATE_FORMATS.iter().find_map(|format| {
            NaiveDateTime::parse_from_str(header.trim(), format)
                .ok()
                .map(|stamp| stamp.and_utc())
        })
    }

    pub fn latest_modification<I>(stamps: I) -> Option<DateTime<Utc>>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        stamps.into_iter().max()
    }
}

/// Unix seconds as stored on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Seconds(Option<DateTime<Utc>>);

impl JsonLoad for Seconds {
    fn load(&mut self, node: &Value, _: &mut Notes) -> Result<Outcome> {
        let stamp = node
            .as_i64()
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
            .ok_or_else(|| ModelError::shape("unix timestamp", node))?;
        self.0 = Some(stamp);
        Ok(Outcome::Unchanged)
    }
}

impl JsonStore for Seconds {
    fn store(&self) -> Value {
        self.0.map_or(Value::Null, |stamp| Value::from(stamp.timestamp()))
    }
}

impl JsonLoad for DatesInfo {
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome> {
        let data = json::as_object(node, "object")?;
        let mut outcome = Outcome::Absent;
        for (key, slot) in [
            ("published", &mut self.published),
            ("stream", &mut self.stream),
            ("poster", &mut self.poster),
        ] {
            let mut stamp = Seconds::default();
            outcome.absorb(json::load_field(data, key, &mut stamp, notes)?);
            *slot = stamp.0;
        }
        Ok(outcome)
    }
}

impl JsonStore for DatesInfo {
    fn store(&self) -> Value {
        let mut data = Object::new();
        json::store_field(&mut data, "published", &Seconds(self.published));
        json::store_field(&mut data, "stream", &Seconds(self.stream));
        json::store_field(&mut data, "poster", &Seconds(self.poster));
        json::object_or_null(data)
    }
}
