// JSON codec for option models
//
// Document shape: `{ "<Category>": { "<Cell>": <value>, ... }, ... }`.
// Unset cells are omitted and categories without a set cell are dropped.
// Decoding dispatches on each cell's declared type, never on the JSON shape.

use serde_json::{Map, Number, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::trace;

use super::cell::{CellDescriptor, ConfigModel, OptionType, OptionValue};
use super::rate::Rate;
use crate::downloader::errors::CodecError;

/// Encode every present cell of `model`, categories in definition order.
pub fn serialize<M: ConfigModel>(model: &M) -> Result<Value, CodecError> {
    let mut doc = Map::new();

    for category in model.categories() {
        let mut cells = Map::new();
        for descriptor in category.cells() {
            if let Some(value) = category.get(descriptor.name) {
                cells.insert(descriptor.name.to_string(), encode(descriptor, &value)?);
            }
        }
        if !cells.is_empty() {
            doc.insert(category.name().to_string(), Value::Object(cells));
        }
    }

    Ok(Value::Object(doc))
}

/// Build a fresh model and set exactly the cells named in `doc`.
pub fn deserialize<M: ConfigModel>(doc: &Value) -> Result<M, CodecError> {
    let mut model = M::default();

    let categories = doc
        .as_object()
        .ok_or_else(|| CodecError::mismatch("<root>", "object", doc))?;

    for (category_name, cells) in categories {
        let category = model
            .category_mut(category_name)
            .ok_or_else(|| CodecError::UnknownCategory(category_name.clone()))?;

        let cells = cells
            .as_object()
            .ok_or_else(|| CodecError::mismatch(category_name, "object", cells))?;

        for (cell_name, raw) in cells {
            let descriptor = category
                .descriptor(cell_name)
                .ok_or_else(|| CodecError::UnknownCell {
                    category: category_name.clone(),
                    cell: cell_name.clone(),
                })?;
            let value = decode(descriptor, raw)?;
            trace!(category = %category_name, cell = %cell_name, "option restored");
            category.set(cell_name, value)?;
        }
    }

    Ok(model)
}

pub fn to_string<M: ConfigModel>(model: &M) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&serialize(model)?)?)
}

pub fn from_str<M: ConfigModel>(text: &str) -> Result<M, CodecError> {
    let doc: Value = serde_json::from_str(text)?;
    deserialize(&doc)
}

fn encode(descriptor: &CellDescriptor, value: &OptionValue) -> Result<Value, CodecError> {
    Ok(match value {
        OptionValue::Bool(b) => Value::Bool(*b),
        OptionValue::Int(i) => Value::from(*i),
        OptionValue::Double(d) => Number::from_f64(*d)
            .map(Value::Number)
            .ok_or_else(|| CodecError::TypeMismatch {
                cell: descriptor.name.to_string(),
                expected: "finite number",
                found: d.to_string(),
            })?,
        OptionValue::String(s) => Value::String(s.clone()),
        OptionValue::Timestamp(ts) => {
            Value::String(ts.format(&Rfc3339).map_err(|_| CodecError::MalformedTimestamp {
                cell: descriptor.name.to_string(),
                value: ts.to_string(),
            })?)
        }
        OptionValue::Rate(rate) => {
            // Must stay readable by `decode`, or a snapshot could not be restored
            if !rate.magnitude.is_finite() || rate.magnitude < 0.0 {
                return Err(CodecError::MalformedRate {
                    cell: descriptor.name.to_string(),
                    value: rate.to_string(),
                });
            }
            Value::String(rate.to_string())
        }
        OptionValue::Enum(code) => Value::from(*code),
    })
}

fn decode(descriptor: &CellDescriptor, raw: &Value) -> Result<OptionValue, CodecError> {
    let cell = descriptor.name;
    let mismatch = || CodecError::mismatch(cell, descriptor.kind.describe(), raw);

    Ok(match descriptor.kind {
        OptionType::Bool => OptionValue::Bool(raw.as_bool().ok_or_else(mismatch)?),
        OptionType::Timestamp => {
            let text = raw.as_str().ok_or_else(mismatch)?;
            OptionValue::Timestamp(parse_timestamp(text).ok_or_else(|| {
                CodecError::MalformedTimestamp {
                    cell: cell.to_string(),
                    value: text.to_string(),
                }
            })?)
        }
        OptionType::Double => OptionValue::Double(raw.as_f64().ok_or_else(mismatch)?),
        OptionType::Int => OptionValue::Int(raw.as_i64().ok_or_else(mismatch)?),
        OptionType::Rate => {
            let text = raw.as_str().ok_or_else(mismatch)?;
            OptionValue::Rate(text.parse::<Rate>().map_err(|_| CodecError::MalformedRate {
                cell: cell.to_string(),
                value: text.to_string(),
            })?)
        }
        OptionType::String => OptionValue::String(raw.as_str().ok_or_else(mismatch)?.to_string()),
        OptionType::Enum => OptionValue::Enum(raw.as_i64().ok_or_else(mismatch)?),
    })
}

/// RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(ts);
    }
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::options::cell::{option_category, OptionCategory};
    use crate::downloader::options::catalog::{AudioFormat, MergeOutputFormat, Options};
    use crate::downloader::options::rate::RateUnit;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use time::macros::datetime;

    option_category! {
        struct Playback("Playback") {
            speed: f64 => ("Speed", "--speed"),
        }
    }

    /// Model without an Authentication category
    #[derive(Debug, Default)]
    struct PlaybackOnly {
        playback: Playback,
    }

    impl ConfigModel for PlaybackOnly {
        fn categories(&self) -> Vec<&dyn OptionCategory> {
            vec![&self.playback as &dyn OptionCategory]
        }

        fn category_mut(&mut self, name: &str) -> Option<&mut dyn OptionCategory> {
            match name {
                Playback::NAME => Some(&mut self.playback as &mut dyn OptionCategory),
                _ => None,
            }
        }
    }

    fn populated() -> Options {
        let mut options = Options::default();
        options.authentication.username = Some("bob".into());
        options.authentication.netrc = Some(false);
        options.network.socket_timeout = Some(15.5);
        options.download.retries = Some(3);
        options.download.limit_rate = Some(Rate::new(4.2, RateUnit::Mega));
        options.video_selection.date_after = Some(datetime!(2023-06-01 08:30 UTC));
        options.video_format.merge_output_format = Some(MergeOutputFormat::Mkv);
        options.post_processing.audio_format = Some(AudioFormat::Opus);
        options
    }

    #[test]
    fn test_empty_model_serializes_to_empty_object() {
        assert_eq!(serialize(&Options::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_serialize_encodes_by_type() {
        let doc = serialize(&populated()).unwrap();
        assert_eq!(
            doc,
            json!({
                "Network": { "SocketTimeout": 15.5 },
                "VideoSelection": { "DateAfter": "2023-06-01T08:30:00Z" },
                "Download": { "LimitRate": "4.2M", "Retries": 3 },
                "VideoFormat": { "MergeOutputFormat": 2 },
                "Authentication": { "Username": "bob", "Netrc": false },
                "PostProcessing": { "AudioFormat": 6 },
            })
        );
    }

    #[test]
    fn test_omits_unset_cells_and_empty_categories() {
        let doc = serialize(&populated()).unwrap();
        for (_, cells) in doc.as_object().unwrap() {
            let cells = cells.as_object().unwrap();
            assert!(!cells.is_empty());
            assert!(cells.values().all(|v| !v.is_null()));
        }
        assert!(doc.get("General").is_none());
        assert!(doc["Authentication"].get("Password").is_none());
    }

    #[test]
    fn test_round_trip_keeps_present_cells() {
        let original = populated();
        let restored: Options = deserialize(&serialize(&original).unwrap()).unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.authentication.password, None);
    }

    #[test]
    fn test_round_trip_through_text() {
        let original = populated();
        let text = to_string(&original).unwrap();
        let restored: Options = from_str(&text).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_string_cell_dispatch() {
        let doc = json!({ "Authentication": { "Username": "bob" } });
        let options: Options = deserialize(&doc).unwrap();
        assert_eq!(options.authentication.username.as_deref(), Some("bob"));
        assert_eq!(options.authentication.password, None);
    }

    #[test]
    fn test_unknown_category_against_other_model() {
        let doc = json!({ "Authentication": { "Username": "bob" } });
        let err = deserialize::<PlaybackOnly>(&doc).unwrap_err();
        assert!(matches!(err, CodecError::UnknownCategory(name) if name == "Authentication"));
    }

    #[test]
    fn test_category_match_is_case_sensitive() {
        let doc = json!({ "authentication": { "Username": "bob" } });
        assert!(matches!(
            deserialize::<Options>(&doc),
            Err(CodecError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_unknown_cell() {
        let doc = json!({ "Authentication": { "Nickname": "bob" } });
        assert!(matches!(
            deserialize::<Options>(&doc),
            Err(CodecError::UnknownCell { category, cell })
                if category == "Authentication" && cell == "Nickname"
        ));
    }

    #[test]
    fn test_bool_cell_rejects_string() {
        let doc = json!({ "VerbositySimulation": { "Quiet": "true" } });
        assert!(matches!(
            deserialize::<Options>(&doc),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_int_cell_rejects_fraction() {
        let doc = json!({ "Download": { "Retries": 2.5 } });
        assert!(matches!(
            deserialize::<Options>(&doc),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_double_cell_accepts_integer() {
        let doc = json!({ "Playback": { "Speed": 2 } });
        let model: PlaybackOnly = deserialize(&doc).unwrap();
        assert_eq!(model.playback.speed, Some(2.0));
    }

    #[test]
    fn test_malformed_timestamp() {
        let doc = json!({ "VideoSelection": { "Date": "last tuesday" } });
        assert!(matches!(
            deserialize::<Options>(&doc),
            Err(CodecError::MalformedTimestamp { .. })
        ));
    }

    #[test]
    fn test_date_only_timestamp() {
        let doc = json!({ "VideoSelection": { "Date": "2024-02-29" } });
        let options: Options = deserialize(&doc).unwrap();
        assert_eq!(options.video_selection.date, Some(datetime!(2024-02-29 0:00 UTC)));
    }

    #[test]
    fn test_malformed_rate() {
        let doc = json!({ "Download": { "LimitRate": "quick" } });
        assert!(matches!(
            deserialize::<Options>(&doc),
            Err(CodecError::MalformedRate { .. })
        ));
    }

    #[test]
    fn test_serialize_rejects_unreadable_rates() {
        for magnitude in [-1.0, f64::NAN, f64::INFINITY] {
            let mut options = Options::default();
            options.download.limit_rate = Some(Rate::new(magnitude, RateUnit::Kilo));
            assert!(matches!(
                serialize(&options),
                Err(CodecError::MalformedRate { cell, .. }) if cell == "LimitRate"
            ));
        }
    }

    #[test]
    fn test_zero_rate_round_trips() {
        let mut options = Options::default();
        options.download.limit_rate = Some(Rate::new(0.0, RateUnit::Bytes));
        let restored: Options = deserialize(&serialize(&options).unwrap()).unwrap();
        assert_eq!(restored, options);
    }

    #[test]
    fn test_rate_given_as_number_is_type_mismatch() {
        let doc = json!({ "Download": { "LimitRate": 50 } });
        assert!(matches!(
            deserialize::<Options>(&doc),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_enum_takes_raw_code() {
        let doc = json!({ "PostProcessing": { "AudioFormat": 5 } });
        let options: Options = deserialize(&doc).unwrap();
        assert_eq!(options.post_processing.audio_format, Some(AudioFormat::Mp3));
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            deserialize::<Options>(&json!([1, 2])),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_text() {
        assert!(matches!(from_str::<Options>("{"), Err(CodecError::Json(_))));
    }
}
