//! Tolerant decoding of raw store documents into [`Mosque`]s.
//!
//! Stored documents are loosely shaped: fields go missing, hold the wrong type or
//! were written by older clients. Every field is read as "the expected type, or its
//! default"; only a missing or non-map `location` makes a record unusable.

use crate::error::SkipReason;
use crate::model::{
    AdvancedSettings, CalculationParameters, IqamahCalculationRules, IqamahRule, Location, Mosque,
    Photo, PrayerAdjustments,
};
use crate::store::RawDocument;
use serde_json::{Map, Value};

/// Values substituted for absent or wrongly typed fields.
pub mod defaults {
    pub const TEXT: &str = "";
    pub const IS_DEBUG: bool = false;
    pub const VERIFICATION_STATUS: &str = "Unverified";
    pub const METHOD: &str = "MoonSighting";
    pub const MADHAB_TYPE: &str = "Default";
    pub const IQAMAH_RULE_TYPE: &str = "Variable";
    pub const IQAMAH_MINUTES_AFTER: i32 = 10;
    pub const FAJR_ANGLE: f64 = 18.0;
    pub const ISHA_ANGLE: f64 = 17.0;
    pub const PRAYER_ADJUSTMENT: i32 = 0;
    pub const COORDINATE: f64 = 0.0;
}

type Object = Map<String, Value>;

fn text(map: &Object, key: &str, default: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => default.to_string(),
    }
}

fn optional_text(map: &Object, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn number(map: &Object, key: &str, default: f64) -> f64 {
    map.get(key).and_then(Value::as_f64).unwrap_or(default)
}

/// Integers pass through (saturating); floats truncate toward zero.
fn integer(map: &Object, key: &str, default: i32) -> i32 {
    match map.get(key) {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i32::try_from(i).unwrap_or(if i < 0 { i32::MIN } else { i32::MAX }),
            None => n.as_f64().map_or(default, |f| f as i32),
        },
        _ => default,
    }
}

fn flag(map: &Object, key: &str, default: bool) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn object<'a>(map: &'a Object, key: &str) -> Option<&'a Object> {
    map.get(key).and_then(Value::as_object)
}

fn photo(map: &Object) -> Photo {
    Photo {
        url: text(map, "url", defaults::TEXT),
        storage_reference: text(map, "storageReference", defaults::TEXT),
    }
}

fn location(data: &Object) -> Result<Location, SkipReason> {
    let map = match data.get("location") {
        None | Some(Value::Null) => return Err(SkipReason::MissingLocation),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(SkipReason::MalformedLocation),
    };

    Ok(Location {
        latitude: number(map, "latitude", defaults::COORDINATE),
        longitude: number(map, "longitude", defaults::COORDINATE),
        address: text(map, "address", defaults::TEXT),
    })
}

fn iqamah_rule(rules: Option<&Object>, key: &str, prayer_type: &str) -> IqamahRule {
    let rule = rules.and_then(|r| object(r, key));

    IqamahRule {
        prayer_type: prayer_type.to_string(),
        rule_type: rule.map_or_else(
            || defaults::IQAMAH_RULE_TYPE.to_string(),
            |r| text(r, "type", defaults::IQAMAH_RULE_TYPE),
        ),
        fixed_time: rule.and_then(|r| optional_text(r, "fixedTime")),
        minutes_after: Some(rule.map_or(defaults::IQAMAH_MINUTES_AFTER, |r| {
            integer(r, "minutesAfter", defaults::IQAMAH_MINUTES_AFTER)
        })),
    }
}

fn prayer_adjustments(map: Option<&Object>) -> PrayerAdjustments {
    let Some(map) = map else {
        return PrayerAdjustments::default();
    };
    let minutes = |key| integer(map, key, defaults::PRAYER_ADJUSTMENT);

    PrayerAdjustments {
        fajr: minutes("fajr"),
        sunrise: minutes("sunrise"),
        dhuhr: minutes("dhuhr"),
        asr: minutes("asr"),
        maghrib: minutes("maghrib"),
        isha: minutes("isha"),
    }
}

fn calculation_parameters(map: Option<&Object>) -> CalculationParameters {
    let empty = Object::new();
    let map = map.unwrap_or(&empty);
    let rules = object(map, "iqamahCalculationRules");
    let advanced = object(map, "advancedSettings").unwrap_or(&empty);

    CalculationParameters {
        method: text(map, "method", defaults::METHOD),
        madhab_type: text(map, "madhabType", defaults::MADHAB_TYPE),
        iqamah_calculation_rules: IqamahCalculationRules {
            fajr: iqamah_rule(rules, "fajr", "Fajr"),
            dhuhr: iqamah_rule(rules, "dhuhr", "Dhuhr"),
            asr: iqamah_rule(rules, "asr", "Asr"),
            maghrib: iqamah_rule(rules, "maghrib", "Maghrib"),
            isha: iqamah_rule(rules, "isha", "Isha"),
        },
        advanced_settings: AdvancedSettings {
            elevation_rule: optional_text(advanced, "elevationRule"),
            fajr_angle: number(advanced, "fajrAngle", defaults::FAJR_ANGLE),
            isha_angle: number(advanced, "ishaAngle", defaults::ISHA_ANGLE),
            prayer_adjustments: prayer_adjustments(object(advanced, "prayerAdjustments")),
        },
    }
}

/// Decodes one stored document.
///
/// Returns `Err` only when the record has no usable `location`; everything else
/// falls back to the values in [`defaults`]. Non-object entries in `photos` are
/// dropped one by one.
pub fn decode_mosque(doc: &RawDocument) -> Result<Mosque, SkipReason> {
    let data = &doc.data;
    let location = location(data)?;

    let photos = match data.get("photos") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).map(photo).collect(),
        _ => Vec::new(),
    };

    Ok(Mosque {
        id: doc.id.clone(),
        first_name: text(data, "firstName", defaults::TEXT),
        last_name: text(data, "lastName", defaults::TEXT),
        email: text(data, "email", defaults::TEXT),
        phone_number: text(data, "phoneNumber", defaults::TEXT),
        location,
        community_name: text(data, "communityName", defaults::TEXT),
        last_updated_at: text(data, "lastUpdatedAt", defaults::TEXT),
        thumbnail: object(data, "thumbnail").map(photo).unwrap_or_default(),
        donation_link: text(data, "donationLink", defaults::TEXT),
        is_debug: flag(data, "isDebug", defaults::IS_DEBUG),
        verification_status: text(data, "verificationStatus", defaults::VERIFICATION_STATUS),
        photos,
        calculation_parameters: calculation_parameters(object(data, "calculationParameters")),
    })
}
