// src/models/dates.rs
//
// Datas no formato "quase ISO" que o frontend e os arquivos de dados usam:
// aceitamos RFC3339 (com Z ou offset, tomado como horário de relógio),
// datetime sem offset e data pura. O sistema trabalha inteiramente com
// horário local ingênuo, então o offset é descartado, não convertido.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse leniente: valores vazios ou irreconhecíveis viram `None`,
/// nunca erro: dado sujo desabilita o campo em vez de rejeitar o item.
pub fn parse_flexible(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        // horário de relógio como escrito, sem conversão de fuso
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Módulo serde para campos `Option<NaiveDateTime>` no formato do arquivo.
pub mod flex_opt {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.format(super::WIRE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_flexible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_plain_iso_datetime() {
        assert_eq!(parse_flexible("2025-01-10T08:30:00"), Some(dt(2025, 1, 10, 8, 30, 0)));
        assert_eq!(parse_flexible("2025-01-10 08:30:00"), Some(dt(2025, 1, 10, 8, 30, 0)));
    }

    #[test]
    fn z_suffix_is_taken_as_clock_time() {
        assert_eq!(parse_flexible("2025-01-10T08:30:00Z"), Some(dt(2025, 1, 10, 8, 30, 0)));
        assert_eq!(
            parse_flexible("2025-01-10T08:30:00-03:00"),
            Some(dt(2025, 1, 10, 8, 30, 0))
        );
    }

    #[test]
    fn bare_date_becomes_midnight() {
        assert_eq!(parse_flexible("2025-01-10"), Some(dt(2025, 1, 10, 0, 0, 0)));
    }

    #[test]
    fn garbage_is_none_not_error() {
        assert_eq!(parse_flexible(""), None);
        assert_eq!(parse_flexible("amanhã"), None);
        assert_eq!(parse_flexible("10/01/2025"), None);
    }
}
