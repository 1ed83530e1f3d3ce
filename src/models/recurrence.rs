// src/models/recurrence.rs

use chrono::{NaiveDateTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::dates;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
pub enum RecurrenceStatus {
    #[default]
    Active,
    Paused,
    /// Terminal: atingido apenas por regras `once` após envio bem-sucedido.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceType {
    Once,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceType {
    /// Tipos fora da lista são regras desabilitadas, não erro; o valor
    /// original fica preservado no campo textual do item.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "once" => Some(Self::Once),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Nomes de dias em português, com e sem acento, caixa indiferente.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_lowercase().as_str() {
        "segunda" => Some(Weekday::Mon),
        "terça" | "terca" => Some(Weekday::Tue),
        "quarta" => Some(Weekday::Wed),
        "quinta" => Some(Weekday::Thu),
        "sexta" => Some(Weekday::Fri),
        "sábado" | "sabado" => Some(Weekday::Sat),
        "domingo" => Some(Weekday::Sun),
        _ => None,
    }
}

// --- Struct principal ---

/// Cobrança recorrente: a unidade de trabalho do motor de recorrência.
///
/// `next_send_date` é uma projeção para exibição: é sempre recalculado
/// antes de ser usado como gatilho, nunca confiado como fonte de verdade.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringCharge {
    #[serde(default)]
    pub id: String,

    #[validate(length(min = 1, message = "O nome do cliente é obrigatório"))]
    #[schema(example = "Maria da Silva")]
    pub client_name: String,

    #[serde(default)]
    pub client_phone: String,

    #[schema(example = "Olá (nome), sua mensalidade de (valor) vence em (vencimento).")]
    pub message_template: String,

    #[schema(example = "150.00")]
    pub value: Decimal,

    #[serde(default)]
    pub status: RecurrenceStatus,

    /// "once" | "daily" | "weekly" | "monthly" | "yearly"; outros valores
    /// desabilitam a regra.
    #[schema(example = "monthly")]
    pub recurrence_type: String,

    #[serde(default)]
    #[schema(example = 1)]
    pub recurrence_interval: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_days_of_week")]
    #[schema(value_type = Option<Vec<String>>, example = json!(["segunda", "quarta"]))]
    pub recurrence_days_of_week: Option<Vec<String>>,

    #[serde(default)]
    #[schema(example = 15)]
    pub recurrence_day_of_month: Option<u32>,

    #[serde(default)]
    #[schema(example = 3)]
    pub recurrence_month_of_year: Option<u32>,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime, example = "2025-01-10T00:00:00")]
    pub due_date: Option<NaiveDateTime>,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub start_date: Option<NaiveDateTime>,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end_date: Option<NaiveDateTime>,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_sent_date: Option<NaiveDateTime>,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub next_send_date: Option<NaiveDateTime>,

    #[serde(default)]
    #[schema(example = "Enviado")]
    pub last_attempt_status: Option<String>,

    #[serde(default)]
    pub last_attempt_message: Option<String>,

    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

impl RecurringCharge {
    pub fn parsed_type(&self) -> Option<RecurrenceType> {
        RecurrenceType::from_name(&self.recurrence_type)
    }

    /// Intervalo efetivo: ausente ou <= 0 vira 1 antes de qualquer aritmética.
    pub fn effective_interval(&self) -> i64 {
        match self.recurrence_interval {
            Some(i) if i >= 1 => i,
            _ => 1,
        }
    }

    /// Dias da semana configurados, já resolvidos; nomes desconhecidos
    /// são descartados.
    pub fn weekday_set(&self) -> Vec<Weekday> {
        self.recurrence_days_of_week
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|d| parse_weekday(d))
            .collect()
    }
}

impl Default for RecurringCharge {
    fn default() -> Self {
        Self {
            id: String::new(),
            client_name: String::new(),
            client_phone: String::new(),
            message_template: String::new(),
            value: Decimal::ZERO,
            status: RecurrenceStatus::Active,
            recurrence_type: "once".to_string(),
            recurrence_interval: None,
            recurrence_days_of_week: None,
            recurrence_day_of_month: None,
            recurrence_month_of_year: None,
            due_date: None,
            start_date: None,
            end_date: None,
            last_sent_date: None,
            next_send_date: None,
            last_attempt_status: None,
            last_attempt_message: None,
            extra: Map::new(),
        }
    }
}

// Dados antigos às vezes gravaram a lista de dias como string JSON;
// aceitamos as duas formas na leitura.
fn deserialize_days_of_week<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect(),
        ),
        Some(Value::String(encoded)) => serde_json::from_str::<Vec<String>>(&encoded).ok(),
        _ => None,
    })
}

// --- Payload de atualização ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecurringChargePayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório"))]
    pub client_name: String,

    pub client_phone: Option<String>,
    pub message_template: String,
    pub value: Decimal,
    pub status: Option<RecurrenceStatus>,
    pub recurrence_type: String,
    pub recurrence_interval: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_days_of_week")]
    #[schema(value_type = Option<Vec<String>>)]
    pub recurrence_days_of_week: Option<Vec<String>>,

    pub recurrence_day_of_month: Option<u32>,
    pub recurrence_month_of_year: Option<u32>,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<NaiveDateTime>,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub start_date: Option<NaiveDateTime>,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end_date: Option<NaiveDateTime>,

    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

impl UpdateRecurringChargePayload {
    pub fn apply_to(self, rc: &mut RecurringCharge) {
        rc.client_name = self.client_name;
        rc.message_template = self.message_template;
        rc.value = self.value;
        rc.recurrence_type = self.recurrence_type;
        if let Some(phone) = self.client_phone {
            rc.client_phone = phone;
        }
        if let Some(status) = self.status {
            rc.status = status;
        }
        if let Some(interval) = self.recurrence_interval {
            rc.recurrence_interval = Some(interval);
        }
        if let Some(days) = self.recurrence_days_of_week {
            rc.recurrence_days_of_week = Some(days);
        }
        if let Some(day) = self.recurrence_day_of_month {
            rc.recurrence_day_of_month = Some(day);
        }
        if let Some(month) = self.recurrence_month_of_year {
            rc.recurrence_month_of_year = Some(month);
        }
        if let Some(due) = self.due_date {
            rc.due_date = Some(due);
        }
        if let Some(start) = self.start_date {
            rc.start_date = Some(start);
        }
        if let Some(end) = self.end_date {
            rc.end_date = Some(end);
        }
        for (key, value) in self.extra {
            rc.extra.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_names_with_and_without_diacritics() {
        assert_eq!(parse_weekday("segunda"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("Terça"), Some(Weekday::Tue));
        assert_eq!(parse_weekday("terca"), Some(Weekday::Tue));
        assert_eq!(parse_weekday("SÁBADO"), Some(Weekday::Sat));
        assert_eq!(parse_weekday("sabado"), Some(Weekday::Sat));
        assert_eq!(parse_weekday(" domingo "), Some(Weekday::Sun));
        assert_eq!(parse_weekday("monday"), None);
        assert_eq!(parse_weekday(""), None);
    }

    #[test]
    fn interval_is_coerced_to_one() {
        let mut rc = RecurringCharge::default();
        assert_eq!(rc.effective_interval(), 1);
        rc.recurrence_interval = Some(0);
        assert_eq!(rc.effective_interval(), 1);
        rc.recurrence_interval = Some(-3);
        assert_eq!(rc.effective_interval(), 1);
        rc.recurrence_interval = Some(4);
        assert_eq!(rc.effective_interval(), 4);
    }

    #[test]
    fn days_of_week_accepts_array_and_json_string() {
        let json = r#"{"clientName":"Maria","messageTemplate":"x","value":10.0,
            "recurrenceType":"weekly","recurrenceDaysOfWeek":["segunda","quarta"]}"#;
        let rc: RecurringCharge = serde_json::from_str(json).unwrap();
        assert_eq!(rc.weekday_set(), vec![Weekday::Mon, Weekday::Wed]);

        let json = r#"{"clientName":"Maria","messageTemplate":"x","value":10.0,
            "recurrenceType":"weekly","recurrenceDaysOfWeek":"[\"sexta\"]"}"#;
        let rc: RecurringCharge = serde_json::from_str(json).unwrap();
        assert_eq!(rc.weekday_set(), vec![Weekday::Fri]);
    }

    #[test]
    fn unknown_recurrence_type_is_preserved_but_unparsed() {
        let json = r#"{"clientName":"Maria","messageTemplate":"x","value":10.0,
            "recurrenceType":"quarterly"}"#;
        let rc: RecurringCharge = serde_json::from_str(json).unwrap();
        assert_eq!(rc.recurrence_type, "quarterly");
        assert_eq!(rc.parsed_type(), None);
    }

    #[test]
    fn unknown_fields_round_trip_through_extra() {
        let json = r#"{"clientName":"Maria","messageTemplate":"x","value":10.0,
            "recurrenceType":"once","categoria":"mensalidade"}"#;
        let rc: RecurringCharge = serde_json::from_str(json).unwrap();
        assert_eq!(rc.extra.get("categoria"), Some(&Value::String("mensalidade".into())));
        let out = serde_json::to_value(&rc).unwrap();
        assert_eq!(out["categoria"], "mensalidade");
    }
}
