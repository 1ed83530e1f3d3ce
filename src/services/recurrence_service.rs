// src/services/recurrence_service.rs
//
// Motor de recorrência: cálculo puro da próxima ocorrência e a varredura
// que despacha as cobranças vencidas. Toda escrita na coleção passa pelo
// mesmo lock: a varredura trabalha sobre um snapshot e regrava a coleção
// inteira no final, então qualquer escrita concorrente seria perdida.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    common::error::AppError,
    common::format::{format_currency, format_date},
    db::{ClientRepository, LogRepository, RecurrenceRepository, SettingsRepository},
    gateway::MessageGateway,
    models::{
        recurrence::RecurrenceType, LogEntry, RecurrenceStatus, RecurringCharge, Settings,
        UpdateRecurringChargePayload,
    },
};

/// Calcula a próxima ocorrência de uma regra a partir de `now`.
///
/// Função pura: todo o tempo vem do parâmetro, nunca do relógio. `None`
/// significa "sem ocorrência futura": regra pausada, consumida, expirada
/// pelo `endDate` ou configurada com um tipo desconhecido.
pub fn calculate_next_send_date(
    rc: &RecurringCharge,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    if rc.status == RecurrenceStatus::Paused {
        return None;
    }
    let rtype = rc.parsed_type()?;

    if rtype == RecurrenceType::Once {
        let mut next = None;
        if let Some(due) = rc.due_date {
            // consumida quando já houve tentativa no vencimento ou depois
            if rc.last_sent_date.map_or(true, |last| last < due) {
                if due >= now {
                    next = Some(due);
                } else if rc.last_sent_date.is_none() {
                    // atrasada e nunca tentada: dispara já
                    next = Some(now);
                }
            }
        } else if rc.last_sent_date.map_or(true, |last| last < now) {
            next = match rc.start_date {
                Some(start) if start >= now => Some(start),
                _ => Some(now),
            };
        }
        return match (next, rc.end_date) {
            (Some(n), Some(end)) if n > end => None,
            _ => next,
        };
    }

    let anchor = rc.last_sent_date.or(rc.start_date)?;

    let next = if anchor > now && rc.last_sent_date.is_none() {
        // início futuro e sem histórico: a primeira ocorrência é o próprio início
        anchor
    } else {
        let interval = rc.effective_interval();
        let mut cursor = anchor.max(now);
        loop {
            let candidate = match rtype {
                RecurrenceType::Daily => {
                    cursor += Duration::days(interval);
                    cursor
                }
                RecurrenceType::Weekly => {
                    let targets = rc.weekday_set();
                    if targets.is_empty() {
                        return None;
                    }
                    let search_start = if rc.last_sent_date.is_some() {
                        cursor + Duration::days(1)
                    } else {
                        cursor
                    };
                    let found = (0..=7 * interval)
                        .map(|offset| search_start + Duration::days(offset))
                        .find(|check| targets.contains(&check.weekday()));
                    match found {
                        Some(check) => check,
                        None => {
                            cursor += Duration::weeks(interval);
                            while !targets.contains(&cursor.weekday()) {
                                cursor += Duration::days(1);
                            }
                            cursor
                        }
                    }
                }
                RecurrenceType::Monthly => {
                    let mut year = cursor.year();
                    let mut month = i64::from(cursor.month()) + interval;
                    while month > 12 {
                        month -= 12;
                        year += 1;
                    }
                    let day = rc
                        .recurrence_day_of_month
                        .filter(|d| *d >= 1)
                        .unwrap_or(1)
                        .min(last_day_of_month(year, month as u32));
                    cursor = NaiveDate::from_ymd_opt(year, month as u32, day)?
                        .and_hms_opt(0, 0, 0)?;
                    cursor
                }
                RecurrenceType::Yearly => {
                    let year = cursor.year() + interval as i32;
                    let month = rc
                        .recurrence_month_of_year
                        .filter(|m| *m >= 1)
                        .unwrap_or_else(|| cursor.month());
                    let day = rc
                        .recurrence_day_of_month
                        .filter(|d| *d >= 1)
                        .unwrap_or_else(|| cursor.day())
                        .min(last_day_of_month(year, month));
                    cursor = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
                    cursor
                }
                RecurrenceType::Once => return None,
            };

            if candidate > now {
                break candidate;
            }
            // Um item semanal nunca enviado pode propor o próprio `now`
            // como candidato; empurra a busca um dia adiante para
            // garantir progresso.
            if rtype == RecurrenceType::Weekly {
                cursor += Duration::days(1);
            }
        }
    };

    match rc.end_date {
        Some(end) if next > end => None,
        _ => Some(next),
    }
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// Orquestra o ciclo de vida das recorrências: CRUD com recálculo da
/// projeção `nextSendDate` e a varredura de despacho.
pub struct RecurrenceService {
    recurrents: Arc<dyn RecurrenceRepository>,
    clients: Arc<dyn ClientRepository>,
    logs: Arc<dyn LogRepository>,
    settings: Arc<dyn SettingsRepository>,
    gateway: Arc<dyn MessageGateway>,
    // escritor único da coleção: serializa varredura e CRUD entre si;
    // duas varreduras simultâneas poderiam enviar o mesmo item em dobro,
    // e um add/update durante a varredura seria apagado pelo replace_all
    write_lock: Mutex<()>,
}

impl RecurrenceService {
    pub fn new(
        recurrents: Arc<dyn RecurrenceRepository>,
        clients: Arc<dyn ClientRepository>,
        logs: Arc<dyn LogRepository>,
        settings: Arc<dyn SettingsRepository>,
        gateway: Arc<dyn MessageGateway>,
    ) -> Self {
        Self {
            recurrents,
            clients,
            logs,
            settings,
            gateway,
            write_lock: Mutex::new(()),
        }
    }

    /// Lista as recorrências com a projeção `nextSendDate` atualizada,
    /// persistindo o valor recalculado.
    pub async fn list_recomputed(
        &self,
        now: NaiveDateTime,
    ) -> Result<Vec<RecurringCharge>, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.recurrents.list().await?;
        for rc in items.iter_mut() {
            rc.next_send_date = calculate_next_send_date(rc, now);
        }
        self.recurrents.replace_all(items.clone()).await?;
        Ok(items)
    }

    /// Cria uma recorrência nova: histórico zerado, projeção calculada.
    pub async fn add(
        &self,
        mut rc: RecurringCharge,
        now: NaiveDateTime,
    ) -> Result<RecurringCharge, AppError> {
        let _guard = self.write_lock.lock().await;
        rc.last_sent_date = None;
        rc.last_attempt_status = None;
        rc.last_attempt_message = None;
        rc.next_send_date = calculate_next_send_date(&rc, now);
        self.recurrents.add(rc).await
    }

    pub async fn update(
        &self,
        id: &str,
        payload: UpdateRecurringChargePayload,
        now: NaiveDateTime,
    ) -> Result<RecurringCharge, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut rc = self
            .recurrents
            .get(id)
            .await?
            .ok_or(AppError::RecurrenceNotFound)?;

        // Completed é terminal: não aceita voltar para Active/Paused.
        if rc.status == RecurrenceStatus::Completed
            && payload.status.map_or(false, |s| s != RecurrenceStatus::Completed)
        {
            return Err(AppError::CompletedIsTerminal);
        }

        payload.apply_to(&mut rc);
        rc.next_send_date = calculate_next_send_date(&rc, now);
        self.recurrents
            .put(rc)
            .await?
            .ok_or(AppError::RecurrenceNotFound)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        self.recurrents.delete(id).await
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.recurrents.clear().await
    }

    /// Varredura de despacho. Retorna quantos itens tiveram envio tentado
    /// nesta passada; falhas individuais ficam no log de auditoria e nos
    /// campos de tentativa de cada item, nunca no canal de erro.
    pub async fn process_recurrents(&self, now: NaiveDateTime) -> Result<usize, AppError> {
        let _guard = self.write_lock.lock().await;

        let cfg = self.settings.get().await?;
        let mut items = self.recurrents.list().await?;
        let mut processed = 0usize;

        for rc in items.iter_mut() {
            // projeção atualizada mesmo para itens pausados/concluídos
            rc.next_send_date = calculate_next_send_date(rc, now);

            let due_now = rc.status == RecurrenceStatus::Active
                && rc.next_send_date.map_or(false, |n| n <= now)
                && rc.end_date.map_or(true, |e| e >= now);
            if !due_now {
                continue;
            }

            let Some(client) = self.clients.find_by_name(&rc.client_name).await? else {
                // erro de dado, não de sistema: a ocorrência não é consumida
                // e o item volta a falhar a cada varredura até ser corrigido
                let msg = format!(
                    "Cliente '{}' não encontrado para recorrência.",
                    rc.client_name
                );
                rc.last_attempt_status = Some("Erro".to_string());
                rc.last_attempt_message = Some(msg.clone());
                self.log_attempt(&rc.client_name, &rc.client_phone, "Erro", &msg)
                    .await;
                continue;
            };

            let message = render_message(rc, &cfg);
            let outcome = self.gateway.send(&client.phone, &message).await;

            rc.last_sent_date = Some(now);
            rc.last_attempt_status = Some(outcome.status.clone());
            rc.last_attempt_message = Some(outcome.message.clone());
            self.log_attempt(&rc.client_name, &client.phone, &outcome.status, &outcome.message)
                .await;

            if rc.parsed_type() == Some(RecurrenceType::Once) && outcome.is_sent() {
                rc.status = RecurrenceStatus::Completed;
                rc.next_send_date = None;
            } else {
                rc.next_send_date = calculate_next_send_date(rc, now);
            }
            processed += 1;
        }

        self.recurrents.replace_all(items).await?;
        info!("🔁 Varredura de recorrências concluída: {} processadas", processed);
        Ok(processed)
    }

    // O log de auditoria nunca derruba a varredura.
    async fn log_attempt(&self, client_name: &str, phone: &str, status: &str, message: &str) {
        let entry = LogEntry {
            id: String::new(),
            timestamp: None,
            client_name: Some(client_name.to_string()),
            whatsapp: Some(if phone.is_empty() { "N/A".to_string() } else { phone.to_string() }),
            status: Some(status.to_string()),
            message: Some(message.to_string()),
            origin: Some("Recorrente".to_string()),
            extra: Default::default(),
        };
        if let Err(e) = self.logs.append(entry).await {
            warn!("Falha ao gravar log de recorrência: {}", e);
        }
    }
}

fn render_message(rc: &RecurringCharge, cfg: &Settings) -> String {
    let template = if rc.message_template.is_empty() {
        cfg.default_message.as_str()
    } else {
        rc.message_template.as_str()
    };
    template
        .replace("(nome)", &rc.client_name)
        .replace("(valor)", &format_currency(Some(rc.value), &cfg.currency_format))
        .replace("(vencimento)", &format_date(rc.due_date, &cfg.date_format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        JsonClientRepository, JsonLogRepository, JsonRecurrenceRepository, JsonSettingsRepository,
    };
    use crate::gateway::{DispatchOutcome, DispatchStatus};
    use crate::models::Client;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use serde_json::Map;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn rule(rtype: &str) -> RecurringCharge {
        RecurringCharge {
            client_name: "Maria".to_string(),
            message_template: "(nome) deve (valor) até (vencimento)".to_string(),
            value: Decimal::new(123450, 2),
            recurrence_type: rtype.to_string(),
            ..Default::default()
        }
    }

    // --- calculadora ---

    #[test]
    fn paused_rules_never_schedule() {
        let mut rc = rule("daily");
        rc.status = RecurrenceStatus::Paused;
        rc.start_date = Some(dt(2025, 1, 1, 0, 0, 0));
        assert_eq!(calculate_next_send_date(&rc, dt(2025, 1, 5, 0, 0, 0)), None);
    }

    #[test]
    fn once_with_future_due_date_schedules_the_due_date() {
        let mut rc = rule("once");
        rc.due_date = Some(dt(2025, 1, 10, 0, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 1, 5, 0, 0, 0)),
            Some(dt(2025, 1, 10, 0, 0, 0))
        );
    }

    #[test]
    fn once_overdue_and_never_attempted_fires_immediately() {
        let mut rc = rule("once");
        rc.due_date = Some(dt(2025, 1, 10, 0, 0, 0));
        let now = dt(2025, 1, 20, 8, 0, 0);
        assert_eq!(calculate_next_send_date(&rc, now), Some(now));
    }

    #[test]
    fn once_already_attempted_at_or_after_due_is_consumed() {
        let mut rc = rule("once");
        rc.due_date = Some(dt(2025, 1, 10, 0, 0, 0));
        rc.last_sent_date = Some(dt(2025, 1, 10, 0, 0, 0));
        assert_eq!(calculate_next_send_date(&rc, dt(2025, 1, 20, 0, 0, 0)), None);
    }

    #[test]
    fn once_without_due_date_uses_future_start_or_now() {
        let mut rc = rule("once");
        rc.start_date = Some(dt(2025, 2, 1, 0, 0, 0));
        let now = dt(2025, 1, 5, 0, 0, 0);
        assert_eq!(calculate_next_send_date(&rc, now), Some(dt(2025, 2, 1, 0, 0, 0)));

        rc.start_date = Some(dt(2024, 12, 1, 0, 0, 0));
        assert_eq!(calculate_next_send_date(&rc, now), Some(now));
    }

    #[test]
    fn daily_steps_by_the_interval_past_now() {
        let mut rc = rule("daily");
        rc.recurrence_interval = Some(2);
        rc.last_sent_date = Some(dt(2025, 1, 1, 0, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 1, 5, 0, 0, 0)),
            Some(dt(2025, 1, 7, 0, 0, 0))
        );
    }

    #[test]
    fn future_start_with_no_history_is_the_first_occurrence() {
        let mut rc = rule("daily");
        rc.start_date = Some(dt(2025, 1, 10, 0, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 1, 5, 0, 0, 0)),
            Some(dt(2025, 1, 10, 0, 0, 0))
        );
    }

    #[test]
    fn daily_without_any_anchor_is_disabled() {
        let rc = rule("daily");
        assert_eq!(calculate_next_send_date(&rc, dt(2025, 1, 5, 0, 0, 0)), None);
    }

    #[test]
    fn weekly_picks_the_next_configured_day() {
        // 2025-01-08 é quarta; com {segunda, quarta} e envio feito na
        // quarta, a próxima ocorrência é a segunda seguinte (13/01).
        let mut rc = rule("weekly");
        rc.recurrence_days_of_week = Some(vec!["segunda".into(), "quarta".into()]);
        rc.last_sent_date = Some(dt(2025, 1, 8, 9, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 1, 8, 10, 0, 0)),
            Some(dt(2025, 1, 13, 10, 0, 0))
        );
    }

    #[test]
    fn weekly_accented_and_plain_spellings_are_equivalent() {
        let now = dt(2025, 1, 8, 10, 0, 0);
        let mut accented = rule("weekly");
        accented.recurrence_days_of_week = Some(vec!["sábado".into()]);
        accented.last_sent_date = Some(dt(2025, 1, 8, 9, 0, 0));
        let mut plain = rule("weekly");
        plain.recurrence_days_of_week = Some(vec!["sabado".into()]);
        plain.last_sent_date = Some(dt(2025, 1, 8, 9, 0, 0));
        assert_eq!(
            calculate_next_send_date(&accented, now),
            calculate_next_send_date(&plain, now)
        );
        assert_eq!(
            calculate_next_send_date(&plain, now),
            Some(dt(2025, 1, 11, 10, 0, 0))
        );
    }

    #[test]
    fn weekly_with_no_recognized_days_is_disabled() {
        let mut rc = rule("weekly");
        rc.recurrence_days_of_week = Some(vec!["monday".into()]);
        rc.start_date = Some(dt(2025, 1, 1, 0, 0, 0));
        assert_eq!(calculate_next_send_date(&rc, dt(2025, 1, 8, 0, 0, 0)), None);

        rc.recurrence_days_of_week = Some(vec![]);
        assert_eq!(calculate_next_send_date(&rc, dt(2025, 1, 8, 0, 0, 0)), None);
    }

    #[test]
    fn weekly_never_sent_on_a_matching_day_waits_for_the_next_week() {
        // início no próprio dia configurado, sem histórico: o candidato
        // inicial coincide com `now` e a busca precisa avançar
        let mut rc = rule("weekly");
        rc.recurrence_days_of_week = Some(vec!["quarta".into()]);
        rc.start_date = Some(dt(2025, 1, 8, 10, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 1, 8, 10, 0, 0)),
            Some(dt(2025, 1, 15, 10, 0, 0))
        );
    }

    #[test]
    fn monthly_clamps_to_the_last_day_of_the_target_month() {
        let mut rc = rule("monthly");
        rc.recurrence_day_of_month = Some(31);
        rc.last_sent_date = Some(dt(2025, 1, 31, 8, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 1, 31, 12, 0, 0)),
            Some(dt(2025, 2, 28, 0, 0, 0))
        );

        rc.last_sent_date = Some(dt(2025, 5, 10, 0, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 5, 20, 0, 0, 0)),
            Some(dt(2025, 6, 30, 0, 0, 0))
        );
    }

    #[test]
    fn monthly_with_stale_history_advances_past_now() {
        let mut rc = rule("monthly");
        rc.recurrence_day_of_month = Some(15);
        rc.last_sent_date = Some(dt(2025, 1, 15, 0, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 2, 20, 0, 0, 0)),
            Some(dt(2025, 3, 15, 0, 0, 0))
        );
    }

    #[test]
    fn monthly_interval_zero_behaves_as_one() {
        let mut rc = rule("monthly");
        rc.recurrence_interval = Some(0);
        rc.recurrence_day_of_month = Some(15);
        rc.last_sent_date = Some(dt(2025, 1, 15, 0, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 1, 15, 0, 0, 0)),
            Some(dt(2025, 2, 15, 0, 0, 0))
        );
    }

    #[test]
    fn monthly_december_rolls_the_year_over() {
        let mut rc = rule("monthly");
        rc.recurrence_day_of_month = Some(10);
        rc.last_sent_date = Some(dt(2025, 12, 10, 0, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 12, 10, 0, 0, 0)),
            Some(dt(2026, 1, 10, 0, 0, 0))
        );
    }

    #[test]
    fn yearly_leap_day_clamps_in_common_years() {
        let mut rc = rule("yearly");
        rc.last_sent_date = Some(dt(2024, 2, 29, 12, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2024, 2, 29, 12, 0, 0)),
            Some(dt(2025, 2, 28, 0, 0, 0))
        );
    }

    #[test]
    fn yearly_honors_configured_month_and_day() {
        let mut rc = rule("yearly");
        rc.recurrence_month_of_year = Some(3);
        rc.recurrence_day_of_month = Some(10);
        rc.last_sent_date = Some(dt(2025, 6, 1, 0, 0, 0));
        assert_eq!(
            calculate_next_send_date(&rc, dt(2025, 6, 1, 0, 0, 0)),
            Some(dt(2026, 3, 10, 0, 0, 0))
        );
    }

    #[test]
    fn yearly_invalid_month_disables_the_rule() {
        let mut rc = rule("yearly");
        rc.recurrence_month_of_year = Some(13);
        rc.last_sent_date = Some(dt(2025, 6, 1, 0, 0, 0));
        assert_eq!(calculate_next_send_date(&rc, dt(2025, 6, 1, 0, 0, 0)), None);
    }

    #[test]
    fn end_date_expires_the_rule() {
        let mut rc = rule("daily");
        rc.last_sent_date = Some(dt(2025, 1, 4, 0, 0, 0));
        rc.end_date = Some(dt(2025, 1, 5, 12, 0, 0));
        assert_eq!(calculate_next_send_date(&rc, dt(2025, 1, 5, 0, 0, 0)), None);

        let mut once = rule("once");
        once.due_date = Some(dt(2025, 1, 10, 0, 0, 0));
        once.end_date = Some(dt(2025, 1, 8, 0, 0, 0));
        assert_eq!(calculate_next_send_date(&once, dt(2025, 1, 5, 0, 0, 0)), None);
    }

    #[test]
    fn unrecognized_type_is_a_disabled_rule() {
        let mut rc = rule("quarterly");
        rc.start_date = Some(dt(2025, 1, 1, 0, 0, 0));
        assert_eq!(calculate_next_send_date(&rc, dt(2025, 1, 5, 0, 0, 0)), None);
    }

    #[test]
    fn last_day_of_month_handles_february_and_december() {
        assert_eq!(last_day_of_month(2025, 2), 28);
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2025, 12), 31);
        assert_eq!(last_day_of_month(2025, 4), 30);
    }

    // --- varredura ---

    struct FakeGateway {
        outcome: DispatchOutcome,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeGateway {
        fn new(outcome: DispatchOutcome) -> Self {
            Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn sending() -> Self {
            Self::new(DispatchOutcome::new(
                DispatchStatus::Sent,
                "Mensagem enviada com sucesso via Z-API.",
            ))
        }

        fn failing() -> Self {
            Self::new(DispatchOutcome::new(
                DispatchStatus::Error,
                "Erro Z-API: Tempo limite excedido.",
            ))
        }
    }

    #[async_trait]
    impl MessageGateway for FakeGateway {
        async fn send(&self, phone: &str, message: &str) -> DispatchOutcome {
            self.calls
                .lock()
                .await
                .push((phone.to_string(), message.to_string()));
            self.outcome.clone()
        }
    }

    struct Harness {
        _dir: tempfile::TempDir,
        service: RecurrenceService,
        gateway: Arc<FakeGateway>,
        clients: Arc<JsonClientRepository>,
        logs: Arc<JsonLogRepository>,
        recurrents: Arc<JsonRecurrenceRepository>,
    }

    async fn harness(gateway: FakeGateway) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let clients = Arc::new(
            JsonClientRepository::open(dir.path().join("clients.json")).await.unwrap(),
        );
        let logs =
            Arc::new(JsonLogRepository::open(dir.path().join("logs.json")).await.unwrap());
        let settings = Arc::new(
            JsonSettingsRepository::open(dir.path().join("settings.json")).await.unwrap(),
        );
        let recurrents = Arc::new(
            JsonRecurrenceRepository::open(dir.path().join("recurring_charges.json"))
                .await
                .unwrap(),
        );
        let gateway = Arc::new(gateway);
        let service = RecurrenceService::new(
            recurrents.clone(),
            clients.clone(),
            logs.clone(),
            settings,
            gateway.clone(),
        );
        Harness {
            _dir: dir,
            service,
            gateway,
            clients,
            logs,
            recurrents,
        }
    }

    fn maria() -> Client {
        Client {
            id: "c1".to_string(),
            name: "Maria".to_string(),
            phone: "5511999998888".to_string(),
            email: "maria@email.com".to_string(),
            extra: Default::default(),
        }
    }

    fn overdue_once() -> RecurringCharge {
        let mut rc = rule("once");
        rc.due_date = Some(dt(2025, 1, 10, 0, 0, 0));
        rc
    }

    #[tokio::test]
    async fn due_once_item_dispatches_and_completes() {
        let h = harness(FakeGateway::sending()).await;
        h.clients.add(maria()).await.unwrap();
        let now = dt(2025, 1, 10, 0, 0, 0);
        let added = h.service.add(overdue_once(), dt(2025, 1, 5, 0, 0, 0)).await.unwrap();

        let processed = h.service.process_recurrents(now).await.unwrap();
        assert_eq!(processed, 1);

        let item = h.recurrents.get(&added.id).await.unwrap().unwrap();
        assert_eq!(item.status, RecurrenceStatus::Completed);
        assert_eq!(item.next_send_date, None);
        assert_eq!(item.last_sent_date, Some(now));
        assert_eq!(item.last_attempt_status.as_deref(), Some("Enviado"));

        let logs = h.logs.list().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].origin.as_deref(), Some("Recorrente"));
        assert_eq!(logs[0].status.as_deref(), Some("Enviado"));
    }

    #[tokio::test]
    async fn second_sweep_with_the_same_now_is_a_no_op() {
        let h = harness(FakeGateway::sending()).await;
        h.clients.add(maria()).await.unwrap();
        h.service.add(overdue_once(), dt(2025, 1, 5, 0, 0, 0)).await.unwrap();
        let now = dt(2025, 1, 12, 0, 0, 0);

        assert_eq!(h.service.process_recurrents(now).await.unwrap(), 1);
        assert_eq!(h.service.process_recurrents(now).await.unwrap(), 0);
        assert_eq!(h.gateway.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn items_not_yet_due_are_skipped_but_projection_is_saved() {
        let h = harness(FakeGateway::sending()).await;
        h.clients.add(maria()).await.unwrap();
        let added = h.service.add(overdue_once(), dt(2025, 1, 2, 0, 0, 0)).await.unwrap();

        let processed = h.service.process_recurrents(dt(2025, 1, 5, 0, 0, 0)).await.unwrap();
        assert_eq!(processed, 0);
        assert!(h.gateway.calls.lock().await.is_empty());

        let item = h.recurrents.get(&added.id).await.unwrap().unwrap();
        assert_eq!(item.next_send_date, Some(dt(2025, 1, 10, 0, 0, 0)));
        assert_eq!(item.last_sent_date, None);
    }

    #[tokio::test]
    async fn missing_client_logs_an_error_and_keeps_the_item_due() {
        let h = harness(FakeGateway::sending()).await;
        let added = h.service.add(overdue_once(), dt(2025, 1, 5, 0, 0, 0)).await.unwrap();
        let now = dt(2025, 1, 12, 0, 0, 0);

        assert_eq!(h.service.process_recurrents(now).await.unwrap(), 0);
        assert!(h.gateway.calls.lock().await.is_empty());

        let item = h.recurrents.get(&added.id).await.unwrap().unwrap();
        assert_eq!(item.last_sent_date, None);
        assert_eq!(item.last_attempt_status.as_deref(), Some("Erro"));
        assert_eq!(
            item.last_attempt_message.as_deref(),
            Some("Cliente 'Maria' não encontrado para recorrência.")
        );

        // o problema de dado persiste, então cada varredura registra de novo
        h.service.process_recurrents(now).await.unwrap();
        assert_eq!(h.logs.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn gateway_failure_still_consumes_the_occurrence() {
        let h = harness(FakeGateway::failing()).await;
        h.clients.add(maria()).await.unwrap();
        let added = h.service.add(overdue_once(), dt(2025, 1, 5, 0, 0, 0)).await.unwrap();
        let now = dt(2025, 1, 12, 0, 0, 0);

        assert_eq!(h.service.process_recurrents(now).await.unwrap(), 1);

        let item = h.recurrents.get(&added.id).await.unwrap().unwrap();
        assert_eq!(item.status, RecurrenceStatus::Active);
        assert_eq!(item.last_attempt_status.as_deref(), Some("Erro"));
        assert_eq!(item.last_sent_date, Some(now));
        // `once` com falha não reagenda: a tentativa consumiu a ocorrência
        assert_eq!(item.next_send_date, None);

        assert_eq!(h.service.process_recurrents(now).await.unwrap(), 0);
        assert_eq!(h.gateway.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn template_placeholders_are_rendered_with_settings_formats() {
        let h = harness(FakeGateway::sending()).await;
        h.clients.add(maria()).await.unwrap();
        h.service.add(overdue_once(), dt(2025, 1, 5, 0, 0, 0)).await.unwrap();

        h.service.process_recurrents(dt(2025, 1, 12, 0, 0, 0)).await.unwrap();

        let calls = h.gateway.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "5511999998888");
        assert_eq!(calls[0].1, "Maria deve R$ 1.234,50 até 10/01/2025");
    }

    #[tokio::test]
    async fn paused_items_never_dispatch() {
        let h = harness(FakeGateway::sending()).await;
        h.clients.add(maria()).await.unwrap();
        let mut rc = overdue_once();
        rc.status = RecurrenceStatus::Paused;
        let added = h.service.add(rc, dt(2025, 1, 5, 0, 0, 0)).await.unwrap();

        assert_eq!(h.service.process_recurrents(dt(2025, 1, 12, 0, 0, 0)).await.unwrap(), 0);
        assert!(h.gateway.calls.lock().await.is_empty());
        let item = h.recurrents.get(&added.id).await.unwrap().unwrap();
        assert_eq!(item.next_send_date, None);
    }

    #[tokio::test]
    async fn weekly_rule_without_valid_days_never_dispatches() {
        let h = harness(FakeGateway::sending()).await;
        h.clients.add(maria()).await.unwrap();
        let mut rc = rule("weekly");
        rc.recurrence_days_of_week = Some(vec!["monday".into()]);
        rc.start_date = Some(dt(2025, 1, 1, 0, 0, 0));
        h.service.add(rc, dt(2025, 1, 5, 0, 0, 0)).await.unwrap();

        for day in 6..=12 {
            let count = h
                .service
                .process_recurrents(dt(2025, 1, day, 0, 0, 0))
                .await
                .unwrap();
            assert_eq!(count, 0);
        }
        assert!(h.gateway.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn add_resets_history_before_computing_the_projection() {
        let h = harness(FakeGateway::sending()).await;
        let mut rc = overdue_once();
        rc.last_sent_date = Some(dt(2025, 1, 11, 0, 0, 0));
        rc.last_attempt_status = Some("Enviado".to_string());

        let added = h.service.add(rc, dt(2025, 1, 5, 0, 0, 0)).await.unwrap();
        assert_eq!(added.last_sent_date, None);
        assert_eq!(added.last_attempt_status, None);
        assert_eq!(added.next_send_date, Some(dt(2025, 1, 10, 0, 0, 0)));
        assert!(!added.id.is_empty());
    }

    #[tokio::test]
    async fn completed_items_cannot_be_reactivated() {
        let h = harness(FakeGateway::sending()).await;
        h.clients.add(maria()).await.unwrap();
        let added = h.service.add(overdue_once(), dt(2025, 1, 5, 0, 0, 0)).await.unwrap();
        h.service.process_recurrents(dt(2025, 1, 12, 0, 0, 0)).await.unwrap();

        let payload = UpdateRecurringChargePayload {
            client_name: "Maria".to_string(),
            client_phone: None,
            message_template: "x".to_string(),
            value: Decimal::new(10, 0),
            status: Some(RecurrenceStatus::Active),
            recurrence_type: "once".to_string(),
            recurrence_interval: None,
            recurrence_days_of_week: None,
            recurrence_day_of_month: None,
            recurrence_month_of_year: None,
            due_date: None,
            start_date: None,
            end_date: None,
            extra: Map::new(),
        };
        let err = h
            .service
            .update(&added.id, payload, dt(2025, 1, 13, 0, 0, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CompletedIsTerminal));
    }

    #[tokio::test]
    async fn list_recomputed_refreshes_and_persists_the_projection() {
        let h = harness(FakeGateway::sending()).await;
        let mut rc = overdue_once();
        rc.status = RecurrenceStatus::Paused;
        let added = h.service.add(rc, dt(2025, 1, 5, 0, 0, 0)).await.unwrap();
        assert_eq!(added.next_send_date, None);

        // despausa direto no armazenamento e confere que a listagem recalcula
        let mut stored = h.recurrents.get(&added.id).await.unwrap().unwrap();
        stored.status = RecurrenceStatus::Active;
        h.recurrents.put(stored).await.unwrap();

        let listed = h.service.list_recomputed(dt(2025, 1, 5, 0, 0, 0)).await.unwrap();
        assert_eq!(listed[0].next_send_date, Some(dt(2025, 1, 10, 0, 0, 0)));
        let reloaded = h.recurrents.get(&added.id).await.unwrap().unwrap();
        assert_eq!(reloaded.next_send_date, Some(dt(2025, 1, 10, 0, 0, 0)));
    }

    // Gateway que para dentro do `send` até o teste liberar, simulando
    // uma chamada HTTP lenta no meio da varredura.
    struct SlowGateway {
        entered: Arc<tokio::sync::Notify>,
        release: Arc<tokio::sync::Semaphore>,
    }

    #[async_trait]
    impl MessageGateway for SlowGateway {
        async fn send(&self, _phone: &str, _message: &str) -> DispatchOutcome {
            self.entered.notify_one();
            let _permit = self.release.acquire().await.unwrap();
            DispatchOutcome::new(
                DispatchStatus::Sent,
                "Mensagem enviada com sucesso via Z-API.",
            )
        }
    }

    #[tokio::test]
    async fn items_created_during_a_sweep_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let clients = Arc::new(
            JsonClientRepository::open(dir.path().join("clients.json")).await.unwrap(),
        );
        let logs =
            Arc::new(JsonLogRepository::open(dir.path().join("logs.json")).await.unwrap());
        let settings = Arc::new(
            JsonSettingsRepository::open(dir.path().join("settings.json")).await.unwrap(),
        );
        let recurrents = Arc::new(
            JsonRecurrenceRepository::open(dir.path().join("recurring_charges.json"))
                .await
                .unwrap(),
        );
        let entered = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Semaphore::new(0));
        let gateway = Arc::new(SlowGateway {
            entered: entered.clone(),
            release: release.clone(),
        });
        let service = Arc::new(RecurrenceService::new(
            recurrents.clone(),
            clients.clone(),
            logs,
            settings,
            gateway,
        ));

        clients.add(maria()).await.unwrap();
        service.add(overdue_once(), dt(2025, 1, 5, 0, 0, 0)).await.unwrap();

        let sweeper = {
            let service = service.clone();
            tokio::spawn(async move { service.process_recurrents(dt(2025, 1, 12, 0, 0, 0)).await })
        };
        // espera a varredura parar dentro do envio, segurando o lock
        entered.notified().await;

        // criação concorrente: precisa esperar a varredura e sobreviver a ela
        let adder = {
            let service = service.clone();
            tokio::spawn(async move {
                let mut rc = rule("once");
                rc.due_date = Some(dt(2025, 2, 1, 0, 0, 0));
                service.add(rc, dt(2025, 1, 12, 0, 0, 0)).await
            })
        };

        release.add_permits(1);
        assert_eq!(sweeper.await.unwrap().unwrap(), 1);
        let created = adder.await.unwrap().unwrap();

        let items = recurrents.list().await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.id == created.id));
    }
}
