// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Clientes ---
        handlers::clients::list_clients,
        handlers::clients::add_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::clear_clients,

        // --- Cobranças ---
        handlers::charges::list_charges,
        handlers::charges::add_charge,
        handlers::charges::update_charge,
        handlers::charges::delete_charge,
        handlers::charges::clear_charges,
        handlers::charges::sync_charges_with_clients,

        // --- Logs ---
        handlers::logs::list_logs,
        handlers::logs::add_log,
        handlers::logs::clear_logs,

        // --- Configurações ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::settings::clear_all_data,

        // --- Recorrências ---
        handlers::recurrences::list_recurring_charges,
        handlers::recurrences::add_recurring_charge,
        handlers::recurrences::update_recurring_charge,
        handlers::recurrences::delete_recurring_charge,
        handlers::recurrences::clear_recurring_charges,
        handlers::recurrences::process_recurring_charges,

        // --- Mensagens ---
        handlers::messaging::send_whatsapp,

        // --- Painel ---
        handlers::painel::painel,
    ),
    components(
        schemas(
            models::Client,
            models::client::UpdateClientPayload,
            models::Charge,
            models::charge::UpdateChargePayload,
            models::LogEntry,
            models::Settings,
            models::settings::UpdateSettingsPayload,
            models::RecurringCharge,
            models::recurrence::UpdateRecurringChargePayload,
            models::RecurrenceStatus,
            handlers::messaging::SendWhatsappPayload,
            gateway::DispatchOutcome,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Clientes", description = "Cadastro de clientes"),
        (name = "Cobranças", description = "Cobranças avulsas e sincronização"),
        (name = "Logs", description = "Log de auditoria de envios"),
        (name = "Configurações", description = "Configurações globais e limpeza de dados"),
        (name = "Recorrências", description = "Motor de cobranças recorrentes"),
        (name = "Mensagens", description = "Envio manual via Z-API"),
        (name = "Painel", description = "Área autenticada")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "painel_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
