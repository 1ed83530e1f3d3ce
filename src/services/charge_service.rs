// src/services/charge_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    common::validation::{is_valid_email, is_valid_phone_number},
    db::{ChargeRepository, ClientRepository},
};

pub const CONTACT_INVALID_MSG: &str = "Dados de contato do cliente inválidos na base.";
pub const CLIENT_MISSING_MSG: &str = "Cliente não encontrado na base de clientes.";

/// Reconciliação das cobranças avulsas com a base de clientes: refresca
/// telefone/e-mail, revalida o contato e marca/desmarca o estado de
/// "cliente não encontrado".
pub struct ChargeService {
    charges: Arc<dyn ChargeRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl ChargeService {
    pub fn new(charges: Arc<dyn ChargeRepository>, clients: Arc<dyn ClientRepository>) -> Self {
        Self { charges, clients }
    }

    /// Retorna quantas cobranças foram alteradas nesta sincronização.
    pub async fn sync_charges_with_clients(&self) -> Result<usize, AppError> {
        let clients = self.clients.list().await?;
        let mut charges = self.charges.list().await?;
        let mut updated = 0usize;

        for charge in charges.iter_mut() {
            match clients.iter().find(|c| c.name == charge.client_name) {
                Some(client) => {
                    let contact_stale = charge.client_phone != client.phone
                        || charge.client_email != client.email
                        || charge.import_error.as_deref() == Some(CONTACT_INVALID_MSG);
                    if contact_stale {
                        charge.client_phone = client.phone.clone();
                        charge.client_email = client.email.clone();
                        if is_valid_phone_number(&charge.client_phone)
                            && is_valid_email(&charge.client_email)
                        {
                            charge.send_status = Some("Pendente".to_string());
                            charge.whatsapp_status = Some("Aguardando Envio".to_string());
                            charge.import_error = Some(String::new());
                        } else {
                            charge.send_status = Some("Erro".to_string());
                            charge.whatsapp_status = Some("Telefone Inválido".to_string());
                            charge.import_error = Some(CONTACT_INVALID_MSG.to_string());
                        }
                        updated += 1;
                    }
                    // cliente voltou a existir: limpa a marcação de ausência
                    if charge.import_error.as_deref() == Some(CLIENT_MISSING_MSG) {
                        charge.client_found = Some(true);
                        charge.send_status = Some("Pendente".to_string());
                        charge.whatsapp_status = Some("Aguardando Envio".to_string());
                        charge.import_error = Some(String::new());
                        updated += 1;
                    }
                }
                None => {
                    let already_flagged = !charge.client_found.unwrap_or(false)
                        && charge.import_error.as_deref() == Some(CLIENT_MISSING_MSG);
                    if !already_flagged {
                        charge.client_found = Some(false);
                        charge.send_status = Some("Erro".to_string());
                        charge.whatsapp_status = Some("Cliente Não Encontrado".to_string());
                        charge.import_error = Some(CLIENT_MISSING_MSG.to_string());
                        updated += 1;
                    }
                }
            }
        }

        self.charges.replace_all(charges).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{JsonChargeRepository, JsonClientRepository};
    use crate::models::{Charge, Client};

    struct Harness {
        _dir: tempfile::TempDir,
        service: ChargeService,
        charges: Arc<JsonChargeRepository>,
        clients: Arc<JsonClientRepository>,
    }

    async fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let charges = Arc::new(
            JsonChargeRepository::open(dir.path().join("charges.json")).await.unwrap(),
        );
        let clients = Arc::new(
            JsonClientRepository::open(dir.path().join("clients.json")).await.unwrap(),
        );
        let service = ChargeService::new(charges.clone(), clients.clone());
        Harness {
            _dir: dir,
            service,
            charges,
            clients,
        }
    }

    fn client(name: &str, phone: &str, email: &str) -> Client {
        Client {
            id: String::new(),
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            extra: Default::default(),
        }
    }

    fn charge_for(name: &str) -> Charge {
        Charge {
            id: String::new(),
            client_name: name.to_string(),
            client_phone: "5511900000000".to_string(),
            client_email: "antigo@email.com".to_string(),
            competence: Some("01/2025".to_string()),
            due_date: None,
            value: None,
            send_status: None,
            whatsapp_status: None,
            import_error: None,
            client_found: Some(true),
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn stale_contact_is_refreshed_and_revalidated() {
        let h = harness().await;
        h.clients
            .add(client("Maria", "5511999998888", "maria@email.com"))
            .await
            .unwrap();
        h.charges.add(charge_for("Maria")).await.unwrap();

        assert_eq!(h.service.sync_charges_with_clients().await.unwrap(), 1);

        let charges = h.charges.list().await.unwrap();
        assert_eq!(charges[0].client_phone, "5511999998888");
        assert_eq!(charges[0].client_email, "maria@email.com");
        assert_eq!(charges[0].send_status.as_deref(), Some("Pendente"));
        assert_eq!(charges[0].whatsapp_status.as_deref(), Some("Aguardando Envio"));

        // já sincronizada: a segunda passada não altera nada
        assert_eq!(h.service.sync_charges_with_clients().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn invalid_contact_data_is_flagged() {
        let h = harness().await;
        h.clients.add(client("Maria", "123", "sem-arroba")).await.unwrap();
        h.charges.add(charge_for("Maria")).await.unwrap();

        assert_eq!(h.service.sync_charges_with_clients().await.unwrap(), 1);

        let charges = h.charges.list().await.unwrap();
        assert_eq!(charges[0].send_status.as_deref(), Some("Erro"));
        assert_eq!(charges[0].whatsapp_status.as_deref(), Some("Telefone Inválido"));
        assert_eq!(charges[0].import_error.as_deref(), Some(CONTACT_INVALID_MSG));
    }

    #[tokio::test]
    async fn missing_client_is_flagged_once_and_cleared_when_restored() {
        let h = harness().await;
        h.charges.add(charge_for("Maria")).await.unwrap();

        assert_eq!(h.service.sync_charges_with_clients().await.unwrap(), 1);
        let charges = h.charges.list().await.unwrap();
        assert_eq!(charges[0].client_found, Some(false));
        assert_eq!(charges[0].whatsapp_status.as_deref(), Some("Cliente Não Encontrado"));
        assert_eq!(charges[0].import_error.as_deref(), Some(CLIENT_MISSING_MSG));

        // já marcada: não conta de novo
        assert_eq!(h.service.sync_charges_with_clients().await.unwrap(), 0);

        // cliente cadastrado depois, com o mesmo contato: a marcação é desfeita
        h.clients
            .add(client("Maria", "5511900000000", "antigo@email.com"))
            .await
            .unwrap();
        assert_eq!(h.service.sync_charges_with_clients().await.unwrap(), 1);
        let charges = h.charges.list().await.unwrap();
        assert_eq!(charges[0].client_found, Some(true));
        assert_eq!(charges[0].send_status.as_deref(), Some("Pendente"));
        assert_eq!(charges[0].import_error.as_deref(), Some(""));
    }
}
