// src/models/auth.rs

use serde::{Deserialize, Serialize};

/// Claims do token emitido pelo provedor de identidade externo.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

/// Usuário autenticado, inserido nas extensions da requisição pelo guard.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
}
