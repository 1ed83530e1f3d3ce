//src/main.rs

use std::time::Duration;

use axum::http::HeaderValue;
use chrono::Local;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use konty_backend::{
    build_router,
    config::{AppState, Config},
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env().expect("Falha ao carregar a configuração do ambiente.");
    let app_state = AppState::new(&config)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Timer opcional da varredura de recorrências; a rota
    // /api/process_recurring_charges continua disponível de qualquer forma.
    if config.sweep_interval_secs > 0 {
        let service = app_state.recurrence_service.clone();
        let secs = config.sweep_interval_secs;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(secs));
            // o primeiro tick dispara imediatamente; pula para respeitar o intervalo
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let now = Local::now().naive_local();
                if let Err(e) = service.process_recurrents(now).await {
                    tracing::error!("Falha na varredura periódica de recorrências: {}", e);
                }
            }
        });
        tracing::info!("⏰ Varredura periódica habilitada a cada {}s", secs);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
