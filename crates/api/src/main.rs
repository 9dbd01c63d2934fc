use scf_infra::{Engine, EngineConfig};

const ENV_BIND_ADDR: &str = "SCF_BIND_ADDR";

#[tokio::main]
async fn main() {
    scf_observability::init();

    let bind_addr = std::env::var(ENV_BIND_ADDR).unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let engine = Engine::in_memory(EngineConfig::from_env());
    match engine.journal.initialize_chart_of_accounts() {
        Ok(created) => tracing::info!(created, "chart of accounts ready"),
        Err(e) => {
            tracing::error!(error = %e, "failed to seed chart of accounts");
            std::process::exit(1);
        }
    }

    let app = scf_api::app::build_app(engine);

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %bind_addr, "failed to bind");
            std::process::exit(1);
        }
    };

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on {addr}");
    }

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server terminated");
        std::process::exit(1);
    }
}
