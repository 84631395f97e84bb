#[cfg(not(target_arch = "wasm32"))]
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dronesim_web_lib=info,dronesim_core=info".into()),
        )
        .with_target(false)
        .init();
}

#[cfg(target_arch = "wasm32")]
fn init_tracing() {}

#[macroquad::main("Drone Simulator")]
async fn main() {
    init_tracing();
    dronesim_web_lib::run().await;
}
