//! Liveness endpoint for external uptime monitors.

use axum::Router;
use axum::routing::get;
use tracing::info;

async fn alive() -> &'static str {
    "Bot is alive!"
}

pub fn router() -> Router {
    Router::new().route("/", get(alive))
}

/// Serve `GET /` until the process exits.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "liveness endpoint listening");
    axum::serve(listener, router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn liveness_route_answers_200_with_the_static_body() {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router()).await.unwrap();
        });

        let response = reqwest::get(format!("http://{addr}/")).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "Bot is alive!");
    }
}
