// File: crates/services/pixify_backend/src/main.rs
use axum::{routing::get, Router};
use pixify_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod app_state;

use app_state::AppState;

#[tokio::main]
async fn main() {
    pixify_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let state = AppState::init(config.clone())
        .await
        .expect("Failed to initialize application state");

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Pixify API!" }))
        .merge(pixify_users::routes(state.users.clone()));

    let api_router = {
        let mut router = api_router;
        if let Some(generation) = &state.generation {
            router = router.merge(pixify_generation::routes(generation.clone()));
        }
        if let Some(checkout) = &state.checkout {
            router = router.merge(pixify_checkout::routes(checkout.clone()));
        }
        router
    };

    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use pixify_checkout::doc::CheckoutApiDoc;
        use pixify_generation::doc::GenerationApiDoc;
        use pixify_users::doc::UsersApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Pixify API",
                version = "0.1.0",
                description = "Pixify image generation service API docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Pixify", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(UsersApiDoc::openapi());
        openapi_doc.merge(GenerationApiDoc::openapi());
        openapi_doc.merge(CheckoutApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
