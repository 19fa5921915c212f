mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::{AuthService, PgRevokedTokenStore, TokenService};
use crate::features::auth::JwtValidator;
use crate::features::authorities::{
    routes as authorities_routes, AuthorityRepository, PgAuthorityRepository,
};
use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
use crate::features::dispatch::{DispatchService, DispatchWorker, OpenAiClassifier};
use crate::features::reports::{
    routes as reports_routes, PgReportRepository, ReportEventBus, ReportRepository, ReportService,
};
use crate::features::users::{PgUserRepository, UserRepository, UserService};
use crate::modules::storage::MinIOClient;
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Buffered report change events per stats subscriber
const REPORT_EVENT_CAPACITY: usize = 256;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Repositories
    let user_repository: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let report_repository: Arc<dyn ReportRepository> =
        Arc::new(PgReportRepository::new(pool.clone()));
    let authority_repository: Arc<dyn AuthorityRepository> =
        Arc::new(PgAuthorityRepository::new(pool.clone()));
    let revoked_tokens = Arc::new(PgRevokedTokenStore::new(pool.clone()));

    // Auth
    let jwt_validator = Arc::new(JwtValidator::new(
        &config.auth.jwt_secret,
        config.auth.issuer.clone(),
        config.auth.jwt_leeway,
        revoked_tokens.clone(),
    ));
    let token_service = Arc::new(TokenService::new(
        &config.auth.jwt_secret,
        config.auth.issuer.clone(),
        config.auth.access_token_ttl,
    ));
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repository),
        token_service,
        revoked_tokens,
        config.auth.authority_emails.clone(),
    ));
    tracing::info!(
        "Auth initialized (issuer: {}, {} authority email(s))",
        config.auth.issuer,
        config.auth.authority_emails.len()
    );

    // Object storage
    let storage = Arc::new(
        MinIOClient::new(config.minio.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?,
    );
    tracing::info!("MinIO client initialized");

    // Reports and the event bus feeding dispatch and the stats stream
    let (report_events, dispatch_rx) = ReportEventBus::new(REPORT_EVENT_CAPACITY);
    let report_events = Arc::new(report_events);
    let report_service = Arc::new(ReportService::new(
        Arc::clone(&report_repository),
        storage,
        Arc::clone(&report_events),
    ));
    tracing::info!("Report service initialized");

    let user_service = Arc::new(UserService::new(Arc::clone(&user_repository)));
    let dashboard_service = Arc::new(DashboardService::new(
        Arc::clone(&report_repository),
        user_service,
        Arc::clone(&report_events),
        config.dashboard.clone(),
    ));
    tracing::info!("Dashboard service initialized");

    // Dispatch worker
    match config.classifier.api_key.clone() {
        Some(api_key) => {
            let classifier = Arc::new(OpenAiClassifier::new(&config.classifier, api_key)?);
            let dispatch_service = Arc::new(DispatchService::new(
                Arc::clone(&report_repository),
                Arc::clone(&authority_repository),
                classifier,
            ));
            let worker = DispatchWorker::new(dispatch_service, dispatch_rx);
            tokio::spawn(worker.run());
            tracing::info!(
                "Dispatch worker started (model: {})",
                config.classifier.model
            );
        }
        None => {
            drop(dispatch_rx);
            tracing::warn!(
                "OPENAI_API_KEY not set; dispatch worker disabled, new reports stay awaiting classification"
            );
        }
    }

    // Apply config to OpenAPI
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(reports_routes::routes(report_service))
        .merge(authorities_routes::routes(authority_repository))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Public dashboard; a valid bearer token is attached when present
    let dashboard = dashboard_routes::routes(dashboard_service).route_layer(
        axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::optional_auth_middleware,
        ),
    );

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let public_routes = Router::new()
        .merge(auth_routes::public_routes(auth_service))
        .merge(dashboard);

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
