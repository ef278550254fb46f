//! Core library of the *RSVP Management Service*
//!
//! # Example
//!
//! ```no_run
//! use rsvp_service_core::Controller;
//! use anyhow::Result;
//!
//! #[actix_web::main]
//! async fn main()  {
//!     rsvp_service_core::try_or_exit(run()).await;
//! }
//!
//! async fn run() -> Result<()> {
//!    if let Some(controller) = Controller::create("RSVP Management Service").await? {
//!         controller.run().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::api::v1::response::json_error_handler;
use crate::rabbitmq::RabbitMqConnection;
use crate::services::{EventSync, NotificationService};
use crate::settings::{Settings, SharedSettings};
use crate::token::TokenService;
use crate::trace::RequestSpanBuilder;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer, Scope};
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use database::Db;
use event_client::EventServiceClient;
use std::net::Ipv6Addr;
use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tracing_actix_web::TracingLogger;

#[cfg(not(doc))]
mod api;
#[cfg(doc)]
pub mod api;

mod cli;
mod rabbitmq;
mod services;
mod token;
mod trace;

pub mod settings;

#[derive(Debug, thiserror::Error)]
#[error("Blocking task panicked or was cancelled")]
pub struct BlockingError;

/// Like [`actix_web::web::block`] but keeps the callers tracing span entered
pub async fn block<F, R>(f: F) -> Result<R, BlockingError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let span = tracing::Span::current();

    actix_rt::task::spawn_blocking(move || span.in_scope(f))
        .await
        .map_err(|_| BlockingError)
}

/// Awaits `f` and exits the process when it fails
///
/// The error goes to the installed logger when there is one, to stderr
/// otherwise.
pub async fn try_or_exit<T, F>(f: F) -> T
where
    F: std::future::Future<Output = Result<T>>,
{
    match f.await {
        Ok(ok) => ok,
        Err(err) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("Service crashed: {:?}", err);
            } else {
                eprintln!("Service crashed: {err:?}");
            }

            std::process::exit(-1);
        }
    }
}

/// Controller struct representation containing all fields required to drive the service
pub struct Controller {
    /// Settings loaded during [`Controller::create`], used for everything that
    /// cannot change at runtime
    pub startup_settings: Arc<Settings>,

    /// Shared settings behind a swap, replaced when a reload signal arrives
    pub shared_settings: SharedSettings,

    /// Parsed command line
    args: cli::Args,

    db: Arc<Db>,

    /// Client for the event owning service
    event_client: EventServiceClient,

    /// Issues and verifies the access tokens of this service
    token_service: TokenService,

    /// Connection owning [`Self::rabbitmq_channel`]
    rabbitmq: RabbitMqConnection,

    /// Publish channel handed to the notification service
    pub rabbitmq_channel: lapin::Channel,
}

impl Controller {
    /// Creates the controller from the command line and the settings file
    ///
    /// Returns `Ok(None)` when the invocation ran a subcommand (e.g.
    /// `migrate-db`) instead of the long running service, the caller must
    /// exit in that case. Otherwise the result is started with
    /// [`Controller::run`].
    pub async fn create(program_name: &str) -> Result<Option<Self>> {
        let args = cli::parse_args().await?;

        // subcommands have already run at this point and the process exits
        if !args.service_should_start() {
            return Ok(None);
        }

        let settings = settings::load_settings(&args)?;

        trace::init(&settings.logging)?;

        log::info!("Starting {}", program_name);

        let controller = Self::init(settings, args).await?;

        Ok(Some(controller))
    }

    #[tracing::instrument(err, skip(settings, args))]
    async fn init(settings: Settings, args: cli::Args) -> Result<Self> {
        let settings = Arc::new(settings);
        let shared_settings: SharedSettings = Arc::new(ArcSwap::from(settings.clone()));

        db_storage::migrations::migrate_from_url(&settings.database.url)
            .await
            .context("Database migration failed")?;

        let rabbitmq = RabbitMqConnection::connect(&settings.rabbit_mq.url).await?;

        // publish channel shared by all request handlers
        let rabbitmq_channel = rabbitmq
            .create_channel()
            .await
            .context("Unable to create the RabbitMQ publish channel")?;

        let db = Arc::new(
            Db::connect_url(
                &settings.database.url,
                settings.database.max_connections,
                Some(settings.database.min_idle_connections),
            )
            .context("Unable to connect to the database")?,
        );

        let event_client = EventServiceClient::new(
            reqwest::Client::new(),
            settings.event_service.base_url.clone(),
        )
        .context("Unable to create the event service client")?;

        let token_service = TokenService::new(&settings.auth.token_secret);

        Ok(Self {
            startup_settings: settings,
            shared_settings,
            args,
            db,
            event_client,
            token_service,
            rabbitmq,
            rabbitmq_channel,
        })
    }

    /// Runs the service until a fatal error occurs or a shutdown is requested (e.g. SIGTERM)
    pub async fn run(self) -> Result<()> {
        let http_server = {
            let cors = self.startup_settings.http.cors.clone();

            let db = Arc::downgrade(&self.db);
            let schema = Data::new(api::graphql::build_schema(self.db.clone()));

            let token_service = self.token_service.clone();

            let event_sync = Data::new(EventSync::new(
                self.event_client.clone(),
                self.startup_settings.event_service.token.clone(),
            ));

            let notifier = Data::new(NotificationService::new(
                self.shared_settings.clone(),
                self.rabbitmq_channel.clone(),
            ));

            HttpServer::new(move || {
                let cors = setup_cors(&cors);

                // upgrade cannot fail while the server runs, the controller keeps the Arc alive
                let db = Data::from(db.upgrade().unwrap());

                let schema = schema.clone();
                let event_sync = event_sync.clone();
                let notifier = notifier.clone();

                App::new()
                    .wrap(TracingLogger::<RequestSpanBuilder>::new())
                    .wrap(cors)
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(db)
                    .app_data(schema)
                    .app_data(Data::new(token_service.clone()))
                    .app_data(event_sync)
                    .app_data(notifier)
                    .service(api_scope(token_service.clone()))
            })
        };

        let address = (Ipv6Addr::UNSPECIFIED, self.startup_settings.http.port);

        let http_server = http_server.bind(address).with_context(|| {
            format!("Unable to bind the HTTP server to {}:{}", address.0, address.1)
        })?;

        log::info!("Startup finished");

        let http_server = http_server.disable_signals().run();
        let http_server_handle = http_server.handle();

        let mut reload_signal =
            signal(SignalKind::hangup()).context("Unable to register the SIGHUP handler")?;

        actix_rt::spawn(http_server);

        // run until termination, reloading the settings on SIGHUP
        loop {
            tokio::select! {
                _ = ctrl_c() => {
                    log::info!("Received termination signal, shutting down");
                    break;
                }
                _ = reload_signal.recv() => {
                    log::info!("Received reload signal, reloading settings");

                    if let Err(e) = settings::reload_settings(self.shared_settings.clone(), &self.args.config) {
                        log::error!("Settings reload failed, {}", e);
                    }
                }
            }
        }

        http_server_handle.stop(true).await;

        // TODO pick a proper AMQP reply code and text for the shutdown
        if let Err(e) = self.rabbitmq.close(0, "shutting down").await {
            log::error!("Unable to close the RabbitMQ connection, {}", e);
        }

        log::info!("Shutdown complete");

        Ok(())
    }
}

fn api_scope(token_service: TokenService) -> Scope {
    web::scope("")
        .service(api::v1::welcome)
        .service(api::v1::auth::callback)
        .service(api::graphql::endpoint)
        .service(
            // nested scope so the token middleware only guards the RSVP routes
            web::scope("")
                .wrap(api::v1::middleware::token_auth::TokenAuth { token_service })
                .service(api::v1::rsvps::create_rsvp)
                .service(api::v1::rsvps::list_rsvps)
                .service(api::v1::rsvps::get_rsvp)
                .service(api::v1::rsvps::update_rsvp)
                .service(api::v1::rsvps::delete_rsvp),
        )
}

fn setup_cors(settings: &settings::HttpCors) -> Cors {
    let mut cors = Cors::default();

    for origin in &settings.allowed_origin {
        cors = cors.allowed_origin(origin)
    }

    cors.allowed_header(header::CONTENT_TYPE)
        .allowed_header(header::AUTHORIZATION)
        .allow_any_method()
}
