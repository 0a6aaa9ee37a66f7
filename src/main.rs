#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::unreadable_literal)]

use std::sync::{atomic::AtomicBool, Arc};

use serenity::{http::Http, prelude::GatewayIntents, Client};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use crate::{
    common::discord::DiscordGateway,
    database::postgres::{
        entitlements::PostgresEntitlements, giveaway::PostgresGiveaways,
        revocations::PostgresRevocations,
    },
    giveaway::{
        lifecycle::LifecycleController,
        ports::{Collaborators, NoopEntryHook, SystemClock},
    },
    models::config::Config,
};

mod commands;
mod common;
mod database;
mod events;
mod giveaway;
mod models;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Could not load configuration: {err}");
            std::process::exit(1);
        }
    };

    let log_level = if config.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Establishing connection to main database");
    let main_database = match PgPoolOptions::new().connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Could not connect to main database: {}", err);
            return;
        }
    };
    info!("Running outstanding migrations");
    if let Err(err) = sqlx::migrate!().run(&main_database).await {
        error!("Could not run migrations: {}", err);
        return;
    }
    info!("Connected to main database");

    let gateway = Arc::new(DiscordGateway::new(Arc::new(Http::new(&config.discord_token))));
    let collaborators = Collaborators {
        repository: Arc::new(PostgresGiveaways::new(main_database.clone())),
        messaging: gateway.clone(),
        notifications: gateway.clone(),
        eligibility: gateway.clone(),
        entitlements: Arc::new(PostgresEntitlements::new(main_database.clone())),
        roles: gateway,
        entry_hook: Arc::new(NoopEntryHook),
        revocations: Arc::new(PostgresRevocations::new(main_database.clone())),
        clock: Arc::new(SystemClock),
    };

    let handler = models::handler::Handler {
        main_database,
        giveaways: Arc::new(LifecycleController::new(collaborators.clone())),
        collaborators,
        scheduler: config.scheduler,
        scheduler_started: Arc::new(AtomicBool::new(false)),
    };
    let intents = GatewayIntents::non_privileged() | GatewayIntents::GUILD_MEMBERS;
    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
    {
        Ok(client) => client,
        Err(err) => {
            error!("Could not build Discord client: {}", err);
            return;
        }
    };

    if let Err(err) = client.start_autosharded().await {
        error!(
            "Attempted to start giveaway Discord client, but failed with error: {}",
            err
        );
    }
}
