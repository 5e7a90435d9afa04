use std::fs::File;

use poise::{serenity_prelude as serenity, CreateReply};
use tracing::{error, info, info_span, level_filters::LevelFilter};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use tourney_desk::{config::Config, database::PgDatabase, storage::SupabaseStorage};

use commands::{owner_commands::OwnerCommands, user_commands::UserCommands, CommandsContainer};

use crate::log::discord_log_error;

/// All the commands that the bot can run.
///
/// Additionally, it contains the `CommandsContainer` trait that groups all the commands together.
mod commands;
/// Contains functions for logging to Discord.
mod log;
/// Rendering helpers shared by the commands.
mod utils;

/// Stores data used by the bot.
///
/// Accessible by all bot commands through Context.
#[derive(Debug)]
pub struct Data<DB, S> {
    database: DB,
    storage: S,
    config: Config,
}

impl<DB, S> Data<DB, S> {
    /// Create a new data struct with a given database and object storage.
    fn new(database: DB, storage: S, config: Config) -> Self {
        Self {
            database,
            storage,
            config,
        }
    }
}

/// Convenience type for the bot's data with generics filled in.
pub type BotData = Data<PgDatabase, SupabaseStorage>;

/// A thread-safe Error type used by the bot.
pub type BotError = anyhow::Error;

/// A context that gives the bot information about the action that invoked it.
///
/// It also includes other useful data that the bot uses such as the database.
/// You can access the data in commands by using ``ctx.data()``.
pub type BotContext<'a> = poise::Context<'a, BotData, BotError>;

#[tokio::main]
async fn main() {
    if let Err(e) = setup_tracing() {
        panic!("Error trying to setup tracing: {}", e);
    }

    if let Err(e) = run().await {
        panic!("Error trying to run the bot: {}", e);
    }
}

/// The main function that runs the bot.
async fn run() -> Result<(), BotError> {
    let config = {
        let setup_span = info_span!("bot_setup");
        let _guard = setup_span.enter();
        let config = Config::from_env()?;
        info!("Successfully loaded the configuration");
        config
    };

    let pg_database = PgDatabase::connect(&config.database_url).await?;
    pg_database.migrate().await?;
    info!("Database is up to date");

    let storage = SupabaseStorage::new(&config.storage);
    let discord_token = config.discord_token.clone();

    let commands: Vec<_> = vec![
        OwnerCommands::get_commands_list(),
        UserCommands::get_commands_list(),
    ]
    .into_iter()
    .flatten()
    .collect();
    commands.iter().for_each(|c| info!("Command: {}", c.name));

    let intents = serenity::GatewayIntents::non_privileged();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Ready as {}", ready.user.name);
                Ok(Data::new(pg_database, storage, config))
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(discord_token, intents)
        .framework(framework)
        .await?;

    client.start().await?;

    Ok(())
}

/// Replies with a generic message and reports the error to the log channel.
async fn on_error(error: poise::FrameworkError<'_, BotData, BotError>) {
    let error_msg = match &error {
        poise::FrameworkError::GuildOnly { .. } => return,
        poise::FrameworkError::UnknownCommand { .. } => return,
        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
            if let Err(e) = ctx
                .send(
                    CreateReply::default()
                        .content("Only tournament owners can use this command.")
                        .ephemeral(true),
                )
                .await
            {
                error!("Error sending permission message to user: {}", e);
            }
            return;
        }
        poise::FrameworkError::Setup { error, .. } => format!("{:#}", error),
        poise::FrameworkError::Command { error, .. } => format!("{:#}", error),
        poise::FrameworkError::ArgumentParse { error, .. } => format!("{}", error),
        _ => "No cause available for this error type.".to_string(),
    };
    error!("Error in command: {}", error_msg);

    let ctx = match error.ctx() {
        Some(ctx) => ctx,
        None => {
            error!("No context in this error");
            return;
        }
    };

    if let Err(e) = ctx
        .send(
            CreateReply::default()
                .content("Something went wrong. Please try again, and let the organisers know if the issue persists.")
                .ephemeral(true),
        )
        .await
    {
        error!("Error sending generic error message to user: {}", e);
    }

    let user_field = format!("<@{}>", ctx.author().id);
    let command_field = format!("/{}", ctx.command().qualified_name);
    let fields = vec![
        ("Cause", error_msg.as_str(), false),
        ("User", user_field.as_str(), false),
        ("Command", command_field.as_str(), false),
    ];

    discord_log_error(ctx, &error.to_string(), fields)
        .await
        .unwrap_or_else(|e| error!("Error sending error message to log channel: {:?}", e));
}

/// Sets up the tracing subscriber for the bot.
fn setup_tracing() -> Result<(), BotError> {
    if cfg!(debug_assertions) {
        let filter = EnvFilter::from_default_env()
            .add_directive("none".parse()?)
            .add_directive("tourney_desk=info".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::NONE)
            .pretty()
            .init();

        return Ok(());
    }

    let log_file = File::create("debug.log")?;

    // Set up tracing with a filter that only logs errors in production
    tracing_subscriber::fmt::fmt()
        .with_span_events(FmtSpan::NONE)
        .with_max_level(LevelFilter::ERROR)
        .with_writer(log_file)
        .pretty()
        .init();

    Ok(())
}
