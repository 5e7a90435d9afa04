use std::time::SystemTime;

use poise::serenity_prelude::{ChannelId, Color, CreateEmbed, CreateMessage};
use tracing::{error, info};

use crate::{BotContext, BotError};

fn now_string() -> String {
    format!(
        "<t:{}:F>",
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    )
}

fn log_channel(ctx: &BotContext<'_>) -> Option<ChannelId> {
    ctx.data().config.log_channel_id.map(ChannelId::new)
}

/// Creates an info log message in the designated log channel, if one is configured.
///
/// The action being logged has already happened, so a failed post is only traced.
pub async fn discord_log_info(ctx: BotContext<'_>, title: &str, fields: Vec<(&str, &str, bool)>) {
    info!("ℹ️ {}\n\n{:#?}", title, fields);

    send_info(ctx, title, fields)
        .await
        .unwrap_or_else(|e| error!("Error sending info log \"{}\" to log channel: {:#}", title, e));
}

async fn send_info(
    ctx: BotContext<'_>,
    title: &str,
    fields: Vec<(&str, &str, bool)>,
) -> Result<(), BotError> {
    let Some(log_channel) = log_channel(&ctx) else {
        return Ok(());
    };

    let now_string = now_string();
    let user_field = format!("<@{}>", ctx.author().id);
    let mut fields = fields;
    fields.push(("By", &user_field, false));
    fields.push(("Happened at", &now_string, false));

    log_channel
        .send_message(
            ctx,
            CreateMessage::default().content("").embed(
                CreateEmbed::new()
                    .title(format!("ℹ️ {}", title))
                    .fields(fields)
                    .color(Color::BLURPLE),
            ),
        )
        .await?;

    Ok(())
}

/// Creates an error log message in the designated log channel, if one is configured.
pub async fn discord_log_error(
    ctx: BotContext<'_>,
    title: &str,
    fields: Vec<(&str, &str, bool)>,
) -> Result<(), BotError> {
    let Some(log_channel) = log_channel(&ctx) else {
        return Ok(());
    };

    let now_string = now_string();
    let mut fields = fields;
    fields.push(("Seen at", &now_string, false));

    log_channel
        .send_message(
            ctx,
            CreateMessage::default()
                .content("⚠️ An error occured in a command!")
                .embed(
                    CreateEmbed::new()
                        .title(title)
                        .description("Please check the logs for more information.")
                        .fields(fields)
                        .color(Color::RED),
                ),
        )
        .await?;

    Ok(())
}
