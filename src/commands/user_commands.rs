use std::time::Duration;

use poise::{
    serenity_prelude::{
        self as serenity, ButtonStyle, Colour, CreateActionRow, CreateButton,
        CreateEmbed, CreateInputText, CreateQuickModal, InputTextStyle,
    },
    CreateReply,
};
use prettytable::{row, Table};
use tracing::{error, info, instrument};

use tourney_desk::{
    error::SubmissionError,
    listing::ListView,
    registration::{ImageUpload, InputKind, Step, StepController, SubmissionCoordinator},
};

use crate::{
    log::discord_log_info,
    utils::{next_within, table_message},
    BotContext, BotData, BotError,
};

use super::CommandsContainer;

/// CommandsContainer for the User commands
pub struct UserCommands;

impl CommandsContainer for UserCommands {
    type Data = BotData;
    type Error = BotError;

    fn get_commands_list() -> Vec<poise::Command<Self::Data, Self::Error>> {
        vec![register(), registered_players()]
    }
}

/// How long the registration wizard waits for the next click before giving up.
///
/// Every click restarts the wait.
const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(300);

const MAX_PHONE_LENGTH: u16 = 15;

const FILL_IN: &str = "register_fill_in";
const NEXT: &str = "register_next";
const BACK: &str = "register_back";
const REMOVE_IMAGE: &str = "register_remove_image";
const SUBMIT: &str = "register_submit";

/// Register yourself as a player for the tournament.
///
/// Attach a picture with the `image` option to have it shown on your player card.
#[poise::command(slash_command, guild_only)]
#[instrument(skip(image))]
async fn register(
    ctx: BotContext<'_>,
    #[description = "A picture of you for your player card"] image: Option<serenity::Attachment>,
) -> Result<(), BotError> {
    info!("User {} has started registration", ctx.author().name);

    let mut controller = StepController::new();

    if let Some(attachment) = image {
        let mut upload = match ImageUpload::new(
            attachment.filename.clone(),
            attachment.content_type.as_deref(),
            Vec::new(),
            Some(attachment.url.clone()),
        ) {
            Ok(upload) => upload,
            Err(e) => {
                ctx.send(
                    CreateReply::default()
                        .content(e.to_string())
                        .ephemeral(true),
                )
                .await?;
                return Ok(());
            }
        };
        upload.bytes = attachment.download().await?;
        controller.attach_image(upload);
    }

    let msg = ctx.send(wizard_reply(&controller, None)).await?;

    let mut interaction_collector = Box::pin(
        msg.clone()
            .into_message()
            .await?
            .await_component_interaction(&ctx.serenity_context().shard)
            .stream(),
    );

    while let Some(interaction) =
        next_within(&mut interaction_collector, REGISTRATION_TIMEOUT).await
    {
        let notice = match interaction.data.custom_id.as_str() {
            FILL_IN => {
                let inputs = controller.inputs();
                if inputs.is_empty() {
                    interaction.defer(ctx).await?;
                    continue;
                }
                let modal = inputs.iter().enumerate().fold(
                    CreateQuickModal::new(controller.step().to_string())
                        .timeout(REGISTRATION_TIMEOUT),
                    |modal, (i, input)| {
                        let mut text = CreateInputText::new(
                            InputTextStyle::Short,
                            input.label,
                            format!("register_input_{}", i),
                        )
                        .placeholder(input.placeholder)
                        .value(input.value.clone())
                        .required(false);
                        if input.kind == InputKind::Phone {
                            text = text.max_length(MAX_PHONE_LENGTH);
                        }
                        modal.field(text)
                    },
                );

                let Some(response) = interaction.quick_modal(ctx.serenity_context(), modal).await?
                else {
                    continue;
                };
                response.interaction.defer(ctx).await?;

                for (input, value) in inputs.iter().zip(response.inputs.iter()) {
                    controller.apply(input.edit(value.trim()));
                }
                None
            }
            NEXT => {
                interaction.defer(ctx).await?;
                let missing = controller.draft().missing_fields(controller.step());
                if missing.is_empty() {
                    controller.advance();
                    None
                } else {
                    let labels: Vec<_> = missing.iter().map(|field| field.label()).collect();
                    Some(format!("Please fill in: {}", labels.join(", ")))
                }
            }
            BACK => {
                interaction.defer(ctx).await?;
                controller.retreat();
                None
            }
            REMOVE_IMAGE => {
                interaction.defer(ctx).await?;
                controller.remove_image();
                None
            }
            SUBMIT => {
                interaction.defer(ctx).await?;
                msg.edit(
                    ctx,
                    CreateReply::default()
                        .content("Registering you for the tournament...")
                        .components(vec![]),
                )
                .await?;

                let data = ctx.data();
                let coordinator = SubmissionCoordinator::new(
                    &data.database,
                    &data.storage,
                    &data.config.storage.player_folder,
                );

                match controller.submit(&coordinator).await {
                    Ok(record) => {
                        let picture = record.image_url.as_deref().unwrap_or("None");
                        discord_log_info(
                            ctx,
                            "Player registered",
                            vec![("Name", record.name.as_str(), true), ("Picture", picture, true)],
                        )
                        .await;
                        None
                    }
                    Err(SubmissionError::Validation(e)) => Some(e.to_string()),
                    Err(SubmissionError::Gateway(e)) => {
                        error!("Failed to register {}: {:#}", ctx.author().name, e);
                        Some("Failed to register. Please try again.".to_string())
                    }
                }
            }
            _ => continue,
        };

        msg.edit(ctx, wizard_reply(&controller, notice)).await?;

        if controller.is_submitted() {
            return Ok(());
        }
    }

    msg.edit(
        ctx,
        CreateReply::default()
            .content("")
            .embed(
                CreateEmbed::new()
                    .title("⌛ Registration timed out")
                    .description("Nothing was saved. Run /register again to start over.")
                    .colour(Colour::DARK_GREY),
            )
            .components(vec![]),
    )
    .await?;

    Ok(())
}

/// Renders the wizard for the step the player is on.
fn wizard_reply(controller: &StepController, notice: Option<String>) -> CreateReply {
    let step = controller.step();
    let draft = controller.draft();

    if step == Step::Submitted {
        return CreateReply::default()
            .content("")
            .embed(
                CreateEmbed::new()
                    .title("✅ Registration Complete!")
                    .description(format!(
                        "Get ready for the tournament, {}!",
                        draft.player_name
                    ))
                    .colour(Colour::DARK_GREEN),
            )
            .components(vec![])
            .ephemeral(true);
    }

    let current = step.number().unwrap_or(3);
    let progress: String = (1..=3)
        .map(|i| if i <= current { "🟣" } else { "⚫" })
        .collect();

    let show = |value: &str| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };

    let mut embed = CreateEmbed::new()
        .title("🏆 Tournament Registration")
        .description(format!("{}\n**{}**", progress, step))
        .fields(vec![
            ("Player Name", show(&draft.player_name), true),
            ("Mobile Number", show(&draft.mobile_number), true),
            ("Tournament Code", show(&draft.tournament_code), true),
        ])
        .colour(Colour::PURPLE);

    if step == Step::Picture {
        match &draft.image {
            Some(image) => {
                embed = embed.field("Picture", &image.file_name, false);
                if let Some(preview_url) = &image.preview_url {
                    embed = embed.image(preview_url);
                }
            }
            None => {
                embed = embed.field(
                    "Picture",
                    "No picture attached. Run /register with the `image` option to add one.",
                    false,
                );
            }
        }
    }

    let back = CreateButton::new(BACK)
        .label("← Back")
        .style(ButtonStyle::Secondary);
    let next = CreateButton::new(NEXT)
        .label("Next Level →")
        .style(ButtonStyle::Primary);
    let fill_in = CreateButton::new(FILL_IN)
        .label("Fill in")
        .style(ButtonStyle::Primary);

    let buttons = match step {
        Step::PlayerName => vec![fill_in, next],
        Step::Contact => vec![back, fill_in, next],
        _ => {
            let mut buttons = vec![back];
            if draft.image.is_some() {
                buttons.push(
                    CreateButton::new(REMOVE_IMAGE)
                        .label("Remove picture")
                        .style(ButtonStyle::Danger),
                );
            }
            buttons.push(
                CreateButton::new(SUBMIT)
                    .label("Complete Registration")
                    .style(ButtonStyle::Success),
            );
            buttons
        }
    };

    CreateReply::default()
        .content(notice.unwrap_or_default())
        .embed(embed)
        .components(vec![CreateActionRow::Buttons(buttons)])
        .ephemeral(true)
}

/// Show everyone who has registered for the tournament.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn registered_players(
    ctx: BotContext<'_>,
    #[description = "Search by name"] search: Option<String>,
) -> Result<(), BotError> {
    ctx.defer_ephemeral().await?;

    let view = ListView::load_player_cards(&ctx.data().database).await?;
    let query = search.unwrap_or_default();
    let matching = view.filter(&query);

    let content = if matching.is_empty() {
        if query.is_empty() {
            "No users available.".to_string()
        } else {
            "No users found matching your search.".to_string()
        }
    } else {
        let mut table = Table::new();
        table.set_titles(row!["No.", "Name"]);
        for (i, player) in matching.iter().enumerate() {
            table.add_row(row![i + 1, &player.name]);
        }
        table_message(
            &format!("**Registered players** ({})", matching.len()),
            table,
        )
    };

    ctx.send(CreateReply::default().content(content).ephemeral(true))
        .await?;

    Ok(())
}
