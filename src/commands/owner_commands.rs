use poise::{
    serenity_prelude::{Colour, CreateEmbed},
    CreateReply,
};
use prettytable::{row, Table};
use tracing::{info, instrument};

use tourney_desk::{
    database::models::SportCategory,
    error::SportError,
    listing::ListView,
    sports::{create_sport as create_sport_category, parse_sport_date, SportLinks},
};

use crate::{log::discord_log_info, utils::table_message, BotContext, BotData, BotError};

use super::CommandsContainer;

/// CommandsContainer for the tournament owner commands
pub struct OwnerCommands;

impl CommandsContainer for OwnerCommands {
    type Data = BotData;
    type Error = BotError;

    fn get_commands_list() -> Vec<poise::Command<Self::Data, Self::Error>> {
        vec![create_sport(), sports(), delete_sport(), players()]
    }
}

/// Embeds hold at most this many fields.
const MAX_SPORT_CARDS: usize = 25;
/// Discord's limits on embed text, counted in characters.
const EMBED_CHAR_LIMIT: usize = 6000;
const FIELD_NAME_LIMIT: usize = 256;
const FIELD_VALUE_LIMIT: usize = 1024;
const SPORTS_TITLE: &str = "Sports Categories";
/// Room left for the "Showing N of M" description.
const DESCRIPTION_ROOM: usize = 128;

async fn reply(ctx: BotContext<'_>, content: impl Into<String>) -> Result<(), BotError> {
    ctx.send(
        CreateReply::default()
            .content(content.into())
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Create a new sports category for the tournament.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[instrument]
async fn create_sport(
    ctx: BotContext<'_>,
    #[description = "The name of the sport"] name: String,
    #[description = "The day the sport starts, as YYYY-MM-DD"] date: String,
) -> Result<(), BotError> {
    let sports_date = match parse_sport_date(&date) {
        Ok(sports_date) => sports_date,
        Err(e) => return reply(ctx, e.to_string()).await,
    };

    match create_sport_category(&ctx.data().database, &name, sports_date).await {
        Ok(sport) => {
            reply(ctx, format!("Sport **{}** created successfully!", sport.sports_name)).await?;
            let date_field = sport.sports_date.to_string();
            discord_log_info(
                ctx,
                "Sport created",
                vec![
                    ("Sport", sport.sports_name.as_str(), true),
                    ("Starts", date_field.as_str(), true),
                ],
            )
            .await;
        }
        Err(SportError::Validation(e)) => reply(ctx, e.to_string()).await?,
        Err(SportError::Gateway(e)) => return Err(e.context("Error creating the sport")),
    }

    Ok(())
}

/// Show all sports categories, optionally filtered by name.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[instrument]
async fn sports(
    ctx: BotContext<'_>,
    #[description = "Only show sports whose name contains this"] search: Option<String>,
) -> Result<(), BotError> {
    ctx.defer_ephemeral().await?;

    let view = ListView::load_sports(&ctx.data().database).await?;
    let query = search.unwrap_or_default();
    let matching = view.filter(&query);
    info!("Showing {} of {} sports", matching.len(), view.len());

    if matching.is_empty() {
        let content = if query.is_empty() {
            "No sports categories available.".to_string()
        } else {
            format!("No sports match \"{}\".", query)
        };
        return reply(ctx, content).await;
    }

    let embed = sport_cards(
        &matching,
        ctx.data().config.dashboard_url.as_deref(),
    );

    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Renders sports as embed fields, with links to their team and points table screens.
fn sport_cards(sports: &[&SportCategory], dashboard_url: Option<&str>) -> CreateEmbed {
    let fields = sport_card_fields(sports, dashboard_url);
    let shown = fields.len();

    let mut embed = CreateEmbed::new()
        .title(SPORTS_TITLE)
        .fields(fields.into_iter().map(|(name, value)| (name, value, true)))
        .colour(Colour::DARK_GREEN);

    if shown < sports.len() {
        embed = embed.description(format!(
            "Showing {} of {} sports. Search by name to find the rest.",
            shown,
            sports.len()
        ));
    }

    embed
}

/// Card fields for as many sports as fit into a single embed, in order.
fn sport_card_fields(sports: &[&SportCategory], dashboard_url: Option<&str>) -> Vec<(String, String)> {
    let mut budget = EMBED_CHAR_LIMIT - SPORTS_TITLE.len() - DESCRIPTION_ROOM;
    let mut fields = Vec::new();

    for sport in sports.iter().take(MAX_SPORT_CARDS) {
        let name = truncate(&sport.sports_name, FIELD_NAME_LIMIT);
        let value = card_value(sport, dashboard_url);
        let size = name.chars().count() + value.chars().count();
        if size > budget {
            break;
        }
        budget -= size;
        fields.push((name, value));
    }

    fields
}

/// The start date, followed by the links when they fit into one field.
fn card_value(sport: &SportCategory, dashboard_url: Option<&str>) -> String {
    let starts = format!("Starts {}", sport.sports_date.format("%d %b %Y"));
    let Some(dashboard_url) = dashboard_url else {
        return starts;
    };

    let links = SportLinks::new(dashboard_url, &sport.sports_name);
    let value = format!(
        "{}\n[Create Team]({}) · [Points Table]({})",
        starts, links.create_team, links.points_table
    );
    if value.chars().count() > FIELD_VALUE_LIMIT {
        starts
    } else {
        value
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit - 1).collect();
    cut.push('…');
    cut
}

/// Delete a sports category by its name.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[instrument]
async fn delete_sport(
    ctx: BotContext<'_>,
    #[description = "The exact name of the sport to delete"] name: String,
) -> Result<(), BotError> {
    ctx.defer_ephemeral().await?;

    let mut view = ListView::load_sports(&ctx.data().database).await?;
    let deleted = view
        .delete(&ctx.data().database, name.trim())
        .await
        .map_err(|e| e.context("Failed to delete the sport"))?;

    if !deleted {
        return reply(ctx, format!("There is no sport named \"{}\".", name.trim())).await;
    }

    reply(
        ctx,
        format!(
            "Sport deleted successfully! {} sports categories remain.",
            view.len()
        ),
    )
    .await?;
    discord_log_info(ctx, "Sport deleted", vec![("Sport", name.trim(), true)]).await;

    Ok(())
}

/// Show all registered players, optionally filtered by name or phone number.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[instrument]
async fn players(
    ctx: BotContext<'_>,
    #[description = "Search by name or phone number"] search: Option<String>,
) -> Result<(), BotError> {
    ctx.defer_ephemeral().await?;

    let view = ListView::load_players(&ctx.data().database).await?;
    let query = search.unwrap_or_default();
    let matching = view.filter(&query);

    if matching.is_empty() {
        let content = if query.is_empty() {
            "No users available.".to_string()
        } else {
            "No users found matching your search.".to_string()
        };
        return reply(ctx, content).await;
    }

    let mut table = Table::new();
    table.set_titles(row!["No.", "Name", "Phone", "Picture"]);
    for (i, player) in matching.iter().enumerate() {
        table.add_row(row![
            i + 1,
            &player.name,
            &player.phone_number,
            if player.image_url.is_some() { "yes" } else { "-" }
        ]);
    }

    let header = format!("**Registered players** ({} of {})", matching.len(), view.len());
    reply(ctx, table_message(&header, table)).await
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sport(name: &str) -> SportCategory {
        SportCategory {
            sports_name: name.to_string(),
            sports_date: NaiveDate::from_ymd_opt(2025, 1, 26).unwrap(),
        }
    }

    fn total_chars(fields: &[(String, String)]) -> usize {
        fields
            .iter()
            .map(|(name, value)| name.chars().count() + value.chars().count())
            .sum()
    }

    #[test]
    fn short_lists_show_every_sport() {
        let sports = [sport("Kabaddi"), sport("Chess")];
        let refs: Vec<_> = sports.iter().collect();

        let fields = sport_card_fields(&refs, None);

        assert_eq!(
            fields,
            vec![
                ("Kabaddi".to_string(), "Starts 26 Jan 2025".to_string()),
                ("Chess".to_string(), "Starts 26 Jan 2025".to_string()),
            ]
        );
    }

    #[test]
    fn cards_stop_before_the_embed_gets_too_long() {
        let sports: Vec<_> = (1..=25)
            .map(|i| sport(&format!("Under-17 Girls Kabaddi {:02}", i)))
            .collect();
        let refs: Vec<_> = sports.iter().collect();

        let fields = sport_card_fields(&refs, Some("https://tournament-dashboard.example.com"));

        assert!(fields.len() < sports.len());
        assert!(!fields.is_empty());
        assert!(
            total_chars(&fields) + SPORTS_TITLE.len() + DESCRIPTION_ROOM <= EMBED_CHAR_LIMIT
        );
        assert_eq!(fields[0].0, "Under-17 Girls Kabaddi 01");
    }

    #[test]
    fn long_names_are_cut_to_the_field_limits() {
        let long = sport(&"Ultimate Frisbee & ".repeat(40));
        let fields = sport_card_fields(&[&long], Some("https://sports.example.com"));

        let (name, value) = &fields[0];
        assert_eq!(name.chars().count(), FIELD_NAME_LIMIT);
        assert!(name.ends_with('…'));
        assert!(value.chars().count() <= FIELD_VALUE_LIMIT);
        assert_eq!(value, "Starts 26 Jan 2025");
    }

    #[test]
    fn links_are_shown_when_they_fit() {
        let kabaddi = sport("Kabaddi");
        let fields = sport_card_fields(&[&kabaddi], Some("https://sports.example.com"));

        assert!(fields[0]
            .1
            .contains("[Create Team](https://sports.example.com/Owner/Create_Team?sport=Kabaddi)"));
    }
}
