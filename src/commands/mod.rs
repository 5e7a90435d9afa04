pub mod owner_commands;
pub mod user_commands;

/// A way to group commands together.
///
/// Implementors of this trait can return a list of their commands within their own module.
/// Typically, you would group commands by who is allowed to run them.
///
/// Additionally, the implementors of this trait should not directly "own" the commands.
/// You should simply generate them by running Poise's function and returning the result.
/// This way, you only need to `pub` the implementor and not the commands themselves.
///
/// For more details on how this works, you can check the documentation for the `poise::command` macro.
///
/// For example, you can define a type to group Owner commands together.
/// ```ignore
/// pub struct OwnerCommands;
///
/// impl CommandsContainer for OwnerCommands {
///     type Data = BotData;
///     type Error = BotError;
///
///     fn get_commands_list() -> Vec<poise::Command<Self::Data, Self::Error>> {
///         vec![very_important_owner_only_command()]
///     }
/// }
///
/// #[poise::command(slash_command, required_permissions = "MANAGE_GUILD")]
/// async fn very_important_owner_only_command(ctx: BotContext<'_>) -> Result<(), BotError> {
///     ctx.say("Wow, you run this tournament, that's so cool!").await?;
///     Ok(())
/// }
/// ```
pub trait CommandsContainer {
    type Data;
    type Error;

    fn get_commands_list() -> Vec<poise::Command<Self::Data, Self::Error>>;
}
