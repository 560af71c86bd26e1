//! Telegram front end built on teloxide.
//!
//! Commands and inline buttons are translated into session events; the
//! resulting [`Prompt`] is rendered as text plus an inline keyboard. Button
//! presses edit the message they came from.

mod keyboard;

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId};
use teloxide::utils::command::BotCommands;
use teloxide::{ApiError, RequestError};
use tracing::{debug, info, warn};

use crate::session::{Action, Prompt, SessionController, UserId};

pub use keyboard::{decode_action, encode_action, markup};

type HandlerResult = Result<(), RequestError>;

const FAILURE_TEXT: &str = "⚠️ Something went wrong, please try again.";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the country menu")]
    Start,
    #[command(description = "show the account balance")]
    Balance,
    #[command(description = "show this help")]
    Help,
}

/// Poll Telegram for updates until the process is interrupted.
pub async fn run(bot: Bot, controller: Arc<SessionController>) {
    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(on_command),
        )
        .branch(Update::filter_callback_query().endpoint(on_callback));

    info!("Telegram bot starting");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![controller])
        .default_handler(|update| async move {
            debug!(update_id = ?update.id, "ignoring unhandled update");
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram bot stopped");
}

async fn on_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    controller: Arc<SessionController>,
) -> HandlerResult {
    if let Err(e) = handle_command(&bot, &msg, cmd, &controller).await {
        warn!(error = %e, chat_id = %msg.chat.id, "Failed to handle command");
        let _ = bot.send_message(msg.chat.id, FAILURE_TEXT).await;
    }
    respond(())
}

async fn on_callback(
    bot: Bot,
    query: CallbackQuery,
    controller: Arc<SessionController>,
) -> HandlerResult {
    if let Err(e) = handle_callback_query(&bot, &query, &controller).await {
        warn!(error = %e, user_id = query.from.id.0, "Failed to handle callback query");
        let _ = bot.send_message(query_chat(&query), FAILURE_TEXT).await;
    }
    respond(())
}

async fn handle_command(
    bot: &Bot,
    msg: &Message,
    cmd: Command,
    controller: &SessionController,
) -> HandlerResult {
    let Some(from) = msg.from.as_ref() else {
        debug!(chat_id = %msg.chat.id, "ignoring command without sender");
        return Ok(());
    };
    let user = UserId(from.id.0);

    match cmd {
        Command::Start => {
            let prompt = controller.menu(user).await;
            let text = format!(
                "Hello {}! 👋\n\n🔢 Temporary numbers for receiving verification codes.\n\n{}",
                from.first_name, prompt.text
            );
            send(bot, msg.chat.id, &text, &prompt.actions).await
        }
        Command::Balance => {
            let prompt = controller.check_balance(user).await;
            send(bot, msg.chat.id, &prompt.text, &prompt.actions).await
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
            Ok(())
        }
    }
}

async fn handle_callback_query(
    bot: &Bot,
    query: &CallbackQuery,
    controller: &SessionController,
) -> HandlerResult {
    let Some(action) = query.data.as_deref().and_then(decode_action) else {
        debug!(data = ?query.data, "ignoring unknown callback data");
        bot.answer_callback_query(query.id.clone())
            .text("This button is no longer supported.")
            .await?;
        return Ok(());
    };
    bot.answer_callback_query(query.id.clone()).await?;

    let user = UserId(query.from.id.0);
    let origin = query
        .message
        .as_ref()
        .map(|message| (message.chat().id, message.id()));

    if let (Action::SelectCountry(country), Some((chat_id, message_id))) = (&action, origin) {
        if shows_search_notice(controller, user) {
            let searching = format!("⏳ Looking for a number in {}...", country.label);
            edit(bot, chat_id, message_id, &searching, None).await?;
        }
    }

    let prompt = controller.handle(user, controller.event_for(&action)).await;
    render(bot, query, origin, &prompt).await
}

async fn render(
    bot: &Bot,
    query: &CallbackQuery,
    origin: Option<(ChatId, MessageId)>,
    prompt: &Prompt,
) -> HandlerResult {
    match origin {
        Some((chat_id, message_id)) => {
            edit(
                bot,
                chat_id,
                message_id,
                &prompt.text,
                Some(markup(&prompt.actions)),
            )
            .await
        }
        None => send(bot, query_chat(query), &prompt.text, &prompt.actions).await,
    }
}

async fn send(bot: &Bot, chat_id: ChatId, text: &str, actions: &[Action]) -> HandlerResult {
    let mut request = bot.send_message(chat_id, text);
    if !actions.is_empty() {
        request = request.reply_markup(markup(actions));
    }
    request.await?;
    Ok(())
}

async fn edit(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: &str,
    keyboard: Option<InlineKeyboardMarkup>,
) -> HandlerResult {
    let mut request = bot.edit_message_text(chat_id, message_id, text);
    if let Some(keyboard) = keyboard {
        request = request.reply_markup(keyboard);
    }
    match request.await {
        Ok(_) => Ok(()),
        // Pressing refresh twice renders the same prompt again.
        Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// A selection only reaches the gateway when no rental is live; otherwise the
/// menu is answered locally and the search notice would just flicker.
fn shows_search_notice(controller: &SessionController, user: UserId) -> bool {
    !controller.rental(user).is_some_and(|rental| rental.is_live())
}

/// Private chat with the user who pressed the button.
fn query_chat(query: &CallbackQuery) -> ChatId {
    query
        .message
        .as_ref()
        .map(|message| message.chat().id)
        .unwrap_or_else(|| private_chat(query.from.id))
}

fn private_chat(user: teloxide::types::UserId) -> ChatId {
    user.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert!(matches!(
            Command::parse("/start", "rentsms_bot"),
            Ok(Command::Start)
        ));
        assert!(matches!(
            Command::parse("/balance", "rentsms_bot"),
            Ok(Command::Balance)
        ));
        assert!(matches!(
            Command::parse("/help", "rentsms_bot"),
            Ok(Command::Help)
        ));
        assert!(Command::parse("/unknown", "rentsms_bot").is_err());
    }

    #[tokio::test]
    async fn search_notice_only_when_a_reservation_will_run() {
        use crate::client::{BoxFuture, Gateway, GatewayError, GatewayResult};
        use crate::domain::{
            ActivationId, ActivationStatus, Balance, COUNTRIES, FinalizeOutcome, RentalRequest,
            RentedNumber, Reservation, ServiceCode,
        };
        use crate::session::InMemoryRentalStore;

        struct OneNumber;

        impl Gateway for OneNumber {
            fn get_balance(&self) -> BoxFuture<'_, GatewayResult<Balance>> {
                Box::pin(async { Err(GatewayError::ConnectionFailed) })
            }

            fn reserve_number<'a>(
                &'a self,
                _request: &'a RentalRequest,
            ) -> BoxFuture<'a, GatewayResult<Reservation>> {
                Box::pin(async {
                    Ok(Reservation {
                        activation_id: ActivationId::new("778899").unwrap(),
                        phone_number: RentedNumber::new("971501234567").unwrap(),
                        cost: None,
                    })
                })
            }

            fn poll_status<'a>(
                &'a self,
                _activation_id: &'a ActivationId,
            ) -> BoxFuture<'a, GatewayResult<ActivationStatus>> {
                Box::pin(async { Ok(ActivationStatus::AwaitingCode) })
            }

            fn finalize<'a>(
                &'a self,
                _activation_id: &'a ActivationId,
                _outcome: FinalizeOutcome,
            ) -> BoxFuture<'a, GatewayResult<()>> {
                Box::pin(async { Ok(()) })
            }
        }

        let controller = SessionController::new(
            Arc::new(OneNumber),
            Arc::new(InMemoryRentalStore::new()),
            ServiceCode::new("wa").unwrap(),
        );
        let user = UserId(5);
        assert!(shows_search_notice(&controller, user));

        let request = RentalRequest::new(COUNTRIES[1], controller.service().clone());
        controller.select_country_service(user, request).await;
        assert!(!shows_search_notice(&controller, user));
    }

    #[test]
    fn private_chat_keeps_the_user_id() {
        let chat = private_chat(teloxide::types::UserId(4_000_000_000));
        assert_eq!(chat, ChatId(4_000_000_000));
        assert!(chat.is_user());
    }

    #[test]
    fn help_lists_every_command() {
        let help = Command::descriptions().to_string();
        for command in ["/start", "/balance", "/help"] {
            assert!(help.contains(command), "{help}");
        }
    }
}
