//! Message dispatcher - Routes messages to built-ins or scales
//!
//! Every message first reconciles the bot's state with disk (indicator and
//! scales), then is classified and handled. Reconciliation and handling
//! happen under one lock per bot, so concurrent messages are processed one
//! at a time.

use std::sync::{Arc, Mutex, MutexGuard};

use super::builtins::{is_scale_keyword, BuiltinReply, ScaleAdmin};
use super::parser::MessageParser;
use crate::application::errors::BotError;
use crate::domain::entities::{Command, InboundMessage, ReplyBatch};
use crate::domain::traits::{Outcome, Responder, Store};
use crate::infrastructure::config::{BotConfig, IndicatorWatch};
use crate::infrastructure::scales::ScaleRegistry;

/// State mutated by reconciliation, guarded by the dispatch lock
struct DispatchState {
    indicator: IndicatorWatch,
    registry: ScaleRegistry,
}

impl DispatchState {
    fn reconcile(&mut self) {
        self.indicator.refresh();
        self.registry.reconcile();
    }
}

/// The scale-running bot
pub struct ScaleBot {
    name: String,
    state: Mutex<DispatchState>,
}

impl ScaleBot {
    pub fn new(name: impl Into<String>, indicator: IndicatorWatch, registry: ScaleRegistry) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(DispatchState { indicator, registry }),
        }
    }

    pub fn from_config(config: &BotConfig, store: Arc<dyn Store>) -> Result<Self, BotError> {
        let registry = ScaleRegistry::new(&config.scales_directory)?;
        tracing::info!("{} uses scales from {}", config.name, registry.directory().display());
        let indicator = IndicatorWatch::new(store, config.indicator.clone());
        Ok(Self::new(config.name.clone(), indicator, registry))
    }

    /// Current indicator, after any reload
    pub fn indicator(&self) -> String {
        self.lock().indicator.indicator().to_string()
    }

    /// Names of the currently registered scales
    pub fn scale_names(&self) -> Vec<String> {
        self.lock().registry.names().map(str::to_string).collect()
    }

    fn lock(&self) -> MutexGuard<'_, DispatchState> {
        // A panic mid-dispatch leaves the registry consistent enough to keep going
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn dispatch(&self, state: &mut DispatchState, command: Command) -> Outcome {
        let DispatchState { indicator, registry } = state;

        if command.is_indicated && is_scale_keyword(&command.verb) {
            let mut admin = ScaleAdmin::new(registry, indicator.indicator(), &self.name);
            return match admin.run(&command.argument_text) {
                BuiltinReply::Text(text) => Outcome::Reply(ReplyBatch::single(text)),
                BuiltinReply::Shutdown => Outcome::Shutdown,
            };
        }

        let Some(scale) = registry.find(&command.verb) else {
            return Outcome::Ignored;
        };

        match scale.invoke(command.is_indicated, &command.argument_text) {
            Ok(replies) => ReplyBatch::from(replies).into(),
            Err(e) => {
                tracing::warn!("{}", e);
                Outcome::Ignored
            }
        }
    }
}

impl Responder for ScaleBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn respond(&self, message: &InboundMessage, self_id: &str) -> Outcome {
        let mut state = self.lock();

        // Runs even for our own messages so disk changes are picked up promptly
        state.reconcile();

        if message.author_id == self_id {
            return Outcome::Ignored;
        }

        let Some(command) = MessageParser::new(state.indicator.indicator()).classify(&message.text) else {
            return Outcome::Ignored;
        };

        tracing::debug!(
            "[{}] verb={} indicated={}",
            message.chat_id,
            command.verb,
            command.is_indicated
        );

        self.dispatch(&mut *state, command)
    }
}
