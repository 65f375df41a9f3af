//! # Message Router
//!
//! Orchestrates the per-message pipeline: inbound guards, the hidden-payload
//! decode, classification, reference resolution, the ledger engine call, and
//! finally composition and delivery of the response.
//!
//! Failure policy is silence: a store error is logged and the operation
//! abandoned; an unresolvable mention or unmatched message produces no
//! observable effect at all.

use std::sync::Arc;

use anyhow::Result;

use crate::application::classifier::{self, extract_mention};
use crate::application::composer;
use crate::application::directory::UserDirectory;
use crate::application::engine::LedgerEngine;
use crate::domain::traits::{ChatProvider, LedgerStore, StoreError};
use crate::domain::types::{House, IncomingMessage, Intent, Reply};

/// Marker in a webhook pretext that identifies the commenting account.
const GITHUB_AUTHOR_MARKER: &str = "New comment by ";
/// Approval token in a webhook comment body.
const GITHUB_APPROVAL_MARKER: &str = ":+1:";

/// Everything the per-message pipeline needs, passed explicitly: the bot's
/// identity, the directory snapshot, and the ledger store handle.
#[derive(Clone)]
pub struct BotContext {
    pub bot_user_id: String,
    pub bot_name: String,
    pub trigger_word: String,
    pub github_channel: Option<String>,
    pub system_user: Option<String>,
    pub directory: UserDirectory,
    pub store: Arc<dyn LedgerStore>,
}

pub struct MessageRouter {
    ctx: BotContext,
}

impl MessageRouter {
    pub fn new(ctx: BotContext) -> Self {
        Self { ctx }
    }

    /// Process one inbound message end to end.
    pub async fn route<C: ChatProvider>(&self, chat: &C, msg: &IncomingMessage) -> Result<()> {
        if !self.should_process(msg) {
            return Ok(());
        }

        let text = classifier::decode_hidden_payload(&msg.text, &self.ctx.directory);
        let is_github_channel = self.ctx.github_channel.as_deref() == Some(msg.channel.as_str());
        let intent = classifier::classify(
            &text,
            is_github_channel,
            &self.ctx.bot_name,
            &self.ctx.trigger_word,
        );
        tracing::debug!(?intent, sender = %msg.sender, channel = %msg.channel, "classified message");

        let reply = match self.dispatch(&intent, &text, msg).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("ledger store failure, dropping response: {e}");
                return Ok(());
            }
        };

        for out in composer::compose(&msg.channel, &reply) {
            if let Err(e) = chat.send_message(&out.text).await {
                tracing::error!("failed to post response: {e}");
            }
        }
        Ok(())
    }

    /// Inbound constraints: a real chat message, in a channel conversation,
    /// not from the bot itself and not from the platform's system account.
    fn should_process(&self, msg: &IncomingMessage) -> bool {
        msg.kind == "message"
            && (!msg.text.is_empty() || !msg.attachments.is_empty())
            && msg.channel.starts_with('!')
            && msg.sender != self.ctx.bot_user_id
            && self.ctx.system_user.as_deref() != Some(msg.sender.as_str())
    }

    async fn dispatch(
        &self,
        intent: &Intent,
        text: &str,
        msg: &IncomingMessage,
    ) -> Result<Reply, StoreError> {
        let engine = LedgerEngine::new(self.ctx.store.as_ref());
        let sender = msg.sender.as_str();

        match intent {
            Intent::GithubEvent => self.handle_github_event(&engine, msg).await,
            Intent::AwardPoints => {
                let amount = classifier::parse_amount(text);
                match self.points_target(text) {
                    Some(Target::House(house)) => engine.award_house(house, amount, sender).await,
                    Some(Target::Student(id)) => engine.award_student(&id, amount, sender).await,
                    None => Ok(Reply::Silent),
                }
            }
            Intent::DeductPoints => {
                let amount = classifier::parse_amount(text);
                match self.points_target(text) {
                    Some(Target::House(house)) => engine.deduct_house(house, amount, sender).await,
                    Some(Target::Student(id)) => engine.deduct_student(&id, amount, sender).await,
                    None => Ok(Reply::Silent),
                }
            }
            Intent::QueryStandings => engine.standings().await,
            Intent::ResetScores => engine.reset_scores().await,
            Intent::Greet => Ok(Reply::Welcome),
            Intent::RequestEnrollment(house) => {
                engine.enroll(sender, &self.display_name(sender), *house).await
            }
            Intent::RandomSort => engine.random_sort(sender, &self.display_name(sender)).await,
            Intent::Erase(mention) => match self.ctx.directory.resolve_mention_to_id(mention) {
                Some(id) => engine.erase(id, sender).await,
                None => Ok(Reply::Silent),
            },
            Intent::BestStudent => engine.best_students().await,
            Intent::WorstStudent => engine.worst_students().await,
            Intent::DescribeStudent(mention) => {
                match self.ctx.directory.resolve_mention_to_id(mention) {
                    Some(id) if self.ctx.directory.resolve_id_to_name(id)
                        == Some(self.ctx.bot_name.as_str()) =>
                    {
                        Ok(Reply::HeadmasterBio)
                    }
                    Some(id) => engine.student_stats(id).await,
                    None => Ok(Reply::Silent),
                }
            }
            Intent::DescribeHouse(house) => engine.house_roster(*house).await,
            Intent::ExplainSorting => Ok(Reply::SortingExplained),
            Intent::ListRoster => engine.full_roster().await,
            Intent::LinkGithubName(name) => {
                engine.link_github(sender, &self.display_name(sender), name).await
            }
            Intent::ForceSortAll => engine.force_sort_all(&self.ctx.directory).await,
            Intent::Ignore => Ok(Reply::Silent),
        }
    }

    /// The house or student an award/deduct message names. A house mention
    /// wins over a student mention; an unresolvable mention is nothing.
    fn points_target(&self, text: &str) -> Option<Target> {
        let lower = text.to_lowercase();
        if let Some(house) = House::find_in(&lower) {
            return Some(Target::House(house));
        }
        let mention = extract_mention(text)?;
        self.ctx
            .directory
            .resolve_mention_to_id(&mention)
            .map(|id| Target::Student(id.to_string()))
    }

    fn display_name(&self, user_id: &str) -> String {
        self.ctx
            .directory
            .resolve_id_to_name(user_id)
            .unwrap_or(user_id)
            .to_string()
    }

    /// Credit an approval-style webhook event to the linked student.
    /// Anything that is not an approval comment is dropped quietly.
    async fn handle_github_event(
        &self,
        engine: &LedgerEngine<'_>,
        msg: &IncomingMessage,
    ) -> Result<Reply, StoreError> {
        let Some(attachment) = msg.attachments.first() else {
            return Ok(Reply::Silent);
        };
        let Some(pretext) = attachment.pretext.as_deref() else {
            return Ok(Reply::Silent);
        };
        let Some(rest) = pretext.split(GITHUB_AUTHOR_MARKER).nth(1) else {
            return Ok(Reply::Silent);
        };
        let Some(git_user) = rest.split_whitespace().next() else {
            return Ok(Reply::Silent);
        };
        let approved = attachment
            .text
            .as_deref()
            .is_some_and(|t| t.contains(GITHUB_APPROVAL_MARKER));
        if !approved {
            return Ok(Reply::Silent);
        }
        engine.credit_github_approval(git_user).await
    }
}

enum Target {
    House(House),
    Student(String),
}
