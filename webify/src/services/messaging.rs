use chrono::Utc;
use log::{debug, info};
use serde::Serialize;

use super::{load_actor, newest_first};
use crate::{
    errors::{ValidationError, ValidationIssue, WebifyError, WebifyResult},
    id::generate_record_id,
    models::{ChatGroup, Message, Recipient, User},
    policy::{Action, ensure},
    store::{Collection, DocumentStore, MembershipOp, RosterChange, RosterOutcome},
    validators::require_text,
};

/// Private and group messages plus chat-group membership.
pub struct Messaging<'s, S> {
    users: Collection<'s, S, User>,
    messages: Collection<'s, S, Message>,
    groups: Collection<'s, S, ChatGroup>,
}

#[derive(Serialize)]
struct ReadPatch {
    is_read: bool,
}

fn check_body(content: &str, attachments: &[String]) -> WebifyResult<()> {
    if content.trim().is_empty() && attachments.is_empty() {
        return Err(ValidationError::single(
            "content",
            "validation.required",
            "a message needs content or at least one attachment",
        )
        .into());
    }
    Ok(())
}

impl<'s, S: DocumentStore> Messaging<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            users: Collection::new(store),
            messages: Collection::new(store),
            groups: Collection::new(store),
        }
    }

    async fn deliver(
        &self,
        sender_id: String,
        recipient: Recipient,
        content: &str,
        attachments: Vec<String>,
    ) -> WebifyResult<Message> {
        let message = Message {
            id: generate_record_id(),
            created_at: Utc::now(),
            sender_id,
            recipient,
            content: content.to_string(),
            attachments,
            is_read: false,
        };
        self.messages.insert(&message).await?;
        debug!("message {} {} -> {}", message.id, message.sender_id, message.recipient.id());
        Ok(message)
    }

    pub async fn send_private_message(
        &self,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
        attachments: Vec<String>,
    ) -> WebifyResult<Message> {
        let sender = load_actor(&self.users, sender_id).await?;
        ensure(sender.role, Action::SendMessage)?;
        let receiver = self.users.get_or_error(receiver_id).await?;
        check_body(content, &attachments)?;
        self.deliver(sender.id, Recipient::Private { user_id: receiver.id }, content, attachments)
            .await
    }

    /// Posts to a group the sender belongs to.
    pub async fn send_group_message(
        &self,
        sender_id: &str,
        group_id: &str,
        content: &str,
        attachments: Vec<String>,
    ) -> WebifyResult<Message> {
        let sender = load_actor(&self.users, sender_id).await?;
        ensure(sender.role, Action::SendMessage)?;
        let group = self.groups.get_or_error(group_id).await?;
        if !group.is_member(&sender.id) {
            return Err(WebifyError::denied(Action::SendMessage));
        }
        check_body(content, &attachments)?;
        self.deliver(sender.id, Recipient::Group { group_id: group.id }, content, attachments)
            .await
    }

    /// Messages exchanged between `a` and `b` in either direction, newest
    /// first.
    pub async fn private_conversation(&self, a: &str, b: &str, limit: Option<usize>) -> WebifyResult<Vec<Message>> {
        let mut messages = self.messages.find_by("sender_id", a).await?;
        if a != b {
            messages.extend(self.messages.find_by("sender_id", b).await?);
        }
        messages.retain(|message| message.between(a, b));
        Ok(newest_first(messages, |message| message.created_at, limit))
    }

    pub async fn group_messages(&self, group_id: &str, limit: Option<usize>) -> WebifyResult<Vec<Message>> {
        let group = self.groups.get_or_error(group_id).await?;
        let mut messages = self.messages.all().await?;
        messages.retain(|message| matches!(&message.recipient, Recipient::Group { group_id } if *group_id == group.id));
        Ok(newest_first(messages, |message| message.created_at, limit))
    }

    /// Sets the read flag. Only the receiver of a private message may do so.
    pub async fn mark_as_read(&self, message_id: &str, user_id: &str) -> WebifyResult<Message> {
        let user = load_actor(&self.users, user_id).await?;
        ensure(user.role, Action::ReadMessage)?;
        let mut message = self.messages.get_or_error(message_id).await?;
        match &message.recipient {
            Recipient::Private { user_id } if *user_id == user.id => {}
            _ => return Err(WebifyError::denied(Action::ReadMessage)),
        }
        if !message.is_read {
            self.messages.patch(message_id, &ReadPatch { is_read: true }).await?;
            message.is_read = true;
        }
        Ok(message)
    }

    pub async fn get_group(&self, group_id: &str) -> WebifyResult<ChatGroup> {
        self.groups.get_or_error(group_id).await
    }

    /// Creates a group whose first member and sole admin is the creator.
    pub async fn create_chat_group(
        &self,
        creator_id: &str,
        name: &str,
        description: Option<String>,
        members: &[String],
        image: Option<String>,
    ) -> WebifyResult<ChatGroup> {
        let creator = load_actor(&self.users, creator_id).await?;
        ensure(creator.role, Action::JoinGroup)?;
        let mut issues: Vec<ValidationIssue> = Vec::new();
        require_text("name", name, &mut issues);
        if !issues.is_empty() {
            return Err(ValidationError::new(issues).into());
        }

        let mut member_ids = vec![creator.id.clone()];
        for member_id in members {
            if member_ids.contains(member_id) {
                continue;
            }
            let member = self.users.get_or_error(member_id).await?;
            member_ids.push(member.id);
        }

        let group = ChatGroup {
            id: generate_record_id(),
            created_at: Utc::now(),
            name: name.trim().to_string(),
            description,
            members: member_ids,
            admins: vec![creator.id.clone()],
            image,
        };
        self.groups.insert(&group).await?;
        info!(
            "chat group {} '{}' created by {} with {} members",
            group.id,
            group.name,
            creator.id,
            group.members.len()
        );
        Ok(group)
    }

    /// Loads the group and checks that the actor administers it.
    async fn administered(&self, actor_id: &str, group_id: &str) -> WebifyResult<(User, ChatGroup)> {
        let actor = load_actor(&self.users, actor_id).await?;
        ensure(actor.role, Action::ManageGroup)?;
        let group = self.groups.get_or_error(group_id).await?;
        if !group.is_admin(&actor.id) {
            return Err(WebifyError::denied(Action::ManageGroup));
        }
        Ok((actor, group))
    }

    pub async fn add_group_member(&self, actor_id: &str, group_id: &str, user_id: &str) -> WebifyResult<ChatGroup> {
        let (actor, group) = self.administered(actor_id, group_id).await?;
        let user = self.users.get_or_error(user_id).await?;
        let outcome = self
            .groups
            .membership(&group.id, ChatGroup::MEMBERS, &user.id, MembershipOp::Add)
            .await?;
        debug!("group {} add {} by {} (changed: {})", group.id, user.id, actor.id, outcome.changed);
        self.groups.get_or_error(&group.id).await
    }

    /// Applies a roster change in one store step and turns the refusals into
    /// errors.
    async fn change_roster(&self, group_id: &str, user_id: &str, change: RosterChange) -> WebifyResult<RosterOutcome> {
        let outcome = self.groups.roster(group_id, ChatGroup::ROSTER, user_id, change).await?;
        match outcome {
            RosterOutcome::NotMember => Err(WebifyError::invalid_argument(
                "user_id",
                "validation.membership",
                format!("{user_id} is not a member of group {group_id}"),
            )),
            RosterOutcome::Protected => Err(WebifyError::invalid_state(format!(
                "{user_id} administers group {group_id} and cannot be removed"
            ))),
            RosterOutcome::LastAdmin => Err(WebifyError::invalid_state(format!(
                "{user_id} is the only admin of group {group_id}; promote another admin first"
            ))),
            RosterOutcome::Updated | RosterOutcome::Unchanged | RosterOutcome::Deleted => Ok(outcome),
        }
    }

    /// Removes a non-admin member.
    pub async fn remove_group_member(&self, actor_id: &str, group_id: &str, user_id: &str) -> WebifyResult<ChatGroup> {
        let (actor, group) = self.administered(actor_id, group_id).await?;
        self.change_roster(&group.id, user_id, RosterChange::Remove).await?;
        debug!("group {} remove {user_id} by {}", group.id, actor.id);
        self.groups.get_or_error(&group.id).await
    }

    /// Makes an existing member an admin.
    pub async fn promote_to_admin(&self, actor_id: &str, group_id: &str, user_id: &str) -> WebifyResult<ChatGroup> {
        let (actor, group) = self.administered(actor_id, group_id).await?;
        let outcome = self.change_roster(&group.id, user_id, RosterChange::Promote).await?;
        debug!("group {} promote {user_id} by {} ({outcome:?})", group.id, actor.id);
        self.groups.get_or_error(&group.id).await
    }

    /// Removes the user from the group. The sole admin cannot leave while
    /// others remain; the last member leaving deletes the group, in which
    /// case `None` is returned.
    pub async fn leave_group(&self, group_id: &str, user_id: &str) -> WebifyResult<Option<ChatGroup>> {
        let user = load_actor(&self.users, user_id).await?;
        ensure(user.role, Action::LeaveGroup)?;
        if self.change_roster(group_id, &user.id, RosterChange::Leave).await? == RosterOutcome::Deleted {
            info!("chat group {group_id} deleted after its last member left");
            return Ok(None);
        }
        debug!("{} left group {group_id}", user.id);
        // Another member leaving right after may already have removed it.
        self.groups.get(group_id).await
    }

    /// Groups the user belongs to.
    pub async fn user_groups(&self, user_id: &str) -> WebifyResult<Vec<ChatGroup>> {
        let mut groups = self.groups.all().await?;
        groups.retain(|group| group.is_member(user_id));
        Ok(groups)
    }
}
