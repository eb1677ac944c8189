use super::{
    message::{Message, MessageId},
    renderer::Renderer,
};

/// What the message panel currently shows, maintained purely from renderer
/// signals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedLog {
    messages: Vec<Message>,
}

impl DisplayedLog {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl Renderer for DisplayedLog {
    fn replace_view(&mut self, messages: &[Message]) {
        self.messages = messages.to_vec();
    }

    fn append(&mut self, message: &Message) {
        self.messages.push(message.clone());
    }

    fn remove(&mut self, id: MessageId) {
        self.messages.retain(|message| message.id != id);
    }
}
