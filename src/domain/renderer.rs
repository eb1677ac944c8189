use super::message::{Message, MessageId};

/// Presentation observer driven by the room store.
///
/// The store never touches presentation state directly; these three signals
/// are the whole contract.
pub trait Renderer {
    /// Replaces the displayed log with `messages`, in order.
    fn replace_view(&mut self, messages: &[Message]);

    /// Appends one message to the displayed log.
    fn append(&mut self, message: &Message);

    /// Removes the displayed message with `id`, if present.
    fn remove(&mut self, id: MessageId);
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderSignal {
    Replace(Vec<MessageId>),
    Append(MessageId),
    Remove(MessageId),
}

/// Records every signal so tests can assert on the exact sequence.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub signals: Vec<RenderSignal>,
    pub texts: std::collections::HashMap<MessageId, String>,
}

#[cfg(test)]
impl RecordingRenderer {
    pub fn last_replace(&self) -> Option<&[MessageId]> {
        self.signals.iter().rev().find_map(|signal| match signal {
            RenderSignal::Replace(ids) => Some(ids.as_slice()),
            _ => None,
        })
    }
}

#[cfg(test)]
impl Renderer for RecordingRenderer {
    fn replace_view(&mut self, messages: &[Message]) {
        for message in messages {
            self.texts.insert(message.id, message.text.clone());
        }
        self.signals.push(RenderSignal::Replace(
            messages.iter().map(|message| message.id).collect(),
        ));
    }

    fn append(&mut self, message: &Message) {
        self.texts.insert(message.id, message.text.clone());
        self.signals.push(RenderSignal::Append(message.id));
    }

    fn remove(&mut self, id: MessageId) {
        self.signals.push(RenderSignal::Remove(id));
    }
}
