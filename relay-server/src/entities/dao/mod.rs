mod conversation;

pub use conversation::{ConversationDocument, ConversationRecord, RecordKind};
