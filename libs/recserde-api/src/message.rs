//! Static descriptions of compiled message types.
//!
//! A message type lists its fields once, in declaration order. Schema
//! derivation and the generic binary writer read this list instead of
//! inspecting the type at runtime.

/// Declared kind of a message field.
#[derive(Clone, Copy)]
pub enum FieldKind {
    Bool,
    Int32,
    String,
    /// Nested message. The descriptor is resolved lazily so message types
    /// may reference each other.
    Message(fn() -> &'static MessageDescriptor),
}

impl std::fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Bool => f.write_str("Bool"),
            FieldKind::Int32 => f.write_str("Int32"),
            FieldKind::String => f.write_str("String"),
            FieldKind::Message(descriptor) => write!(f, "Message({})", descriptor().full_name),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Field name as declared in the message definition.
    pub name: &'static str,
    /// Wire tag.
    pub number: u32,
    pub kind: FieldKind,
}

#[derive(Debug)]
pub struct MessageDescriptor {
    /// Fully-qualified name (e.g. `"card.CreditCard"`).
    pub full_name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl MessageDescriptor {
    /// Last segment of the full name.
    pub fn name(&self) -> &'static str {
        match self.full_name.rsplit_once('.') {
            Some((_, name)) => name,
            None => self.full_name,
        }
    }

    /// Everything before the last segment, if any.
    pub fn package(&self) -> Option<&'static str> {
        self.full_name.rsplit_once('.').map(|(package, _)| package)
    }
}

/// Value of one message field, borrowed from the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Bool(bool),
    Int32(i32),
    String(&'a str),
    Message(Vec<FieldValue<'a>>),
}

/// A compiled message type with a static field list.
pub trait DescribedMessage: Send + Sync + 'static {
    fn descriptor() -> &'static MessageDescriptor;

    /// Field values in descriptor order.
    fn field_values(&self) -> Vec<FieldValue<'_>>;
}
