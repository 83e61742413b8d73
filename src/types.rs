use std::sync::Arc;

/// Who authored a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

/// How a conversation entry's body should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    PlainText,
    MarkupHtml,
    CodeBlock,
}

/// One immutable message in the conversation log.
///
/// Entries are append-only; insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub author: Author,
    pub body: String,
    pub kind: ContentKind,
}

impl ConversationEntry {
    /// A user-typed message. Bodies starting with `<code>` are code blocks,
    /// everything else is display markup.
    pub fn user(body: impl Into<String>) -> Self {
        let body = body.into();
        let kind = Self::classify(&body);
        Self {
            author: Author::User,
            body,
            kind,
        }
    }

    /// A structured assistant message (detected ingredients, recipe, answer).
    pub fn assistant(body: impl Into<String>) -> Self {
        let body = body.into();
        let kind = Self::classify(&body);
        Self {
            author: Author::Assistant,
            body,
            kind,
        }
    }

    /// An assistant failure or validation notice, always plain text.
    pub fn assistant_notice(body: impl Into<String>) -> Self {
        Self {
            author: Author::Assistant,
            body: body.into(),
            kind: ContentKind::PlainText,
        }
    }

    fn classify(body: &str) -> ContentKind {
        if body.starts_with("<code>") {
            ContentKind::CodeBlock
        } else {
            ContentKind::MarkupHtml
        }
    }
}

/// Where the session is in the upload → edit → generate loop.
///
/// Chat queries run in any mode and never change it. The busy indicator is a
/// separate flag on the session, not a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// No image under detection; the quiescent initial state.
    AwaitingImage,
    /// An image was supplied and its detection call is outstanding.
    Detecting,
    /// A detection has resolved; the ingredient rows are editable.
    IngredientsEditable,
    /// A recipe-generation call is outstanding.
    GeneratingRecipe,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::AwaitingImage => "awaiting_image",
            SessionMode::Detecting => "detecting",
            SessionMode::IngredientsEditable => "ingredients_editable",
            SessionMode::GeneratingRecipe => "generating_recipe",
        }
    }

    /// True while the ingredient panel should accept edits.
    pub fn ingredients_editable(&self) -> bool {
        matches!(self, SessionMode::IngredientsEditable)
    }
}

/// The image currently shown in the session, and the bytes sent to detection.
///
/// Replaced wholesale on each upload. Bytes are shared so clones handed to
/// the gateway stay cheap.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    name: String,
    bytes: Arc<Vec<u8>>,
}

impl ImagePayload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// File name sent with the upload form.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A generated recipe: ordered sections, each an item list or a step list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub sections: Vec<Section>,
}

/// One named block of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: SectionBody,
}

/// A section body is exactly one of the two kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    /// Unordered items, rendered verbatim.
    Items(Vec<String>),
    /// Ordered steps; each step may carry lightweight markdown.
    Steps(Vec<String>),
}
