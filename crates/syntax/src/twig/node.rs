//! The data Twig indexing needs out of a template: nothing more than spans,
//! names and line numbers — no expression evaluation, no inheritance
//! resolution (that is the indexer's job, working across files).

/// A half-open byte range into the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwigBlockNode {
    pub name: String,
    pub name_span: ByteSpan,
    /// The byte span of the block body, between the opening tag's `%}` and
    /// the matching `{% endblock %}` — this is what gets SHA-256 hashed.
    pub body_span: ByteSpan,
    pub start_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwigExtendsNode {
    pub target: String,
    pub is_sw_extends: bool,
    pub span: ByteSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwigCallKind {
    Function,
    Filter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwigCallNode {
    pub name: String,
    pub kind: TwigCallKind,
    pub span: ByteSpan,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwigVersionComment {
    pub hash: String,
    pub version: String,
    pub span: ByteSpan,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwigIconArgument {
    pub name: String,
    pub span: ByteSpan,
}

/// The parsed shape of a single Twig template.
#[derive(Debug, Clone, Default)]
pub struct TwigTree {
    pub blocks: Vec<TwigBlockNode>,
    pub extends: Option<TwigExtendsNode>,
    pub calls: Vec<TwigCallNode>,
    pub version_comments: Vec<TwigVersionComment>,
    pub icon_arguments: Vec<TwigIconArgument>,
}

impl TwigTree {
    pub fn functions(&self) -> impl Iterator<Item = &TwigCallNode> {
        self.calls.iter().filter(|call| call.kind == TwigCallKind::Function)
    }

    pub fn filters(&self) -> impl Iterator<Item = &TwigCallNode> {
        self.calls.iter().filter(|call| call.kind == TwigCallKind::Filter)
    }

    pub fn block(&self, name: &str) -> Option<&TwigBlockNode> {
        self.blocks.iter().find(|block| block.name == name)
    }
}
