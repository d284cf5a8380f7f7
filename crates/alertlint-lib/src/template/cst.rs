//! Syntax kinds for Go text/template.
//!
//! `SyntaxKind` covers both token kinds and node kinds. Logos recognises the
//! tokens that appear inside an action; delimiters, text and comments are
//! produced by the mode-switching driver in [`super::lexer`].
//! `TmplLang` implements Rowan's `Language` trait for tree construction.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST` sentinel.
/// `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("|")]
    Pipe,

    #[token(",")]
    Comma,

    /// `:=` declares. Defined before `Colon` for correct precedence.
    #[token(":=")]
    Declare,

    #[token("=")]
    Assign,

    /// A lone colon is always a lexing error.
    #[token(":")]
    Colon,

    /// `$`, `$name`
    #[regex(r"\$[A-Za-z0-9_]*")]
    Variable,

    /// `.Name`
    #[regex(r"\.[A-Za-z_][A-Za-z0-9_]*")]
    Field,

    #[token(".")]
    Dot,

    #[regex(r"[+-]?(0[xX][0-9a-fA-F_]*|0[oO][0-7_]*|0[bB][01_]*|[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]*)?|\.[0-9][0-9_]*([eE][+-]?[0-9_]*)?)i?")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"`[^`]*`")]
    RawStr,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    CharLit,

    #[token("if")]
    KwIf,

    #[token("else")]
    KwElse,

    #[token("end")]
    KwEnd,

    #[token("range")]
    KwRange,

    #[token("with")]
    KwWith,

    #[token("define")]
    KwDefine,

    #[token("template")]
    KwTemplate,

    #[token("block")]
    KwBlock,

    #[token("break")]
    KwBreak,

    #[token("continue")]
    KwContinue,

    #[token("nil")]
    KwNil,

    #[token("true")]
    KwTrue,

    #[token("false")]
    KwFalse,

    /// Function name. Defined after keywords so they take precedence.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// Printable ASCII with no meaning inside an action.
    #[regex(r"[!#%&*;<>?@\[\]^{}~/\\]")]
    Punct,

    /// `{{` or `{{- `
    LeftDelim,
    /// `}}` or ` -}}`
    RightDelim,
    /// Literal text between actions.
    Text,
    /// `{{/* ... */}}` including delimiters.
    Comment,
    /// Where the lexer gave up; the reason is carried by `Lexed::error`.
    LexError,
    Error,

    // --- Node kinds (non-terminals) ---
    Root,
    List,
    Action,
    CommentAction,
    IfBlock,
    WithBlock,
    RangeBlock,
    ElseBranch,
    EndAction,
    Define,
    Block,
    TemplateCall,
    Break,
    Continue,
    Pipeline,
    Decl,
    Command,
    DotExpr,
    FieldExpr,
    VarExpr,
    FuncExpr,
    ParenExpr,
    LitExpr,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace)
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            KwIf | KwElse
                | KwEnd
                | KwRange
                | KwWith
                | KwDefine
                | KwTemplate
                | KwBlock
                | KwBreak
                | KwContinue
                | KwNil
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TmplLang {}

impl Language for TmplLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<TmplLang>;
pub type SyntaxToken = rowan::SyntaxToken<TmplLang>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..64u16 {
            if self.0 & (1 << i) != 0 && i < __LAST as u16 {
                // SAFETY: bounded by `__LAST` above
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    /// Tokens that start an operand, and therefore a command.
    pub const OPERAND_FIRST: TokenSet = TokenSet::new(&[
        KwTrue,
        KwFalse,
        CharLit,
        Dot,
        Field,
        Identifier,
        Number,
        KwNil,
        RawStr,
        Str,
        Variable,
        ParenOpen,
    ]);

    pub const TEMPLATE_NAME: TokenSet = TokenSet::new(&[Str, RawStr]);

    /// Tokens after which the lexer requires a terminator.
    pub const NEEDS_TERMINATOR: TokenSet = TokenSet::new(&[
        Identifier, Field, Variable, Dot, KwIf, KwElse, KwEnd, KwRange, KwWith, KwDefine,
        KwTemplate, KwBlock, KwBreak, KwContinue, KwNil, KwTrue, KwFalse,
    ]);
}
