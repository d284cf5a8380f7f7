//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind` - validation happens in the parser.

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};
use super::literal;

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(List, List);
ast_node!(Action, Action);
ast_node!(IfBlock, IfBlock);
ast_node!(WithBlock, WithBlock);
ast_node!(RangeBlock, RangeBlock);
ast_node!(ElseBranch, ElseBranch);
ast_node!(Define, Define);
ast_node!(Block, Block);
ast_node!(TemplateCall, TemplateCall);
ast_node!(Pipeline, Pipeline);
ast_node!(Decl, Decl);
ast_node!(Command, Command);
ast_node!(DotExpr, DotExpr);
ast_node!(FieldExpr, FieldExpr);
ast_node!(VarExpr, VarExpr);
ast_node!(FuncExpr, FuncExpr);
ast_node!(ParenExpr, ParenExpr);
ast_node!(LitExpr, LitExpr);

/// Anything that can appear in a list of template items.
///
/// Text, comments, `{{break}}`, `{{continue}}` and stray `{{end}}`s are not
/// represented; they carry nothing to analyse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Action(Action),
    If(IfBlock),
    With(WithBlock),
    Range(RangeBlock),
    Define(Define),
    Block(Block),
    Template(TemplateCall),
}

impl Item {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Action => Action::cast(node).map(Item::Action),
            SyntaxKind::IfBlock => IfBlock::cast(node).map(Item::If),
            SyntaxKind::WithBlock => WithBlock::cast(node).map(Item::With),
            SyntaxKind::RangeBlock => RangeBlock::cast(node).map(Item::Range),
            SyntaxKind::Define => Define::cast(node).map(Item::Define),
            SyntaxKind::Block => Block::cast(node).map(Item::Block),
            SyntaxKind::TemplateCall => TemplateCall::cast(node).map(Item::Template),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Item::Action(n) => n.as_cst(),
            Item::If(n) => n.as_cst(),
            Item::With(n) => n.as_cst(),
            Item::Range(n) => n.as_cst(),
            Item::Define(n) => n.as_cst(),
            Item::Block(n) => n.as_cst(),
            Item::Template(n) => n.as_cst(),
        }
    }
}

/// A single pipeline argument, including any `.Field` chain attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Dot(DotExpr),
    Field(FieldExpr),
    Var(VarExpr),
    Func(FuncExpr),
    Paren(ParenExpr),
    Lit(LitExpr),
}

impl Operand {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::DotExpr => DotExpr::cast(node).map(Operand::Dot),
            SyntaxKind::FieldExpr => FieldExpr::cast(node).map(Operand::Field),
            SyntaxKind::VarExpr => VarExpr::cast(node).map(Operand::Var),
            SyntaxKind::FuncExpr => FuncExpr::cast(node).map(Operand::Func),
            SyntaxKind::ParenExpr => ParenExpr::cast(node).map(Operand::Paren),
            SyntaxKind::LitExpr => LitExpr::cast(node).map(Operand::Lit),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Operand::Dot(n) => n.as_cst(),
            Operand::Field(n) => n.as_cst(),
            Operand::Var(n) => n.as_cst(),
            Operand::Func(n) => n.as_cst(),
            Operand::Paren(n) => n.as_cst(),
            Operand::Lit(n) => n.as_cst(),
        }
    }

    /// `.Field` tokens chained onto the operand.
    ///
    /// For a `FieldExpr` this is the whole chain: `.Labels.job` gives
    /// `.Labels` and `.job`.
    pub fn fields(&self) -> Vec<SyntaxToken> {
        tokens_of(self.as_cst(), SyntaxKind::Field).collect()
    }
}

impl Root {
    pub(super) fn new(node: SyntaxNode) -> Self {
        debug_assert_eq!(node.kind(), SyntaxKind::Root);
        Self(node)
    }

    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }
}

impl List {
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }
}

impl Action {
    pub fn pipeline(&self) -> Option<Pipeline> {
        self.0.children().find_map(Pipeline::cast)
    }
}

/// Shared shape of `if`, `with` and `range`.
macro_rules! control_accessors {
    ($($name:ident),*) => {
        $(
            impl $name {
                pub fn pipeline(&self) -> Option<Pipeline> {
                    self.0.children().find_map(Pipeline::cast)
                }

                pub fn body(&self) -> Option<List> {
                    self.0.children().find_map(List::cast)
                }

                pub fn else_branch(&self) -> Option<ElseBranch> {
                    self.0.children().find_map(ElseBranch::cast)
                }
            }
        )*
    };
}

control_accessors!(IfBlock, WithBlock, RangeBlock);

impl ElseBranch {
    pub fn body(&self) -> Option<List> {
        self.0.children().find_map(List::cast)
    }

    /// The block of an `{{else if}}` or `{{else with}}` chain.
    pub fn nested(&self) -> Option<Item> {
        self.0
            .children()
            .find(|n| matches!(n.kind(), SyntaxKind::IfBlock | SyntaxKind::WithBlock))
            .and_then(Item::cast)
    }
}

impl Define {
    pub fn name(&self) -> Option<String> {
        template_name(&self.0)
    }

    pub fn body(&self) -> Option<List> {
        self.0.children().find_map(List::cast)
    }
}

impl Block {
    pub fn name(&self) -> Option<String> {
        template_name(&self.0)
    }

    pub fn pipeline(&self) -> Option<Pipeline> {
        self.0.children().find_map(Pipeline::cast)
    }

    pub fn body(&self) -> Option<List> {
        self.0.children().find_map(List::cast)
    }
}

impl TemplateCall {
    pub fn name(&self) -> Option<String> {
        template_name(&self.0)
    }

    pub fn pipeline(&self) -> Option<Pipeline> {
        self.0.children().find_map(Pipeline::cast)
    }
}

impl Pipeline {
    pub fn decl(&self) -> Option<Decl> {
        self.0.children().find_map(Decl::cast)
    }

    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.0.children().filter_map(Command::cast)
    }
}

impl Decl {
    pub fn variables(&self) -> Vec<SyntaxToken> {
        tokens_of(&self.0, SyntaxKind::Variable).collect()
    }

    /// `=` rather than `:=`.
    pub fn is_assign(&self) -> bool {
        tokens_of(&self.0, SyntaxKind::Assign).next().is_some()
    }
}

impl Command {
    pub fn operands(&self) -> impl Iterator<Item = Operand> + '_ {
        self.0.children().filter_map(Operand::cast)
    }
}

impl VarExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        tokens_of(&self.0, SyntaxKind::Variable).next()
    }
}

impl FuncExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        tokens_of(&self.0, SyntaxKind::Identifier).next()
    }
}

impl ParenExpr {
    pub fn pipeline(&self) -> Option<Pipeline> {
        self.0.children().find_map(Pipeline::cast)
    }
}

impl LitExpr {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }

    /// Decoded value of a string or raw string literal.
    pub fn string_value(&self) -> Option<String> {
        let token = self.token()?;
        match token.kind() {
            SyntaxKind::Str | SyntaxKind::RawStr => literal::unquote(token.text()),
            _ => None,
        }
    }
}

fn tokens_of(node: &SyntaxNode, kind: SyntaxKind) -> impl Iterator<Item = SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(move |t| t.kind() == kind)
}

fn template_name(node: &SyntaxNode) -> Option<String> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| matches!(t.kind(), SyntaxKind::Str | SyntaxKind::RawStr))
        .and_then(|t| literal::unquote(t.text()))
}
