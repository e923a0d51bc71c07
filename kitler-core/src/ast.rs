use std::fmt;
use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
}

/// A statement together with the 1-based position of the token that
/// introduced it, kept for diagnostics.
#[derive(Debug, PartialEq, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StatementKind {
    Including {
        library: Rc<str>,
        is_priority: bool,
    },
    /// Reserved: no grammar rule produces this yet.
    ProjectSpace {
        name: Rc<str>,
        children: Vec<Statement>,
    },
    VarDecl {
        name: Rc<str>,
        initializer: Option<Expression>,
    },
    /// The parameter list and body live behind `Rc` so function values can
    /// share them without duplicating the tree.
    FuncDecl {
        name: Rc<str>,
        params: Rc<[Rc<str>]>,
        body: Rc<Block>,
        is_async: bool,
    },
    /// Reserved: no grammar rule produces this yet.
    ClassDecl {
        name: Rc<str>,
        members: Vec<Statement>,
    },
    /// Reserved: no grammar rule produces this yet.
    EventDecl {
        name: Rc<str>,
        params: Rc<[Rc<str>]>,
    },
    If {
        condition: Expression,
        then_branch: Block,
        else_branch: Option<Block>,
    },
    While {
        condition: Expression,
        body: Block,
    },
    /// Parsed for both `for` and `foreach`; not interpreted yet.
    For {
        iterator: Rc<str>,
        iterable: Expression,
        body: Block,
    },
    /// Reserved: no grammar rule produces this yet.
    Switch {
        scrutinee: Expression,
        cases: Vec<(Expression, Block)>,
        default: Option<Block>,
    },
    Return(Option<Expression>),
    Break,
    Assign {
        target: Expression,
        value: Expression,
    },
    Expression(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExpressionKind {
    Literal(Literal),
    Identifier(Rc<str>),
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Reserved: the grammar has no prefix rule producing these.
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    /// A single, non-chainable `.member` postfix on an identifier. Mostly
    /// vestigial because the lexer folds dotted names into one identifier.
    MemberAccess {
        object: Box<Expression>,
        member: Rc<str>,
    },
    /// Reserved: no grammar rule produces this yet.
    IndexAccess {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    /// Reserved: no grammar rule produces this yet.
    ListLiteral(Vec<Expression>),
    /// Reserved: no grammar rule produces this yet.
    MapLiteral(Vec<(Rc<str>, Expression)>),
    /// Reserved: no grammar rule produces this yet.
    NewInstance {
        class_name: Rc<str>,
        args: Vec<Expression>,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Number(f64),
    Str(Rc<str>),
    Bool(bool),
    Null,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        })
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(value) => write!(f, "{value}"),
            Literal::Str(value) => write!(f, "\"{value}\""),
            Literal::Bool(value) => write!(f, "{value}"),
            Literal::Null => f.write_str("null"),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionKind::Literal(literal) => write!(f, "{literal}"),
            ExpressionKind::Identifier(name) => f.write_str(name),
            ExpressionKind::Binary { op, left, right } => {
                write!(f, "({left} {op} {right})")
            }
            ExpressionKind::Unary { op, operand } => write!(f, "({op}{operand})"),
            ExpressionKind::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_joined(f, args)?;
                f.write_str(")")
            }
            ExpressionKind::MemberAccess { object, member } => {
                write!(f, "{object}.{member}")
            }
            ExpressionKind::IndexAccess { object, index } => {
                write!(f, "{object}[{index}]")
            }
            ExpressionKind::ListLiteral(elements) => {
                f.write_str("[")?;
                write_joined(f, elements)?;
                f.write_str("]")
            }
            ExpressionKind::MapLiteral(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            ExpressionKind::NewInstance { class_name, args } => {
                write!(f, "New {class_name}(")?;
                write_joined(f, args)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StatementKind::Including { library, is_priority } => {
                write!(f, "including {library}")?;
                if *is_priority {
                    f.write_str("#")?;
                }
                Ok(())
            }
            StatementKind::ProjectSpace { name, .. } => write!(f, "projectSpace {name}"),
            StatementKind::VarDecl { name, initializer } => match initializer {
                Some(value) => write!(f, "NewVar {name} = {value}"),
                None => write!(f, "NewVar {name}"),
            },
            StatementKind::FuncDecl {
                name,
                params,
                body,
                is_async,
            } => {
                let keyword = if *is_async { "NewAsync" } else { "NewFunc" };
                write!(f, "{keyword} {name}(")?;
                write_joined(f, params)?;
                write!(f, ") ( {body} )")
            }
            StatementKind::ClassDecl { name, .. } => write!(f, "NewClass {name}"),
            StatementKind::EventDecl { name, .. } => write!(f, "NewEvent {name}"),
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                write!(f, "if {condition} run: {then_branch}")?;
                if let Some(else_branch) = else_branch {
                    write!(f, " else: {else_branch}")?;
                }
                f.write_str(" end")
            }
            StatementKind::While { condition, body } => {
                write!(f, "while {condition} run: {body} end")
            }
            StatementKind::For {
                iterator,
                iterable,
                body,
            } => write!(f, "for {iterator} in {iterable} run: {body} end"),
            StatementKind::Switch { scrutinee, .. } => write!(f, "switch {scrutinee}"),
            StatementKind::Return(Some(value)) => write!(f, "return {value}"),
            StatementKind::Return(None) => f.write_str("return"),
            StatementKind::Break => f.write_str("break"),
            StatementKind::Assign { target, value } => write!(f, "{target} = {value}"),
            StatementKind::Expression(expression) => write!(f, "{expression}"),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}
