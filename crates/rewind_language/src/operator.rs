//! Operators, built-in functions, and methods known to the compiler.

use std::fmt;

/// Binary arithmetic and logical operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `//`
    FloorDiv,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `and`
    And,
    /// `or`
    Or,
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `in`
    In,
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `+`
    Pos,
    /// `!`
    Bang,
    /// `not`
    Not,
}

/// Assignment operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Set,
    /// `+=`
    Add,
    /// `-=`
    Sub,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, if any.
    #[must_use]
    pub const fn binary(self) -> Option<BinaryOp> {
        match self {
            Self::Set => None,
            Self::Add => Some(BinaryOp::Add),
            Self::Sub => Some(BinaryOp::Sub),
        }
    }
}

/// Built-in functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    /// `print(...)`
    Print,
    /// `len(x)`
    Len,
    /// `type(x)`
    Type,
    /// `input([prompt])`
    Input,
    /// `range(stop)`, `range(start, stop[, step])`
    Range,
    /// `int(x)`
    Int,
    /// `float(x)`
    Float,
    /// `str(x)`
    Str,
    /// `bool(x)`
    Bool,
    /// `list(x)`
    List,
}

impl Builtin {
    /// Looks up a built-in by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "print" => Self::Print,
            "len" => Self::Len,
            "type" => Self::Type,
            "input" => Self::Input,
            "range" => Self::Range,
            "int" => Self::Int,
            "float" => Self::Float,
            "str" => Self::Str,
            "bool" => Self::Bool,
            "list" => Self::List,
            _ => return None,
        })
    }

    /// The name the built-in is called by.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Len => "len",
            Self::Type => "type",
            Self::Input => "input",
            Self::Range => "range",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::List => "list",
        }
    }
}

/// List and string methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// `append(x)`
    Append,
    /// `count(x)`
    Count,
    /// `pop([i])`
    Pop,
    /// `sort()`
    Sort,
    /// `remove(x)`
    Remove,
    /// `index(x)`
    Index,
    /// `reverse()`
    Reverse,
    /// `contains(x)`
    Contains,
}

impl Method {
    /// Looks up a method by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "append" => Self::Append,
            "count" => Self::Count,
            "pop" => Self::Pop,
            "sort" => Self::Sort,
            "remove" => Self::Remove,
            "index" => Self::Index,
            "reverse" => Self::Reverse,
            "contains" => Self::Contains,
            _ => return None,
        })
    }

    /// The method's name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Count => "count",
            Self::Pop => "pop",
            Self::Sort => "sort",
            Self::Remove => "remove",
            Self::Index => "index",
            Self::Reverse => "reverse",
            Self::Contains => "contains",
        }
    }

    /// Returns true if the method changes its receiver in place.
    #[must_use]
    pub const fn mutates(self) -> bool {
        matches!(
            self,
            Self::Append | Self::Pop | Self::Sort | Self::Remove | Self::Reverse
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::And => "and",
            Self::Or => "or",
        })
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::In => "in",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Neg => "-",
            Self::Pos => "+",
            Self::Bang => "!",
            Self::Not => "not",
        })
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Set => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
        })
    }
}
