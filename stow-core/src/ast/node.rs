use crate::{FieldDescriptor, ScalarType, Value};

/// Index of an expression node, tagged with the [`Ast`](crate::Ast) that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId {
    pub(crate) arena: u32,
    pub(crate) index: u32,
}

/// Index of a where-clause node, tagged with the [`Ast`](crate::Ast) that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CondId {
    pub(crate) arena: u32,
    pub(crate) index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: &'static str,
    pub name: &'static str,
    pub scalar_type: ScalarType,
}

impl From<&FieldDescriptor> for ColumnRef {
    fn from(value: &FieldDescriptor) -> Self {
        Self {
            table: value.table,
            name: value.name,
            scalar_type: value.scalar_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Column,
    Literal,
    Null,
    UnaryOp,
    BinaryOp,
    FunctionCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpType {
    Plus,
    Negative,
    BitwiseNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpType {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Remainder,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
    Concat,
}

impl BinaryOpType {
    /// Operations only defined on integral operands.
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            BinaryOpType::Remainder
                | BinaryOpType::BitwiseAnd
                | BinaryOpType::BitwiseOr
                | BinaryOpType::BitwiseXor
                | BinaryOpType::ShiftLeft
                | BinaryOpType::ShiftRight
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Like,
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Column(ColumnRef),
    Literal(Value),
    Null(ScalarType),
    UnaryOp {
        op: UnaryOpType,
        arg: ExprId,
        ty: ScalarType,
    },
    BinaryOp {
        op: BinaryOpType,
        lhs: ExprId,
        rhs: ExprId,
        ty: ScalarType,
    },
    FunctionCall {
        name: String,
        args: Vec<ExprId>,
        ty: ScalarType,
    },
}

impl ExprNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            ExprNode::Column(..) => NodeKind::Column,
            ExprNode::Literal(..) => NodeKind::Literal,
            ExprNode::Null(..) => NodeKind::Null,
            ExprNode::UnaryOp { .. } => NodeKind::UnaryOp,
            ExprNode::BinaryOp { .. } => NodeKind::BinaryOp,
            ExprNode::FunctionCall { .. } => NodeKind::FunctionCall,
        }
    }

    pub fn value_type(&self) -> ScalarType {
        match self {
            ExprNode::Column(v) => v.scalar_type,
            ExprNode::Literal(v) => v.scalar_type(),
            ExprNode::Null(ty)
            | ExprNode::UnaryOp { ty, .. }
            | ExprNode::BinaryOp { ty, .. }
            | ExprNode::FunctionCall { ty, .. } => *ty,
        }
    }

    /// Leaves never need parentheses when used as operands. A function call
    /// counts as a leaf, its arguments are already delimited.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, ExprNode::UnaryOp { .. } | ExprNode::BinaryOp { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhereNode {
    Relational {
        op: RelationalOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    LogicalNot(CondId),
    Conditional {
        op: ConditionalOp,
        lhs: CondId,
        rhs: CondId,
    },
}

impl WhereNode {
    /// Requires parentheses when nested under AND, OR or NOT.
    pub fn complex(&self) -> bool {
        matches!(self, WhereNode::Conditional { .. })
    }
}
