mod node;
mod walker;

pub use node::*;
pub use walker::*;

use crate::{Error, ErrorKind, FieldDescriptor, Result, ScalarType, Value};
use std::{
    fmt::Debug,
    sync::atomic::{AtomicU32, Ordering},
};

static NEXT_ARENA: AtomicU32 = AtomicU32::new(1);

/// Arena owning every expression and condition node of one statement.
///
/// Nodes are appended by the builder methods and never modified afterwards,
/// children are referenced through [`ExprId`] and [`CondId`]. Ids remember
/// the arena that created them, statements reject ids of another arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    arena: u32,
    exprs: Vec<ExprNode>,
    conds: Vec<WhereNode>,
}

impl Default for Ast {
    fn default() -> Self {
        Self {
            arena: NEXT_ARENA.fetch_add(1, Ordering::Relaxed),
            exprs: Vec::new(),
            conds: Vec::new(),
        }
    }
}

fn foreign(id: impl Debug) -> Error {
    ErrorKind::Usage.error(format!(
        "Node {:?} was created by another expression arena",
        id
    ))
}

impl Ast {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get_expr(&self, id: ExprId) -> Option<&ExprNode> {
        if id.arena != self.arena {
            return None;
        }
        self.exprs.get(id.index as usize)
    }

    pub fn get_cond(&self, id: CondId) -> Option<&WhereNode> {
        if id.arena != self.arena {
            return None;
        }
        self.conds.get(id.index as usize)
    }

    /// # Panics
    /// If `id` was created by another arena. Statements check their ids with
    /// [`Ast::check_expr`] before rendering them.
    pub fn expr(&self, id: ExprId) -> &ExprNode {
        match self.get_expr(id) {
            Some(v) => v,
            None => panic!("{:?} does not belong to expression arena {}", id, self.arena),
        }
    }

    /// # Panics
    /// If `id` was created by another arena, see [`Ast::check_cond`].
    pub fn cond(&self, id: CondId) -> &WhereNode {
        match self.get_cond(id) {
            Some(v) => v,
            None => panic!("{:?} does not belong to expression arena {}", id, self.arena),
        }
    }

    /// Usage error unless `id` and every node below it belong to this arena.
    pub fn check_expr(&self, id: ExprId) -> Result<()> {
        match self.get_expr(id).ok_or_else(|| foreign(id))? {
            ExprNode::UnaryOp { arg, .. } => self.check_expr(*arg),
            ExprNode::BinaryOp { lhs, rhs, .. } => {
                self.check_expr(*lhs)?;
                self.check_expr(*rhs)
            }
            ExprNode::FunctionCall { args, .. } => {
                args.iter().try_for_each(|v| self.check_expr(*v))
            }
            ExprNode::Column(..) | ExprNode::Literal(..) | ExprNode::Null(..) => Ok(()),
        }
    }

    /// Usage error unless `id` and every node below it belong to this arena.
    pub fn check_cond(&self, id: CondId) -> Result<()> {
        match self.get_cond(id).ok_or_else(|| foreign(id))? {
            WhereNode::Relational { lhs, rhs, .. } => {
                self.check_expr(*lhs)?;
                self.check_expr(*rhs)
            }
            WhereNode::LogicalNot(inner) => self.check_cond(*inner),
            WhereNode::Conditional { lhs, rhs, .. } => {
                self.check_cond(*lhs)?;
                self.check_cond(*rhs)
            }
        }
    }

    pub fn exprs_len(&self) -> usize {
        self.exprs.len()
    }

    pub fn conds_len(&self) -> usize {
        self.conds.len()
    }

    fn push_expr(&mut self, node: ExprNode) -> ExprId {
        self.exprs.push(node);
        ExprId {
            arena: self.arena,
            index: self.exprs.len() as u32 - 1,
        }
    }

    fn push_cond(&mut self, node: WhereNode) -> CondId {
        self.conds.push(node);
        CondId {
            arena: self.arena,
            index: self.conds.len() as u32 - 1,
        }
    }

    fn type_of(&self, id: ExprId) -> Result<ScalarType> {
        self.get_expr(id)
            .map(ExprNode::value_type)
            .ok_or_else(|| foreign(id))
    }

    pub fn column(&mut self, field: &FieldDescriptor) -> ExprId {
        self.push_expr(ExprNode::Column(field.into()))
    }

    pub fn literal(&mut self, value: impl Into<Value>) -> ExprId {
        self.push_expr(ExprNode::Literal(value.into()))
    }

    pub fn null(&mut self, ty: ScalarType) -> ExprId {
        self.push_expr(ExprNode::Null(ty))
    }

    pub fn unary(&mut self, op: UnaryOpType, arg: ExprId) -> Result<ExprId> {
        let arg_ty = self.type_of(arg)?;
        let valid = match op {
            UnaryOpType::Plus | UnaryOpType::Negative => arg_ty.is_numeric(),
            UnaryOpType::BitwiseNot => arg_ty.is_integral(),
        };
        if !valid {
            return Err(ErrorKind::Configuration.error(format!(
                "Operator {:?} is not applicable to a {} operand",
                op, arg_ty
            )));
        }
        Ok(self.push_expr(ExprNode::UnaryOp {
            op,
            arg,
            ty: arg_ty.promote(arg_ty),
        }))
    }

    pub fn binary(&mut self, op: BinaryOpType, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        let (l, r) = (self.type_of(lhs)?, self.type_of(rhs)?);
        let ty = if op == BinaryOpType::Concat {
            (l.is_text() && r.is_text()).then_some(ScalarType::Varchar)
        } else if op.is_integral() {
            (l.is_integral() && r.is_integral()).then(|| match op {
                BinaryOpType::ShiftLeft | BinaryOpType::ShiftRight => l.promote(l),
                _ => l.promote(r),
            })
        } else {
            (l.is_numeric() && r.is_numeric()).then(|| l.promote(r))
        };
        let Some(ty) = ty else {
            return Err(ErrorKind::Configuration.error(format!(
                "Operator {:?} is not applicable to {} and {} operands",
                op, l, r
            )));
        };
        Ok(self.push_expr(ExprNode::BinaryOp { op, lhs, rhs, ty }))
    }

    /// Function call typed as the promotion of its arguments.
    pub fn function_call(&mut self, name: impl Into<String>, args: Vec<ExprId>) -> ExprId {
        let ty = ScalarType::promote_all(args.iter().filter_map(|v| self.type_of(*v).ok()));
        self.function_call_as(name, args, ty)
    }

    /// Function call with an explicit result type (`COUNT`, `LOWER`, ...).
    pub fn function_call_as(
        &mut self,
        name: impl Into<String>,
        args: Vec<ExprId>,
        ty: ScalarType,
    ) -> ExprId {
        self.push_expr(ExprNode::FunctionCall {
            name: name.into(),
            args,
            ty,
        })
    }

    pub fn add(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::Addition, lhs, rhs)
    }
    pub fn sub(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::Subtraction, lhs, rhs)
    }
    pub fn mul(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::Multiplication, lhs, rhs)
    }
    pub fn div(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::Division, lhs, rhs)
    }
    pub fn rem(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::Remainder, lhs, rhs)
    }
    pub fn bit_and(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::BitwiseAnd, lhs, rhs)
    }
    pub fn bit_or(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::BitwiseOr, lhs, rhs)
    }
    pub fn bit_xor(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::BitwiseXor, lhs, rhs)
    }
    pub fn shl(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::ShiftLeft, lhs, rhs)
    }
    pub fn shr(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::ShiftRight, lhs, rhs)
    }
    pub fn concat(&mut self, lhs: ExprId, rhs: ExprId) -> Result<ExprId> {
        self.binary(BinaryOpType::Concat, lhs, rhs)
    }
    pub fn pos(&mut self, arg: ExprId) -> Result<ExprId> {
        self.unary(UnaryOpType::Plus, arg)
    }
    pub fn neg(&mut self, arg: ExprId) -> Result<ExprId> {
        self.unary(UnaryOpType::Negative, arg)
    }
    pub fn bit_not(&mut self, arg: ExprId) -> Result<ExprId> {
        self.unary(UnaryOpType::BitwiseNot, arg)
    }

    pub fn relational(&mut self, op: RelationalOp, lhs: ExprId, rhs: ExprId) -> Result<CondId> {
        let (l, r) = (self.type_of(lhs)?, self.type_of(rhs)?);
        let valid = match op {
            RelationalOp::Like => l.is_text() && r.is_text(),
            RelationalOp::IsNull | RelationalOp::IsNotNull => true,
            _ => l.family() == r.family(),
        };
        if !valid {
            return Err(ErrorKind::Configuration.error(format!(
                "Cannot compare {} and {} with {:?}",
                l, r, op
            )));
        }
        Ok(self.push_cond(WhereNode::Relational { op, lhs, rhs }))
    }

    pub fn eq(&mut self, lhs: ExprId, rhs: ExprId) -> Result<CondId> {
        self.relational(RelationalOp::Equal, lhs, rhs)
    }
    pub fn ne(&mut self, lhs: ExprId, rhs: ExprId) -> Result<CondId> {
        self.relational(RelationalOp::NotEqual, lhs, rhs)
    }
    pub fn lt(&mut self, lhs: ExprId, rhs: ExprId) -> Result<CondId> {
        self.relational(RelationalOp::Less, lhs, rhs)
    }
    pub fn le(&mut self, lhs: ExprId, rhs: ExprId) -> Result<CondId> {
        self.relational(RelationalOp::LessEqual, lhs, rhs)
    }
    pub fn gt(&mut self, lhs: ExprId, rhs: ExprId) -> Result<CondId> {
        self.relational(RelationalOp::Greater, lhs, rhs)
    }
    pub fn ge(&mut self, lhs: ExprId, rhs: ExprId) -> Result<CondId> {
        self.relational(RelationalOp::GreaterEqual, lhs, rhs)
    }
    pub fn like(&mut self, lhs: ExprId, rhs: ExprId) -> Result<CondId> {
        self.relational(RelationalOp::Like, lhs, rhs)
    }
    /// A foreign `arg` is reported when the condition enters a statement.
    pub fn is_null(&mut self, arg: ExprId) -> CondId {
        let rhs = self.null(self.type_of(arg).unwrap_or(ScalarType::Varchar));
        self.push_cond(WhereNode::Relational {
            op: RelationalOp::IsNull,
            lhs: arg,
            rhs,
        })
    }
    pub fn is_not_null(&mut self, arg: ExprId) -> CondId {
        let rhs = self.null(self.type_of(arg).unwrap_or(ScalarType::Varchar));
        self.push_cond(WhereNode::Relational {
            op: RelationalOp::IsNotNull,
            lhs: arg,
            rhs,
        })
    }

    pub fn not(&mut self, inner: CondId) -> CondId {
        self.push_cond(WhereNode::LogicalNot(inner))
    }
    pub fn and(&mut self, lhs: CondId, rhs: CondId) -> CondId {
        self.push_cond(WhereNode::Conditional {
            op: ConditionalOp::And,
            lhs,
            rhs,
        })
    }
    pub fn or(&mut self, lhs: CondId, rhs: CondId) -> CondId {
        self.push_cond(WhereNode::Conditional {
            op: ConditionalOp::Or,
            lhs,
            rhs,
        })
    }

    /// Convenience for `column = literal`, used by primary key lookups.
    pub fn column_eq(&mut self, field: &FieldDescriptor, value: Value) -> Result<CondId> {
        let lhs = self.column(field);
        let rhs = self.literal(value);
        self.eq(lhs, rhs)
    }
}

