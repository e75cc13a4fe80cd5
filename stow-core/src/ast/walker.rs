use crate::{Ast, ColumnRef, CondId, ExprId, ExprNode, WhereNode};
use std::collections::BTreeSet;

/// Either kind of node, the unit visited by [`Ast::walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Expr(ExprId),
    Cond(CondId),
}

impl From<ExprId> for NodeRef {
    fn from(value: ExprId) -> Self {
        NodeRef::Expr(value)
    }
}

impl From<CondId> for NodeRef {
    fn from(value: CondId) -> Self {
        NodeRef::Cond(value)
    }
}

impl Ast {
    /// Pre-order, left to right traversal of the tree rooted at `root`.
    pub fn walk(&self, root: impl Into<NodeRef>, mut f: impl FnMut(NodeRef)) {
        let mut stack = vec![root.into()];
        while let Some(node) = stack.pop() {
            f(node);
            let len = stack.len();
            match node {
                NodeRef::Expr(id) => match self.expr(id) {
                    ExprNode::Column(..) | ExprNode::Literal(..) | ExprNode::Null(..) => {}
                    ExprNode::UnaryOp { arg, .. } => stack.push((*arg).into()),
                    ExprNode::BinaryOp { lhs, rhs, .. } => {
                        stack.push((*lhs).into());
                        stack.push((*rhs).into());
                    }
                    ExprNode::FunctionCall { args, .. } => {
                        stack.extend(args.iter().map(|v| NodeRef::Expr(*v)))
                    }
                },
                NodeRef::Cond(id) => match self.cond(id) {
                    WhereNode::Relational { lhs, rhs, .. } => {
                        stack.push((*lhs).into());
                        stack.push((*rhs).into());
                    }
                    WhereNode::LogicalNot(inner) => stack.push((*inner).into()),
                    WhereNode::Conditional { lhs, rhs, .. } => {
                        stack.push((*lhs).into());
                        stack.push((*rhs).into());
                    }
                },
            }
            stack[len..].reverse();
        }
    }

    /// Columns in the order they appear in the text.
    pub fn referenced_columns(&self, root: impl Into<NodeRef>) -> Vec<&ColumnRef> {
        let mut result = Vec::new();
        self.walk(root, |node| {
            if let NodeRef::Expr(id) = node {
                if let ExprNode::Column(column) = self.expr(id) {
                    result.push(column);
                }
            }
        });
        result
    }

    pub fn referenced_tables(&self, root: impl Into<NodeRef>) -> BTreeSet<&'static str> {
        self.referenced_columns(root)
            .into_iter()
            .map(|v| v.table)
            .collect()
    }

    pub fn count_literals(&self, root: impl Into<NodeRef>) -> usize {
        let mut result = 0;
        self.walk(root, |node| {
            if let NodeRef::Expr(id) = node {
                if matches!(self.expr(id), ExprNode::Literal(..)) {
                    result += 1;
                }
            }
        });
        result
    }
}
