//! Filter expression tree and its combinators

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use super::predicate::Predicate;

/// Boolean operator of a composite node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    And,
    Or,
    Not,
}

impl OperatorKind {
    /// Wire name of the operator (`"and"`, `"or"`, `"not"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite node.
///
/// Fields are private: `Not` always has exactly one child and `And`/`Or`
/// always have at least one, which only the combinators can guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    kind: OperatorKind,
    children: Vec<FilterExpression>,
}

impl Operator {
    pub(crate) fn junction(kind: OperatorKind, children: Vec<FilterExpression>) -> Self {
        debug_assert!(kind != OperatorKind::Not, "junction built with NOT");
        debug_assert!(!children.is_empty(), "junction built without children");
        Self { kind, children }
    }

    pub(crate) fn negation(child: FilterExpression) -> Self {
        Self {
            kind: OperatorKind::Not,
            children: vec![child],
        }
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    pub fn children(&self) -> &[FilterExpression] {
        &self.children
    }

    /// The operand of a `Not` node
    fn into_operand(self) -> FilterExpression {
        debug_assert_eq!(self.kind, OperatorKind::Not);
        let mut children = self.children;
        children.swap_remove(0)
    }
}

/// A boolean filter over dimension values.
///
/// Combinators take `self` by value and hand back the expression to keep
/// using. When the receiver is already an operator of the requested kind the
/// new operand is appended to it (`a.and(b).and(c)` is one `and` node with
/// three fields); otherwise a new node owns both operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    Predicate(Predicate),
    Operator(Operator),
}

impl FilterExpression {
    /// Conjunction, flattening into an existing `and` receiver
    pub fn and(self, other: impl Into<FilterExpression>) -> Self {
        self.combine(OperatorKind::And, other.into())
    }

    /// Disjunction, flattening into an existing `or` receiver
    pub fn or(self, other: impl Into<FilterExpression>) -> Self {
        self.combine(OperatorKind::Or, other.into())
    }

    /// Negation. Negating a `not` node yields its operand.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        match self {
            Self::Operator(op) if op.kind == OperatorKind::Not => op.into_operand(),
            expr => Self::Operator(Operator::negation(expr)),
        }
    }

    fn combine(self, kind: OperatorKind, other: FilterExpression) -> Self {
        match self {
            Self::Operator(mut op) if op.kind == kind => {
                op.children.push(other);
                Self::Operator(op)
            }
            expr => Self::Operator(Operator::junction(kind, vec![expr, other])),
        }
    }

    /// Operator kind of a composite node, `None` for a predicate
    pub fn kind(&self) -> Option<OperatorKind> {
        match self {
            Self::Predicate(_) => None,
            Self::Operator(op) => Some(op.kind),
        }
    }

    pub fn as_predicate(&self) -> Option<&Predicate> {
        match self {
            Self::Predicate(p) => Some(p),
            Self::Operator(_) => None,
        }
    }

    pub fn as_operator(&self) -> Option<&Operator> {
        match self {
            Self::Predicate(_) => None,
            Self::Operator(op) => Some(op),
        }
    }
}

impl From<Predicate> for FilterExpression {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

impl<T: Into<FilterExpression>> BitAnd<T> for FilterExpression {
    type Output = FilterExpression;

    fn bitand(self, rhs: T) -> Self::Output {
        self.and(rhs)
    }
}

impl<T: Into<FilterExpression>> BitOr<T> for FilterExpression {
    type Output = FilterExpression;

    fn bitor(self, rhs: T) -> Self::Output {
        self.or(rhs)
    }
}

impl Not for FilterExpression {
    type Output = FilterExpression;

    fn not(self) -> Self::Output {
        FilterExpression::not(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::predicate;

    fn sel(dimension: &str, value: &str) -> FilterExpression {
        predicate(dimension).equals(value).unwrap()
    }

    #[test]
    fn and_chain_flattens_into_one_node() {
        let expr = sel("a", "1").and(sel("b", "2")).and(sel("c", "3"));

        let op = expr.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::And);
        assert_eq!(
            op.children(),
            &[sel("a", "1"), sel("b", "2"), sel("c", "3")]
        );
    }

    #[test]
    fn or_chain_flattens_into_one_node() {
        let expr = sel("a", "1").or(sel("b", "2")).or(sel("c", "3"));

        let op = expr.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::Or);
        assert_eq!(op.children().len(), 3);
    }

    #[test]
    fn mismatched_kind_wraps_instead_of_merging() {
        let and = sel("a", "1").and(sel("b", "2"));
        let expr = and.clone().or(sel("c", "3"));

        let op = expr.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::Or);
        assert_eq!(op.children(), &[and, sel("c", "3")]);
    }

    #[test]
    fn and_does_not_flatten_right_operand() {
        let right = sel("b", "2").and(sel("c", "3"));
        let expr = sel("a", "1").and(right.clone());

        let op = expr.as_operator().unwrap();
        assert_eq!(op.children(), &[sel("a", "1"), right]);
    }

    #[test]
    fn not_wraps_predicate() {
        let expr = sel("a", "1").not();

        let op = expr.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::Not);
        assert_eq!(op.children(), &[sel("a", "1")]);
    }

    #[test]
    fn double_negation_returns_original() {
        let original = sel("a", "1").or(sel("b", "2"));
        assert_eq!(original.clone().not().not(), original);
    }

    #[test]
    fn not_of_junction_wraps_whole_node() {
        let and = sel("a", "1").and(sel("b", "2"));
        let expr = and.clone().not();

        assert_eq!(expr.kind(), Some(OperatorKind::Not));
        assert_eq!(expr.as_operator().unwrap().children(), &[and]);
    }

    #[test]
    fn operator_overloads_match_methods() {
        let by_ops = (sel("a", "1") & sel("b", "2")) | !sel("c", "3");
        let by_methods = sel("a", "1")
            .and(sel("b", "2"))
            .or(sel("c", "3").not());
        assert_eq!(by_ops, by_methods);
    }

    #[test]
    fn kind_of_predicate_is_none() {
        assert_eq!(sel("a", "1").kind(), None);
        assert!(sel("a", "1").as_predicate().is_some());
    }
}
