use rhizome_formula_expression::{Expression, List, Symbol};

use crate::binder::{BindError, Binder, Bindable};

/// A list of alternating keys and values, e.g. `(:name "x" :arity 2)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationList {
    list: List,
}

impl AssociationList {
    pub fn parse(list: &List) -> Result<Self, BindError> {
        if list.len() % 2 != 0 {
            return Err(BindError::OddAssociationList {
                len: list.len(),
                expression: list.expression_string(),
            });
        }
        Ok(AssociationList { list: list.clone() })
    }

    /// Number of key/value pairs.
    pub fn len(&self) -> usize {
        self.list.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the value of the first pair whose key is `key`.
    pub fn lookup_symbol(&self, key: &Symbol) -> Option<&Expression> {
        self.lookup(|candidate| candidate.symbol() == Some(key))
    }

    /// Returns the value of the first pair whose key satisfies `predicate`.
    pub fn lookup(&self, predicate: impl Fn(&Expression) -> bool) -> Option<&Expression> {
        self.pairs()
            .find(|(key, _)| predicate(key))
            .map(|(_, value)| value)
    }

    /// Key/value pairs in list order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Expression, &Expression)> + '_ {
        self.list
            .as_slice()
            .chunks_exact(2)
            .map(|pair| (&pair[0], &pair[1]))
    }
}

impl Bindable for AssociationList {
    fn bind_composite(
        expr: &Expression,
        dst: &mut Self,
        _binder: &Binder,
    ) -> Option<Result<(), BindError>> {
        let Some(list) = expr.as_list() else {
            return Some(Err(BindError::NotAList {
                destination: "AssociationList",
                expression: expr.expression_string(),
            }));
        };
        Some(AssociationList::parse(list).map(|alist| *dst = alist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhizome_formula_expression::must_parse;

    fn alist(text: &str) -> AssociationList {
        AssociationList::parse(must_parse(text).as_list().unwrap()).unwrap()
    }

    #[test]
    fn test_lookup_symbol() {
        let al = alist(r#"(:name "plus" :arity 2 :name "shadowed")"#);
        assert_eq!(al.len(), 3);
        assert_eq!(
            al.lookup_symbol(&Symbol::keyword("name")),
            Some(&Expression::from_string("plus"))
        );
        assert_eq!(
            al.lookup_symbol(&Symbol::keyword("arity")),
            Some(&Expression::from_int(2))
        );
        assert_eq!(al.lookup_symbol(&Symbol::unqualified("arity")), None);
    }

    #[test]
    fn test_values_are_not_keys() {
        let al = alist("(a b c d)");
        assert_eq!(al.lookup_symbol(&Symbol::unqualified("b")), None);
        assert_eq!(
            al.lookup_symbol(&Symbol::unqualified("c")),
            Some(&Expression::from_symbol(Symbol::unqualified("d")))
        );
    }

    #[test]
    fn test_lookup_predicate() {
        let al = alist(r#"(1 "one" 2 "two")"#);
        let found = al.lookup(|key| key == &Expression::from_int(2));
        assert_eq!(found.and_then(Expression::as_str), Some("two"));
    }

    #[test]
    fn test_odd_length_is_error() {
        let list = must_parse("(:a 1 :b)");
        let err = AssociationList::parse(list.as_list().unwrap()).unwrap_err();
        assert!(matches!(err, BindError::OddAssociationList { len: 3, .. }));
    }

    #[test]
    fn test_empty() {
        let al = alist("()");
        assert!(al.is_empty());
        assert_eq!(al.lookup(|_| true), None);
    }
}
