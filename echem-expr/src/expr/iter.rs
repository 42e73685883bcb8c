use super::Expr;

/// An iterator that iteratively traverses the tree of expressions in left-to-right post-order
/// (i.e. depth-first).
///
/// This iterator is created by [`Expr::post_order_iter`].
pub struct ExprIter<'a> {
    stack: Vec<&'a Expr>,
    last_visited: Option<&'a Expr>,
}

impl<'a> ExprIter<'a> {
    /// Creates a new iterator that traverses the tree of expressions in left-to-right post-order
    /// (i.e. depth-first).
    pub fn new(expr: &'a Expr) -> Self {
        Self {
            stack: vec![expr],
            last_visited: None,
        }
    }

    /// Pops the current expression in the stack and marks it as the last visited expression.
    fn visit(&mut self) -> Option<&'a Expr> {
        self.last_visited = Some(self.stack.pop()?);
        self.last_visited
    }

    /// Returns true if the given handle is the last visited handle.
    ///
    /// Handles are compared by address, not by the node they point to, so that a node shared by
    /// several parents is still visited once per parent.
    fn is_last_visited(&self, expr: &'a Expr) -> bool {
        match self.last_visited {
            Some(last_visited) => std::ptr::eq(last_visited, expr),
            None => false,
        }
    }
}

impl<'a> Iterator for ExprIter<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let expr = *self.stack.last()?;
            let children = expr.children();
            match children.last() {
                Some(last) if !self.is_last_visited(last) => {
                    for child in children.iter().rev() {
                        self.stack.push(child);
                    }
                },
                _ => return self.visit(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn post_order() {
        let a = Expr::parameter("a");
        let c = Expr::variable("c");
        let expr = &a * c.gradient() + 1.0;
        let visited = expr.post_order_iter().map(|e| e.to_string()).collect::<Vec<_>>();
        assert_eq!(visited, vec![
            "a",
            "c",
            "grad(c)",
            "a * grad(c)",
            "1",
            "a * grad(c) + 1",
        ]);
    }

    #[test]
    fn shared_subtree() {
        // the same node appears twice; it must be visited once per occurrence
        let shared = -Expr::parameter("a");
        let expr = &shared + &shared;
        let visited = expr.post_order_iter().map(|e| e.to_string()).collect::<Vec<_>>();
        assert_eq!(visited, vec!["a", "-a", "a", "-a", "-a + -a"]);
    }
}
