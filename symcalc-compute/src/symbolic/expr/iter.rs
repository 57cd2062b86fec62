use super::{ExprArena, ExprId};

/// An iterator that traverses the tree rooted at a node in left-to-right post-order (children
/// before their parent).
///
/// A subtree shared by several parents is visited once per parent.
///
/// This iterator is created by [`ExprArena::post_order`].
pub struct PostOrder<'a> {
    arena: &'a ExprArena,

    /// Nodes still to be visited, paired with whether their children were already pushed.
    stack: Vec<(ExprId, bool)>,
}

impl<'a> PostOrder<'a> {
    /// Creates an iterator over the tree rooted at the given node.
    pub fn new(arena: &'a ExprArena, root: ExprId) -> Self {
        Self {
            arena,
            stack: vec![(root, false)],
        }
    }
}

impl Iterator for PostOrder<'_> {
    type Item = ExprId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, expanded) = self.stack.pop()?;
            if expanded {
                return Some(id);
            }

            let children = self.arena.get(id).children();
            self.stack.push((id, true));
            for child in children.into_iter().rev() {
                self.stack.push((child, false));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn post_order() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("a * (b + c) - d").unwrap();
        let names = arena.post_order(expr)
            .map(|id| arena.node(id).to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![
            "a",
            "b",
            "c",
            "b + c",
            "a * (b + c)",
            "d",
            "a * (b + c) - d",
        ]);
    }
}
