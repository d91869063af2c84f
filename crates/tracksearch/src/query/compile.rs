//! Compilation of query expressions into matcher nodes.

use crate::options::CaseFolding;
use crate::types::NULL_SENTINEL;

use super::expression::{QueryExpression, QueryTerm};
use super::node::MatcherNode;
use super::text_match::Needle;

/// Compiles one AND-level of expressions, depth first and left to right.
///
/// Query content is case-folded here so that evaluation only folds record
/// values.
pub(crate) fn compile_expressions(
    expressions: &[QueryExpression],
    case: CaseFolding,
    keyword_tags: &[String],
) -> Vec<MatcherNode> {
    let compiler = Compiler { case, keyword_tags };
    compiler.compile_list(expressions)
}

struct Compiler<'a> {
    case: CaseFolding,
    keyword_tags: &'a [String],
}

impl Compiler<'_> {
    fn compile_list(&self, expressions: &[QueryExpression]) -> Vec<MatcherNode> {
        expressions
            .iter()
            .map(|expression| self.compile_expression(expression))
            .collect()
    }

    fn compile_expression(&self, expression: &QueryExpression) -> MatcherNode {
        match expression {
            QueryExpression::Term(term) => self.compile_term(term),
            QueryExpression::Not(inner) => {
                MatcherNode::Not(Box::new(self.compile_group(std::slice::from_ref(&**inner))))
            }
            QueryExpression::Or(left, right) => MatcherNode::Or(
                Box::new(self.compile_group(std::slice::from_ref(&**left))),
                Box::new(self.compile_group(std::slice::from_ref(&**right))),
            ),
            QueryExpression::Group(parts) => self.compile_group(parts),
        }
    }

    fn compile_group(&self, expressions: &[QueryExpression]) -> MatcherNode {
        MatcherNode::And(self.compile_list(expressions))
    }

    fn compile_term(&self, term: &QueryTerm) -> MatcherNode {
        match term {
            QueryTerm::Exact { tag, content } => MatcherNode::Exact {
                tag: tag.clone(),
                content: (content != NULL_SENTINEL).then(|| self.fold(content)),
            },
            QueryTerm::Contains { tag, content } => MatcherNode::Substring {
                tag: tag.clone(),
                needle: Needle::new(self.fold(content)),
            },
            QueryTerm::Keyword(content) => MatcherNode::Keyword {
                tags: self.keyword_tags.to_vec(),
                needle: Needle::new(self.fold(content)),
            },
        }
    }

    fn fold(&self, content: &str) -> String {
        self.case.fold(content).into_owned()
    }
}
