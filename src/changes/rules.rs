//! Rule-result transfer from the left document's graph.

use super::prune::ChangeNode;
use crate::graph::SemanticGraph;

/// Copy rule results from left-graph nodes onto the pruned nodes with the
/// same id. Returns the number of results copied.
pub fn transfer_rule_results(left: &SemanticGraph<'_>, tree: &mut ChangeNode) -> usize {
    let mut copied = 0;
    if !tree.id.is_empty() {
        if let Some(node) = left.find(&tree.id) {
            copied += node.rule_results.len();
            tree.push_rule_results(node.rule_results.iter().cloned());
        }
    }
    for child in tree.children_mut() {
        copied += transfer_rule_results(left, child);
    }
    copied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{RuleResult, RuleSeverity};
    use crate::parsers::parse_document_str;

    #[test]
    fn test_results_follow_node_ids() {
        let parsed = parse_document_str("openapi: 3.1.0\ninfo:\n  title: a\n").unwrap();
        let mut left = SemanticGraph::build(&parsed.document);
        left.attach_rule_result(RuleResult {
            rule_id: "info-description".to_string(),
            severity: RuleSeverity::Warn,
            message: "info has no description".to_string(),
            path: "$.info".to_string(),
        });

        let mut tree = ChangeNode::flat(left.find("$").unwrap());
        tree.children.push(ChangeNode::flat(left.find("$.info").unwrap()));
        // flat copies carry the left results already; start clean
        tree.children[0].rule_results.clear();

        assert_eq!(transfer_rule_results(&left, &mut tree), 1);
        assert_eq!(tree.children[0].rule_results[0].rule_id, "info-description");
        assert!(tree.rule_results.is_empty());
    }
}
