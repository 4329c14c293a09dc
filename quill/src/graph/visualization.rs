//! Graph visualization: Graphviz DOT and plain-text renderings of the topology.
//!
//! Static edges are drawn solid, router targets dashed. Routers without a path
//! map have no known targets and are drawn as a dotted self-note.

use std::fmt::Write;

use super::conditional::NextEntry;
use super::CompiledStateGraph;
use super::{END, START};

/// Outgoing edges of `node_id`: (target, conditional).
fn outgoing<S>(graph: &CompiledStateGraph<S>, node_id: &str) -> Vec<(String, bool)>
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    match graph.next_map.get(node_id) {
        Some(NextEntry::Unconditional(to)) => vec![(to.clone(), false)],
        Some(NextEntry::Conditional(router)) => {
            router.targets().into_iter().map(|t| (t, true)).collect()
        }
        None => Vec::new(),
    }
}

/// Generate Graphviz DOT format representation of the graph.
pub fn generate_dot<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    let mut dot = String::from("digraph {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=box];\n\n");
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"START\", style=bold, fillcolor=lightgreen];",
        START
    );
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"END\", style=bold, fillcolor=lightcoral];",
        END
    );
    for node_id in graph.node_ids() {
        let _ = writeln!(dot, "  \"{}\";", node_id);
    }
    dot.push('\n');

    let _ = writeln!(dot, "  \"{}\" -> \"{}\";", START, graph.first_node_id);
    for node_id in graph.node_ids() {
        for (to, conditional) in outgoing(graph, node_id) {
            if conditional {
                let _ = writeln!(dot, "  \"{}\" -> \"{}\" [style=dashed];", node_id, to);
            } else {
                let _ = writeln!(dot, "  \"{}\" -> \"{}\";", node_id, to);
            }
        }
    }

    dot.push_str("}\n");
    dot
}

/// Generate a plain-text listing of nodes and their transitions.
pub fn generate_text<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    let mut text = String::new();
    let _ = writeln!(text, "Graph Structure:");
    let _ = writeln!(text, "Nodes: {}", graph.nodes.len());
    let _ = writeln!(text, "Max steps: {}", graph.max_steps);
    let _ = writeln!(text, "\nTransitions:");
    let _ = writeln!(text, "  {} -> {}", START, graph.first_node_id);
    for node_id in graph.node_ids() {
        let edges = outgoing(graph, node_id);
        match graph.next_map.get(node_id) {
            Some(NextEntry::Conditional(_)) if edges.is_empty() => {
                let _ = writeln!(text, "  {} -> ? (router)", node_id);
            }
            Some(NextEntry::Conditional(_)) => {
                let targets: Vec<String> = edges.into_iter().map(|(t, _)| t).collect();
                let _ = writeln!(text, "  {} -> {{{}}} (router)", node_id, targets.join(" | "));
            }
            _ => {
                for (to, _) in edges {
                    let _ = writeln!(text, "  {} -> {}", node_id, to);
                }
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::error::AgentError;
    use crate::graph::{Next, Node, StateGraph};

    struct Pass(&'static str);

    #[async_trait]
    impl Node<String> for Pass {
        fn id(&self) -> &str {
            self.0
        }
        async fn run(&self, state: String) -> Result<(String, Next), AgentError> {
            Ok((state, Next::Continue))
        }
    }

    fn looping_graph() -> CompiledStateGraph<String> {
        let mut graph = StateGraph::<String>::new();
        graph
            .add_node("agent", Arc::new(Pass("agent")))
            .add_node("tools", Arc::new(Pass("tools")))
            .add_edge(START, "agent")
            .add_edge("tools", "agent")
            .add_conditional_edges(
                "agent",
                Arc::new(|_| END.to_string()),
                Some(
                    [
                        ("tools".to_string(), "tools".to_string()),
                        (END.to_string(), END.to_string()),
                    ]
                    .into_iter()
                    .collect(),
                ),
            );
        graph.compile().unwrap()
    }

    #[test]
    fn test_generate_dot() {
        let dot = generate_dot(&looping_graph());
        assert!(dot.contains("digraph"));
        assert!(dot.contains("START"));
        assert!(dot.contains("END"));
        assert!(dot.contains("\"tools\" -> \"agent\";"));
        assert!(dot.contains("\"agent\" -> \"tools\" [style=dashed];"));
    }

    #[test]
    fn test_generate_text() {
        let text = generate_text(&looping_graph());
        assert!(text.contains("Graph Structure"));
        assert!(text.contains("Nodes: 2"));
        assert!(text.contains("tools -> agent"));
        assert!(text.contains("(router)"));
    }
}
