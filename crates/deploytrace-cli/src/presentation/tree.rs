use deploytrace_types::DeploymentNode;

const BULLET: &str = "⬤ ";
const BRANCH: &str = "┃";
const LAST_BRANCH: &str = "┗";
const RULE: &str = "━━";
const CONTINUATION: &str = "┃  ";
const BLANK: &str = "   ";

/// Render the tree as an ASCII waterfall.
///
/// Resources come first under each deployment, in source order; nested
/// deployments follow, ordered by end time. Every line ends with `\n`.
pub fn draw_tree(root: &DeploymentNode) -> String {
    let mut out = String::new();
    draw_node(&mut out, root, false, "", "");
    out
}

fn draw_node(
    out: &mut String,
    node: &DeploymentNode,
    has_next_sibling: bool,
    parent_prefix: &str,
    prefix: &str,
) {
    if !prefix.is_empty() {
        out.push_str(parent_prefix);
        out.push_str(if has_next_sibling { BRANCH } else { LAST_BRANCH });
        out.push_str(RULE);
    }
    out.push_str(BULLET);
    out.push_str(node.resource_group.as_deref().unwrap_or_default());
    out.push('/');
    out.push_str(&node.name);
    out.push('\n');

    let resource_count = node.resources.len();
    for (i, resource) in node.resources.iter().enumerate() {
        let closes_node = i + 1 == resource_count && node.child_deployments.is_empty();
        out.push_str(prefix);
        out.push_str(if closes_node { LAST_BRANCH } else { BRANCH });
        out.push_str(RULE);
        out.push_str(BULLET);
        out.push_str(&resource.name);
        out.push('\n');
    }

    let mut children: Vec<&DeploymentNode> = node.child_deployments.iter().collect();
    children.sort_by_key(|child| child.window.end());

    let child_count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let more = i + 1 < child_count;
        let child_prefix = format!("{}{}", prefix, if more { CONTINUATION } else { BLANK });
        draw_node(out, child, more, prefix, &child_prefix);
        if more {
            out.push_str(child_prefix.trim_end());
            out.push('\n');
        }
    }
}
