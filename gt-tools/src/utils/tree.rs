//! Tree rendering for joint hierarchies

use console::Style;
use gt_anim::Skeleton;

use super::table::format_vec3;

/// A node in a rendered tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    /// Key/value pairs shown under (or beside) the node, in insertion order
    pub metadata: Vec<(String, String)>,
}

/// Kinds of nodes in a joint tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// The skeleton itself
    Skeleton,
    /// A joint without a parent
    Root,
    /// A joint with children
    Joint,
    /// A joint without children
    Leaf,
}

/// Options for tree rendering
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
    pub compact: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            no_color: false,
            show_metadata: true,
            compact: false,
        }
    }
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(name: String, node_type: NodeType) -> Self {
        Self {
            name,
            node_type,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }
}

impl NodeType {
    /// Marker drawn before the node name
    pub fn icon(self) -> &'static str {
        match self {
            Self::Skeleton => "🦴",
            Self::Root => "◉",
            Self::Joint => "●",
            Self::Leaf => "○",
        }
    }

    /// Color style for the node name
    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                Self::Skeleton => Style::new().bold().cyan(),
                Self::Root => Style::new().bold().yellow(),
                Self::Joint => Style::new().green(),
                Self::Leaf => Style::new().white(),
            }
        }
    }
}

/// Build the joint tree of `skeleton` below a node named after the skeleton
///
/// Children always sit after their parent in canonical order, so walking the
/// joints backwards finishes every subtree before its parent needs it.
pub fn skeleton_tree(skeleton: &Skeleton) -> TreeNode {
    let mut built: Vec<Option<TreeNode>> = vec![None; skeleton.len()];

    for index in (0..skeleton.len()).rev() {
        let joint = &skeleton.joints()[index];
        let children: Vec<TreeNode> = skeleton
            .children_of(index)
            .filter_map(|child| built[child].take())
            .collect();

        let node_type = if joint.is_root() {
            NodeType::Root
        } else if children.is_empty() {
            NodeType::Leaf
        } else {
            NodeType::Joint
        };

        let mut node = TreeNode::new(skeleton.joint_name(index).to_string(), node_type)
            .with_metadata("index", &index.to_string())
            .with_metadata("import_id", &joint.import_id.to_string())
            .with_metadata(
                "bind",
                &format_vec3(skeleton.bind_translation(index).unwrap_or_default().to_array()),
            );
        node.children = children;
        built[index] = Some(node);
    }

    let mut root = TreeNode::new(skeleton.name().to_string(), NodeType::Skeleton)
        .with_metadata("format", &skeleton.format().to_string())
        .with_metadata("joints", &skeleton.len().to_string());
    for index in skeleton.roots() {
        if let Some(node) = built[index].take() {
            root = root.add_child(node);
        }
    }
    root
}

/// Render a tree structure to string
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    render_node(root, &mut output, "", true, 0, options);
    output
}

fn render_node(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) {
    if let Some(max_depth) = options.max_depth
        && depth > max_depth
    {
        return;
    }

    let icon = node.node_type.icon();
    let style = node.node_type.style(options.no_color);
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    output.push_str(&format!(
        "{prefix}{connector}{icon} {}",
        style.apply_to(&node.name)
    ));

    if options.show_metadata && options.compact && !node.metadata.is_empty() {
        let parts: Vec<String> = node
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        output.push_str(&format!(" [{}]", parts.join(", ")));
    }
    output.push('\n');

    let child_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{prefix}{}", if is_last { "    " } else { "│   " })
    };

    if options.show_metadata && !options.compact {
        let meta_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        let bar = if node.children.is_empty() { " " } else { "│" };
        for (key, value) in &node.metadata {
            output.push_str(&format!(
                "{child_prefix}{bar}   {}: {value}\n",
                meta_style.apply_to(key)
            ));
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i == node.children.len() - 1;
        render_node(child, output, &child_prefix, is_last_child, depth + 1, options);
    }
}
