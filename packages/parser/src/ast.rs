use serde::{Deserialize, Serialize};

/// Root document node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Whether future edits should be captured as tracked revisions
    pub track_revisions: bool,
    pub paragraphs: Vec<Paragraph>,
}

/// A paragraph: an ordered sequence of content nodes.
///
/// Child order is the visible reading order and is preserved through
/// every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Paragraph style name (`w:pStyle`), e.g. `Heading1`
    pub style: Option<String>,
    pub children: Vec<Node>,
}

/// Paragraph content node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    /// Ordinary run, not tracked
    Run(Run),

    /// Proposed addition (`w:ins` wrapper)
    Insertion(InsertionNode),

    /// Proposed removal (`w:del` wrapper); the text is retained until resolved
    Deletion(DeletionNode),
}

/// Leaf text carrier (`w:r`/`w:t`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
}

/// Leaf carrier for text pending deletion (`w:delText`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedRun {
    pub text: String,
}

/// Insertion revision wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertionNode {
    pub id: String,
    pub author: String,
    pub date: String,
    pub runs: Vec<Run>,
}

/// Deletion revision wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionNode {
    pub id: String,
    pub author: String,
    pub date: String,
    pub runs: Vec<DeletedRun>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            track_revisions: false,
            paragraphs: Vec::new(),
        }
    }

    /// Find a revision wrapper by id anywhere in the document
    pub fn find_revision(&self, id: &str) -> Option<&Node> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.children.iter())
            .find(|node| node.revision_id() == Some(id))
    }

    /// Largest numeric revision id currently present, if any
    pub fn max_revision_id(&self) -> Option<u64> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.children.iter())
            .filter_map(|node| node.revision_id())
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Paragraph {
    pub fn new() -> Self {
        Self {
            style: None,
            children: Vec::new(),
        }
    }

    pub fn with_style(style: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            children: Vec::new(),
        }
    }

    /// Visible text: ordinary runs plus pending insertions, in order.
    /// Text pending deletion is excluded.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Run(run) => text.push_str(&run.text),
                Node::Insertion(ins) => {
                    for run in &ins.runs {
                        text.push_str(&run.text);
                    }
                }
                Node::Deletion(_) => {}
            }
        }
        text
    }

    /// Remove all content nodes, keeping the paragraph style
    pub fn clear_content(&mut self) {
        self.children.clear();
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// The revision id carried by this node, if it is a revision wrapper
    pub fn revision_id(&self) -> Option<&str> {
        match self {
            Node::Run(_) => None,
            Node::Insertion(ins) => Some(&ins.id),
            Node::Deletion(del) => Some(&del.id),
        }
    }
}

impl InsertionNode {
    /// Concatenation of all run text under this wrapper, in document order
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

impl DeletionNode {
    /// Concatenation of all deleted-run text under this wrapper, in document order
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_text_excludes_deletions() {
        let mut paragraph = Paragraph::new();
        paragraph.children.push(Node::Run(Run {
            text: "Hello ".to_string(),
        }));
        paragraph.children.push(Node::Deletion(DeletionNode {
            id: "1".to_string(),
            author: "Agent".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            runs: vec![DeletedRun {
                text: "cruel ".to_string(),
            }],
        }));
        paragraph.children.push(Node::Insertion(InsertionNode {
            id: "2".to_string(),
            author: "Agent".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            runs: vec![Run {
                text: "world".to_string(),
            }],
        }));

        assert_eq!(paragraph.text(), "Hello world");
    }

    #[test]
    fn test_node_json_shape_is_tagged() {
        let node = Node::Insertion(InsertionNode {
            id: "3".to_string(),
            author: "Agent".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            runs: vec![Run {
                text: "new".to_string(),
            }],
        });

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "Insertion");
        assert_eq!(json["id"], "3");

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_max_revision_id() {
        let mut doc = Document::new();
        let mut paragraph = Paragraph::new();
        paragraph.children.push(Node::Insertion(InsertionNode {
            id: "7".to_string(),
            author: "Agent".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            runs: vec![],
        }));
        paragraph.children.push(Node::Deletion(DeletionNode {
            id: "12".to_string(),
            author: "Agent".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            runs: vec![],
        }));
        doc.paragraphs.push(paragraph);

        assert_eq!(doc.max_revision_id(), Some(12));
        assert!(doc.find_revision("7").is_some());
        assert!(doc.find_revision("99").is_none());
    }
}
