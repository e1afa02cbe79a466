use crate::model::config::DEFAULT_ROOT_LABEL;
use crate::model::task::{Task, TaskId};
use crate::ops::task_store::TaskStore;

/// A node in the category tree: root, a category, or a subcategory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub name: String,
    /// Tasks attached directly to this node, in indexing order
    pub tasks: Vec<TaskId>,
    /// Child nodes, in creation order. Names are unique among siblings.
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn new(name: impl Into<String>) -> Self {
        CategoryNode {
            name: name.into(),
            tasks: Vec::new(),
            children: Vec::new(),
        }
    }

    /// First child with this exact name
    pub fn child(&self, name: &str) -> Option<&CategoryNode> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_or_insert(&mut self, name: &str) -> &mut CategoryNode {
        let idx = match self.children.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.children.push(CategoryNode::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }
}

/// Secondary index of tasks by category, then subcategory.
///
/// Indexing is one-way: a task stays under the category and subcategory it had
/// when it was indexed, and nodes are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTree {
    root: CategoryNode,
}

impl Default for CategoryTree {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_LABEL)
    }
}

impl CategoryTree {
    pub fn new(root_label: impl Into<String>) -> Self {
        CategoryTree {
            root: CategoryNode::new(root_label),
        }
    }

    pub fn root(&self) -> &CategoryNode {
        &self.root
    }

    /// Attach `id` under `task.category` / `task.subcategory`, creating either
    /// node if missing.
    pub fn index(&mut self, id: TaskId, task: &Task) {
        self.root
            .child_or_insert(&task.category)
            .child_or_insert(&task.subcategory)
            .tasks
            .push(id);
    }

    /// Depth-first, pre-order walk: each node, then its own tasks one level
    /// deeper, then its children in order. Lazy and restartable.
    pub fn render(&self) -> Render<'_> {
        Render {
            stack: vec![(0, &self.root)],
            tasks: None,
        }
    }

    /// The walk as indented text, two spaces per level.
    ///
    /// Tasks that are no longer live in `store` are skipped; their nodes stay.
    pub fn render_text<'a>(
        &'a self,
        store: &'a TaskStore,
        date_format: &'a str,
    ) -> impl Iterator<Item = String> + 'a {
        self.render().filter_map(move |line| {
            let text = match line.item {
                RenderItem::Node(name) => name.to_string(),
                RenderItem::Task(id) if store.is_live(id) => store.get(id)?.summary(date_format),
                RenderItem::Task(_) => return None,
            };
            Some(format!("{}{}", "  ".repeat(line.depth), text))
        })
    }
}

/// One line of the category walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLine<'a> {
    pub depth: usize,
    pub item: RenderItem<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderItem<'a> {
    Node(&'a str),
    Task(TaskId),
}

/// Iterator returned by [`CategoryTree::render`]
pub struct Render<'a> {
    stack: Vec<(usize, &'a CategoryNode)>,
    /// Remaining direct tasks of the last node yielded, with their depth
    tasks: Option<(usize, std::slice::Iter<'a, TaskId>)>,
}

impl<'a> Iterator for Render<'a> {
    type Item = RenderLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((depth, tasks)) = &mut self.tasks {
            if let Some(&id) = tasks.next() {
                return Some(RenderLine {
                    depth: *depth,
                    item: RenderItem::Task(id),
                });
            }
            self.tasks = None;
        }

        let (depth, node) = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        self.tasks = Some((depth + 1, node.tasks.iter()));
        Some(RenderLine {
            depth,
            item: RenderItem::Node(&node.name),
        })
    }
}
