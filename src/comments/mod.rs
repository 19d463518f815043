//! Comment association
//!
//! Maps comment groups of a parsed file to the syntax nodes they belong to,
//! following the heuristics of Go's `ast.NewCommentMap`, and resolves the
//! documentation of an arbitrary node through its nearest documentable
//! ancestor.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::parser::ast::{CommentGroup, File, NodeId};
use crate::parser::visit::{walk, Node, NodeCategory};

/// Comment groups of one file, indexed by the node that owns them
pub struct CommentIndex<'a> {
    /// Every node of the file in walk order
    nodes: Vec<&'a dyn Node>,
    positions: HashMap<NodeId, usize>,
    map: HashMap<NodeId, Vec<&'a CommentGroup>>,
    /// The declaration each specification belongs to
    spec_owner: HashMap<NodeId, NodeId>,
}

impl<'a> CommentIndex<'a> {
    pub fn build(file: &'a File) -> Self {
        let mut nodes: Vec<&'a dyn Node> = Vec::new();
        let mut spec_owner = HashMap::new();

        walk(file, &mut |node, parent| {
            if node.category() == NodeCategory::Spec {
                if let Some(parent) = parent {
                    spec_owner.insert(node.id(), parent.id());
                }
            }
            nodes.push(node);
        });

        let positions = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id(), index))
            .collect();
        let map = comment_map(&nodes, &file.comments);

        Self {
            nodes,
            positions,
            map,
            spec_owner,
        }
    }

    /// Groups attached directly to a node
    pub fn direct(&self, id: NodeId) -> &[&'a CommentGroup] {
        self.map.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Comment groups documenting `target`, sorted by position.
    ///
    /// Files, fields, statements and declarations use their own groups.
    /// A specification without groups inherits those of its declaration.
    /// Any other node resolves through the innermost field, declaration,
    /// specification or statement enclosing it; on equal distance the one
    /// visited last wins.
    pub fn comments_of(&self, target: NodeId) -> Vec<&'a CommentGroup> {
        let Some(&index) = self.positions.get(&target) else {
            return Vec::new();
        };
        let node = self.nodes[index];

        let mut groups = match node.category() {
            NodeCategory::File | NodeCategory::Field | NodeCategory::Stmt | NodeCategory::Decl => {
                self.direct(target).to_vec()
            }
            NodeCategory::Spec => {
                let mut groups = self.direct(target).to_vec();
                if groups.is_empty() {
                    if let Some(&owner) = self.spec_owner.get(&target) {
                        groups = self.direct(owner).to_vec();
                    }
                }
                groups
            }
            NodeCategory::Expr | NodeCategory::Other => match self.enclosing(node) {
                Some(parent) => self.comments_of(parent),
                None => Vec::new(),
            },
        };

        groups.sort_by_key(|group| group.span.start);
        groups
    }

    /// Rendered documentation of `target`
    pub fn doc_of(&self, target: NodeId, skip_markers: &[String]) -> String {
        stringify(&self.comments_of(target), skip_markers)
    }

    fn enclosing(&self, target: &dyn Node) -> Option<NodeId> {
        let span = target.span();
        let mut best: Option<(usize, NodeId)> = None;

        for node in self.nodes.iter().filter(|n| n.category().is_documentable()) {
            let outer = node.span();
            if !outer.contains(span) {
                continue;
            }
            let delta = span.start - outer.start;
            if best.map_or(true, |(best_delta, _)| delta <= best_delta) {
                best = Some((delta, node.id()));
            }
        }

        best.map(|(_, id)| id)
    }
}

/// Assign every comment group to a node.
///
/// A group goes to the enclosing important node that just ended when it
/// starts on that node's last line, or on the line after it with a blank
/// line separating the group from the next node. The same rule is tried for
/// the previous node, which also takes trailing groups at the end of the
/// file. Everything else documents the node that follows.
fn comment_map<'a>(
    nodes: &[&'a dyn Node],
    comments: &'a [CommentGroup],
) -> HashMap<NodeId, Vec<&'a CommentGroup>> {
    let mut map: HashMap<NodeId, Vec<&'a CommentGroup>> = HashMap::new();
    let mut pending = comments.iter().peekable();
    let mut previous: Option<&'a dyn Node> = None;
    let mut group: Option<&'a dyn Node> = None;
    let mut stack: Vec<&'a dyn Node> = Vec::new();

    for next in nodes.iter().copied().map(Some).chain(std::iter::once(None)) {
        let (next_offset, next_line) = next.map_or((usize::MAX, usize::MAX), |n| {
            (n.span().start, n.span().start_line)
        });

        while let Some(comment) = pending.next_if(|c| c.span.end <= next_offset) {
            if let Some(top) = pop_ended(&mut stack, comment.span.start) {
                group = Some(top);
            }

            let gap_before_next = comment.span.end_line + 1 < next_line;
            let trails = |node: &dyn Node| {
                let end_line = node.span().end_line;
                end_line == comment.span.start_line
                    || (end_line + 1 == comment.span.start_line && gap_before_next)
            };

            let owner = match (group, previous) {
                (Some(g), _) if trails(g) => g,
                (_, Some(p)) if trails(p) || next.is_none() => p,
                _ => match next {
                    Some(n) => n,
                    None => continue,
                },
            };
            map.entry(owner.id()).or_default().push(comment);
        }

        let Some(node) = next else {
            break;
        };
        previous = Some(node);
        if node.category().is_important() {
            pop_ended(&mut stack, node.span().start);
            stack.push(node);
        }
    }

    map
}

/// Pop every node that ended at or before `offset`, returning the last one
fn pop_ended<'a>(stack: &mut Vec<&'a dyn Node>, offset: usize) -> Option<&'a dyn Node> {
    let mut top = None;
    while stack.last().is_some_and(|node| node.span().end <= offset) {
        top = stack.pop();
    }
    top
}

fn directive() -> &'static Regex {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE
        .get_or_init(|| Regex::new(r"^[a-z0-9]+:[a-z0-9]").expect("directive pattern is valid"))
}

/// Whether a `//` comment body (markers removed) is a tool directive such as
/// `go:generate` or `line `
fn is_directive(body: &str) -> bool {
    body.starts_with("line ")
        || body.starts_with("extern ")
        || body.starts_with("export ")
        || directive().is_match(body)
}

/// Text of a comment group.
///
/// Comment markers, the first space of line comments, directives and
/// trailing whitespace are removed. Leading blank lines are dropped and
/// runs of blank lines collapse to one. Non-empty text ends in a newline.
pub fn group_text(group: &CommentGroup) -> String {
    let mut lines: Vec<String> = Vec::new();

    for comment in &group.comments {
        let text = comment.text.as_str();
        let body = if let Some(body) = text.strip_prefix("//") {
            if let Some(stripped) = body.strip_prefix(' ') {
                stripped
            } else if !body.is_empty() && is_directive(body) {
                continue;
            } else {
                body
            }
        } else {
            text.strip_prefix("/*")
                .and_then(|t| t.strip_suffix("*/"))
                .unwrap_or(text)
        };

        lines.extend(
            body.split('\n')
                .map(|line| line.trim_end_matches([' ', '\t', '\n', '\r']).to_string()),
        );
    }

    let mut kept: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if !line.is_empty() || kept.last().is_some_and(|last| !last.is_empty()) {
            kept.push(line);
        }
    }

    if kept.last().is_some_and(|last| !last.is_empty()) {
        kept.push(String::new());
    }
    kept.join("\n")
}

/// Join the text of several groups, dropping lines that start with one of
/// `skip_markers`, and trim the result
pub fn stringify(groups: &[&CommentGroup], skip_markers: &[String]) -> String {
    let mut lines = Vec::new();
    for group in groups {
        let text = group_text(group);
        for line in text.split('\n') {
            if skip_markers.iter().any(|marker| line.starts_with(marker.as_str())) {
                continue;
            }
            lines.push(line.to_string());
        }
    }
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests;
