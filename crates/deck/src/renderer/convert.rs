//! Conversion from markdown-rs mdast to the content tree.

use markdown::mdast::{self, AlignKind, AttributeContent, AttributeValue, Node};
use slidemark_core::{ContentNode, Element, Properties, PropertyValue, Root};
use std::collections::HashMap;

/// Conversion switches.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Give list items written with a `*` bullet the `fragment` class.
    pub fragment_list_items: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            fragment_list_items: true,
        }
    }
}

/// Converts a parsed document.
///
/// `source` must be the exact text that was parsed; list item positions are
/// read from it to tell `*` bullets apart from `-` and `+`.
pub fn mdast_to_content(mdast: &Node, source: &str, options: &ConvertOptions) -> Root {
    let mut definitions = HashMap::new();
    collect_definitions(mdast, &mut definitions);
    let converter = Converter {
        source,
        options: *options,
        definitions,
    };
    Root::new(converter.node(mdast))
}

struct LinkTarget {
    url: String,
    title: Option<String>,
}

fn collect_definitions(node: &Node, definitions: &mut HashMap<String, LinkTarget>) {
    if let Node::Definition(definition) = node {
        definitions
            .entry(definition.identifier.to_lowercase())
            .or_insert_with(|| LinkTarget {
                url: definition.url.clone(),
                title: definition.title.clone(),
            });
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, definitions);
        }
    }
}

struct Converter<'a> {
    source: &'a str,
    options: ConvertOptions,
    definitions: HashMap<String, LinkTarget>,
}

impl Converter<'_> {
    fn nodes(&self, nodes: &[Node]) -> Vec<ContentNode> {
        nodes.iter().flat_map(|node| self.node(node)).collect()
    }

    fn wrap(&self, tag: &str, children: &[Node]) -> Vec<ContentNode> {
        vec![Element::new(tag).children(self.nodes(children)).into()]
    }

    fn node(&self, node: &Node) -> Vec<ContentNode> {
        match node {
            Node::Root(root) => self.nodes(&root.children),
            Node::Text(text) => vec![ContentNode::text(text.value.as_str())],
            Node::Paragraph(paragraph) => self.wrap("p", &paragraph.children),
            Node::Heading(heading) => self.wrap(&format!("h{}", heading.depth), &heading.children),
            Node::Emphasis(emphasis) => self.wrap("em", &emphasis.children),
            Node::Strong(strong) => self.wrap("strong", &strong.children),
            Node::Delete(delete) => self.wrap("del", &delete.children),
            Node::Blockquote(quote) => self.wrap("blockquote", &quote.children),
            Node::InlineCode(code) => vec![
                Element::new("code")
                    .child(ContentNode::text(code.value.as_str()))
                    .into(),
            ],
            Node::Break(_) => vec![Element::new("br").into()],
            Node::ThematicBreak(_) => vec![Element::new("hr").into()],
            Node::Code(code) => vec![self.code(code)],
            Node::Link(link) => vec![link_element(&link.url, link.title.as_deref(), self.nodes(&link.children))],
            Node::Image(image) => vec![image_element(&image.url, &image.alt, image.title.as_deref())],
            Node::LinkReference(reference) => {
                let children = self.nodes(&reference.children);
                match self.definitions.get(&reference.identifier.to_lowercase()) {
                    Some(target) => vec![link_element(&target.url, target.title.as_deref(), children)],
                    None => children,
                }
            }
            Node::ImageReference(reference) => {
                match self.definitions.get(&reference.identifier.to_lowercase()) {
                    Some(target) => vec![image_element(&target.url, &reference.alt, target.title.as_deref())],
                    None => vec![ContentNode::text(reference.alt.as_str())],
                }
            }
            Node::Definition(_) => Vec::new(),
            Node::List(list) => vec![self.list(list)],
            Node::ListItem(item) => vec![self.list_item(item, list_item_loose(item))],
            Node::Table(table) => vec![self.table(table)],
            Node::FootnoteReference(reference) => {
                let id = reference.identifier.to_lowercase();
                let label = reference.label.as_deref().unwrap_or(&reference.identifier);
                vec![
                    Element::new("sup")
                        .child(
                            Element::new("a")
                                .property("href", format!("#fn-{}", id))
                                .property("id", format!("fnref-{}", id))
                                .child(ContentNode::text(label)),
                        )
                        .into(),
                ]
            }
            Node::FootnoteDefinition(definition) => vec![
                Element::new("div")
                    .class("footnote")
                    .property("id", format!("fn-{}", definition.identifier.to_lowercase()))
                    .children(self.nodes(&definition.children))
                    .into(),
            ],
            Node::MdxJsxFlowElement(element) => {
                self.jsx(element.name.as_deref(), &element.attributes, &element.children)
            }
            Node::MdxJsxTextElement(element) => {
                self.jsx(element.name.as_deref(), &element.attributes, &element.children)
            }
            _ => {
                log::warn!("Unhandled markdown node type: {:?}", node);
                Vec::new()
            }
        }
    }

    /// `pre.code-wrapper > code.hljs`, carrying the fence meta as `data-meta`.
    fn code(&self, code: &mdast::Code) -> ContentNode {
        let class = match code.lang.as_deref() {
            Some(lang) if !lang.is_empty() => format!("language-{} hljs", lang),
            _ => "hljs".to_string(),
        };
        let mut element = Element::new("code").property("class", class);
        if let Some(meta) = code.meta.as_deref().filter(|m| !m.is_empty()) {
            element = element.property("data-meta", meta);
        }
        if !code.value.is_empty() {
            element = element.child(ContentNode::text(format!("{}\n", code.value)));
        }
        Element::new("pre")
            .class("code-wrapper")
            .child(element)
            .into()
    }

    fn list(&self, list: &mdast::List) -> ContentNode {
        let loose = list.spread
            || list.children.iter().any(|child| match child {
                Node::ListItem(item) => list_item_loose(item),
                _ => false,
            });

        let mut element = Element::new(if list.ordered { "ol" } else { "ul" });
        if list.ordered
            && let Some(start) = list.start.filter(|start| *start != 1)
        {
            element = element.property("start", PropertyValue::Number(f64::from(start)));
        }

        let has_tasks = list
            .children
            .iter()
            .any(|child| matches!(child, Node::ListItem(item) if item.checked.is_some()));
        if has_tasks {
            element = element.class("contains-task-list");
        }

        let items = list.children.iter().flat_map(|child| match child {
            Node::ListItem(item) => vec![self.list_item(item, loose)],
            other => self.node(other),
        });
        element.children(items).into()
    }

    fn list_item(&self, item: &mdast::ListItem, loose: bool) -> ContentNode {
        let mut children: Vec<ContentNode> = Vec::new();
        for child in &item.children {
            match child {
                Node::Paragraph(paragraph) if !loose => {
                    children.extend(self.nodes(&paragraph.children));
                }
                other => children.extend(self.node(other)),
            }
        }

        let mut element = Element::new("li");
        if let Some(checked) = item.checked {
            let mut checkbox = Element::new("input")
                .property("type", "checkbox")
                .property("disabled", "");
            if checked {
                checkbox = checkbox.property("checked", "");
            }
            match children.first_mut() {
                Some(ContentNode::Element(paragraph)) if paragraph.tag == "p" => {
                    paragraph.children.insert(0, checkbox.into());
                }
                _ => children.insert(0, checkbox.into()),
            }
            element = element.class("task-list-item");
        }

        if self.options.fragment_list_items && self.starts_with_star(item) {
            element = element.class("fragment");
        }

        element.children(children).into()
    }

    fn starts_with_star(&self, item: &mdast::ListItem) -> bool {
        item.position
            .as_ref()
            .and_then(|position| self.source.get(position.start.offset..))
            .is_some_and(|rest| rest.starts_with('*'))
    }

    fn table(&self, table: &mdast::Table) -> ContentNode {
        let mut rows = table.children.iter().filter_map(|row| match row {
            Node::TableRow(row) => Some(row),
            _ => None,
        });

        let mut element = Element::new("table");
        if let Some(head) = rows.next() {
            element = element.child(
                Element::new("thead").child(self.table_row(head, "th", &table.align)),
            );
        }
        let body: Vec<ContentNode> = rows
            .map(|row| self.table_row(row, "td", &table.align).into())
            .collect();
        if !body.is_empty() {
            element = element.child(Element::new("tbody").children(body));
        }
        element.into()
    }

    fn table_row(&self, row: &mdast::TableRow, cell_tag: &str, aligns: &[AlignKind]) -> Element {
        let cells = row.children.iter().enumerate().filter_map(|(i, cell)| {
            let Node::TableCell(cell) = cell else {
                return None;
            };
            let mut element = Element::new(cell_tag);
            let align = match aligns.get(i) {
                Some(AlignKind::Left) => Some("left"),
                Some(AlignKind::Right) => Some("right"),
                Some(AlignKind::Center) => Some("center"),
                Some(AlignKind::None) | None => None,
            };
            if let Some(align) = align {
                element = element.property("align", align);
            }
            Some(element.children(self.nodes(&cell.children)).into())
        });
        Element::new("tr").children(cells)
    }

    /// JSX elements become plain elements; `<>` fragments splice their children.
    fn jsx(
        &self,
        name: Option<&str>,
        attributes: &[AttributeContent],
        children: &[Node],
    ) -> Vec<ContentNode> {
        let children = self.nodes(children);
        let Some(tag) = name else {
            return children;
        };

        let mut properties = Properties::new();
        for attribute in attributes {
            match attribute {
                AttributeContent::Property(property) => match &property.value {
                    Some(AttributeValue::Literal(value)) => {
                        properties.insert(property.name.clone(), value.as_str().into());
                    }
                    None => {
                        properties.insert(property.name.clone(), "".into());
                    }
                    Some(AttributeValue::Expression(_)) => {
                        log::debug!("dropping expression attribute '{}' on <{}>", property.name, tag);
                    }
                },
                AttributeContent::Expression(_) => {
                    log::debug!("dropping spread attribute on <{}>", tag);
                }
            }
        }

        vec![
            Element {
                tag: tag.to_string(),
                properties,
                children,
            }
            .into(),
        ]
    }
}

fn list_item_loose(item: &mdast::ListItem) -> bool {
    item.spread || item.children.len() > 1
}

fn link_element(url: &str, title: Option<&str>, children: Vec<ContentNode>) -> ContentNode {
    let mut element = Element::new("a").property("href", url);
    if let Some(title) = title {
        element = element.property("title", title);
    }
    element.children(children).into()
}

fn image_element(url: &str, alt: &str, title: Option<&str>) -> ContentNode {
    let mut element = Element::new("img").property("src", url).property("alt", alt);
    if let Some(title) = title {
        element = element.property("title", title);
    }
    element.into()
}
