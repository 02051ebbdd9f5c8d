//! HTML output for content trees.

use slidemark_core::{ContentNode, Properties, Root};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

/// Serializes the document to HTML.
pub fn to_html(root: &Root) -> String {
    let mut output = String::new();
    for node in &root.children {
        write_node(node, &mut output);
    }
    output
}

/// Serializes a single node to HTML.
pub fn node_to_html(node: &ContentNode) -> String {
    let mut output = String::new();
    write_node(node, &mut output);
    output
}

fn write_node(node: &ContentNode, output: &mut String) {
    match node {
        ContentNode::Text(text) => output.push_str(&html_escape::encode_text(&text.value)),
        ContentNode::Element(element) => write_element(
            &element.tag,
            &element.properties,
            &element.children,
            output,
        ),
        // Unclaimed directives pass through under their own name.
        ContentNode::Directive(directive) => write_element(
            &directive.name,
            &directive.attributes,
            &directive.children,
            output,
        ),
    }
}

fn write_element(tag: &str, properties: &Properties, children: &[ContentNode], output: &mut String) {
    output.push('<');
    output.push_str(tag);
    for (name, value) in properties {
        output.push(' ');
        output.push_str(name);
        if !value.is_empty_string() {
            output.push_str("=\"");
            output.push_str(&html_escape::encode_double_quoted_attribute(&value.to_string()));
            output.push('"');
        }
    }
    output.push('>');

    if VOID_ELEMENTS.contains(&tag) {
        return;
    }

    for child in children {
        write_node(child, output);
    }
    output.push_str("</");
    output.push_str(tag);
    output.push('>');
}
