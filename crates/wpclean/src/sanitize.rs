use std::collections::{HashMap, HashSet};

use ammonia::Builder;
use lazy_static::lazy_static;

use crate::dom::{self, Element, Node};
use crate::policy;

lazy_static! {
    static ref DEFAULT_SANITIZER: Sanitizer = Sanitizer::new();
}

/// Cleans WordPress HTML with the shared sanitizer.
pub fn sanitize(html: &str) -> String {
    DEFAULT_SANITIZER.clean(html)
}

/// Cleans HTML in three steps: whole-element removal on the parsed tree, an
/// ammonia gate built from the same policy, then the remaining passes over
/// the gated tree, which is serialized once at the end.
///
/// The gate only ever removes things. It catches anything the tree passes let
/// through, such as `javascript:` URLs, and guarantees script and style
/// elements cannot reach the output even if the allow-list names them.
/// Element removal runs first because the gate unwraps unknown elements and
/// would keep their content.
pub struct Sanitizer {
    gate: Builder<'static>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self {
            gate: create_secure_gate(),
        }
    }

    pub fn clean(&self, html: &str) -> String {
        if html.is_empty() {
            return String::new();
        }

        let mut nodes = dom::parse_fragment(html);
        remove_disallowed_elements(&mut nodes);
        let gated = self.gate.clean(&dom::serialize(&nodes)).to_string();

        let mut nodes = dom::parse_fragment(&gated);
        filter_attributes(&mut nodes);
        filter_classes(&mut nodes);
        prune_empty_elements(&mut nodes);
        normalize_images(&mut nodes);
        harden_external_links(&mut nodes);
        trim_preformatted_newline(&mut nodes);

        dom::serialize(&nodes)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

fn create_secure_gate() -> Builder<'static> {
    let tags: HashSet<&'static str> = policy::ALLOWED_TAGS
        .iter()
        .copied()
        .filter(|tag| !policy::is_always_removed(tag))
        .collect();
    let attributes: HashSet<&'static str> = policy::ALLOWED_ATTRIBUTES
        .iter()
        .copied()
        .filter(|name| !policy::is_forbidden_attribute(name))
        .collect();

    let mut gate = Builder::default();
    gate.tags(tags)
        .tag_attributes(HashMap::new())
        .generic_attributes(attributes)
        .clean_content_tags(policy::ALWAYS_REMOVED_TAGS.iter().copied().collect())
        // External links get their rel from harden_external_links only.
        .link_rel(None)
        .strip_comments(true);
    gate
}

/// Drops every element outside the allow-list together with its content,
/// and empties allowed elements whose content is never rendered.
pub fn remove_disallowed_elements(nodes: &mut Vec<Node>) {
    nodes.retain(|node| match node {
        Node::Element(el) => {
            let keep = policy::is_allowed_tag(&el.name);
            if !keep {
                log::trace!("removing <{}> element", el.name);
            }
            keep
        }
        Node::Text(_) => true,
    });

    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if policy::is_childless(&el.name) {
                el.children.clear();
            } else {
                remove_disallowed_elements(&mut el.children);
            }
        }
    }
}

pub fn filter_attributes(nodes: &mut [Node]) {
    dom::for_each_element_mut(nodes, &mut |el: &mut Element| {
        el.retain_attrs(|name, _| policy::is_allowed_attribute(name));
    });
}

/// Removes page-builder class tokens. An element left with no tokens loses
/// the attribute instead of keeping `class=""`.
pub fn filter_classes(nodes: &mut [Node]) {
    dom::for_each_element_mut(nodes, &mut |el: &mut Element| {
        let Some(class) = el.attr("class") else {
            return;
        };
        let kept = class
            .split_whitespace()
            .filter(|token| !policy::is_junk_class(token))
            .collect::<Vec<_>>()
            .join(" ");

        if kept.is_empty() {
            el.remove_attr("class");
        } else {
            el.set_attr("class", &kept);
        }
    });
}

/// Post-order, so a parent emptied by pruning its children is caught in the
/// same walk.
pub fn prune_empty_elements(nodes: &mut Vec<Node>) {
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            prune_empty_elements(&mut el.children);
        }
    }

    nodes.retain(|node| match node {
        Node::Element(el) => !(policy::is_prunable(&el.name) && is_empty(el)),
        Node::Text(_) => true,
    });
}

fn is_empty(el: &Element) -> bool {
    el.text_content().trim().is_empty() && !el.has_child_elements() && !el.has_descendant("img")
}

pub fn normalize_images(nodes: &mut [Node]) {
    dom::for_each_element_mut(nodes, &mut |el: &mut Element| {
        if el.name != "img" {
            return;
        }
        el.set_attr("loading", policy::LAZY_LOADING);
        if el.attr("alt").map_or(true, str::is_empty) {
            el.set_attr("alt", policy::FALLBACK_ALT);
        }
    });
}

pub fn harden_external_links(nodes: &mut [Node]) {
    dom::for_each_element_mut(nodes, &mut |el: &mut Element| {
        if el.name != "a" || !el.attr("href").is_some_and(is_external_href) {
            return;
        }
        el.set_attr("target", policy::EXTERNAL_LINK_TARGET);
        el.set_attr("rel", policy::EXTERNAL_LINK_REL);
    });
}

fn is_external_href(href: &str) -> bool {
    let href = href.trim_start().to_ascii_lowercase();
    href.starts_with("http:") || href.starts_with("https:")
}

/// A `pre` can only hold one leading newline that survives a reparse. Drop
/// it so the serialized form parses back to the same text.
fn trim_preformatted_newline(nodes: &mut [Node]) {
    dom::for_each_element_mut(nodes, &mut |el: &mut Element| {
        if !matches!(el.name.as_str(), "pre" | "textarea" | "listing") {
            return;
        }
        if let Some(Node::Text(text)) = el.children.first_mut() {
            if let Some(rest) = text.strip_prefix('\n') {
                *text = rest.to_string();
            }
        }
    });
}
