//! FCPXML document wrapper over a generic attributed XML tree.

use std::path::Path;
use xmltree::{Element, EmitterConfig, XMLNode};

use super::mapper::OriginalClip;
use super::time::parse_seconds;
use super::{Result, TimelineError};

/// An FCPXML project document.
///
/// Only the sequence's clip container ("spine") is ever mutated; resources,
/// formats, and the surrounding library structure pass through untouched.
pub struct FcpxmlDocument {
    root: Element,
}

impl FcpxmlDocument {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Load a document from disk.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::parse(bytes.as_slice())
    }

    /// Parse a document from raw XML bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root = Element::parse(bytes)?;
        Ok(Self { root })
    }

    /// Serialize with stable four-space indentation and write to a new file.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let mut buffer = Vec::new();
        let config = EmitterConfig::new()
            .perform_indent(true)
            .indent_string("    ");
        self.root.write_with_config(&mut buffer, config)?;
        tokio::fs::write(path, buffer).await?;
        Ok(())
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The project's sequence element.
    pub fn sequence(&self) -> Result<&Element> {
        find_descendant(&self.root, "sequence").ok_or(TimelineError::MissingStructure("sequence"))
    }

    /// The sequence's ordered clip container.
    pub fn spine_mut(&mut self) -> Result<&mut Element> {
        let sequence = find_descendant_mut(&mut self.root, "sequence")
            .ok_or(TimelineError::MissingStructure("sequence"))?;
        find_descendant_mut(sequence, "spine").ok_or(TimelineError::MissingStructure("spine"))
    }

    /// Read every asset-clip under the sequence into the lookup table used by
    /// the segment mapper. Clip order is document order.
    pub fn original_clips(&self) -> Result<Vec<OriginalClip>> {
        let sequence = self.sequence()?;
        let mut elements = Vec::new();
        collect_asset_clips(sequence, &mut elements);

        let mut clips = Vec::with_capacity(elements.len());
        for element in elements {
            let source_ref = element
                .attributes
                .get("ref")
                .cloned()
                .ok_or(TimelineError::MissingAttribute {
                    element: "asset-clip",
                    attribute: "ref",
                })?;

            clips.push(OriginalClip {
                source_ref,
                offset_in_output: time_attr(element, "offset")?,
                start_in_source: time_attr(element, "start")?,
                duration: time_attr(element, "duration")?,
                name: element.attributes.get("name").cloned().unwrap_or_default(),
            });
        }

        Ok(clips)
    }

    /// Mutable access to every asset-clip in the document, in document order.
    pub fn asset_clips_mut(&mut self) -> Vec<&mut Element> {
        let mut clips = Vec::new();
        collect_asset_clips_mut(&mut self.root, &mut clips);
        clips
    }
}

/// Missing position attributes default to "0s", matching FCPXML semantics;
/// present but malformed values are fatal.
fn time_attr(element: &Element, attribute: &str) -> Result<f64> {
    match element.attributes.get(attribute) {
        Some(raw) => parse_seconds(raw),
        None => Ok(0.0),
    }
}

fn find_descendant<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    for node in &element.children {
        if let Some(child) = node.as_element() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = find_descendant(child, name) {
                return Some(found);
            }
        }
    }
    None
}

fn find_descendant_mut<'a>(element: &'a mut Element, name: &str) -> Option<&'a mut Element> {
    for node in element.children.iter_mut() {
        if let Some(child) = node.as_mut_element() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = find_descendant_mut(child, name) {
                return Some(found);
            }
        }
    }
    None
}

fn collect_asset_clips<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    for node in &element.children {
        if let Some(child) = node.as_element() {
            if child.name == "asset-clip" {
                out.push(child);
            } else {
                collect_asset_clips(child, out);
            }
        }
    }
}

fn collect_asset_clips_mut<'a>(element: &'a mut Element, out: &mut Vec<&'a mut Element>) {
    for node in element.children.iter_mut() {
        if let Some(child) = node.as_mut_element() {
            if child.name == "asset-clip" {
                out.push(child);
            } else {
                collect_asset_clips_mut(child, out);
            }
        }
    }
}

/// Build a plain element with the given attributes.
pub(crate) fn element_with_attributes(name: &str, attributes: &[(&str, String)]) -> Element {
    let mut element = Element::new(name);
    for (key, value) in attributes {
        element.attributes.insert((*key).to_string(), value.clone());
    }
    element
}

/// Append a child element.
pub(crate) fn push_child(parent: &mut Element, child: Element) {
    parent.children.push(XMLNode::Element(child));
}
