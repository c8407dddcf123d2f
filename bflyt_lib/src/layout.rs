//! Generic layout elements for editing pane transforms.
//!
//! This flattens the pane, picture, and text box sections of a [Bflyt]
//! into the fields that layout patches can modify.
use serde::Serialize;

use crate::{
    section::{Section, SectionContent},
    Bflyt,
};

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct LayoutElement {
    /// The pane name.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub position: Position,
    pub size: Size,
    pub scale: Scale,
    pub rotation: Rotation,
    pub visible: bool,
}

/// The section tag of the element.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum ElementKind {
    #[serde(rename = "pan1")]
    Pane,
    #[serde(rename = "pic1")]
    Picture,
    #[serde(rename = "txt1")]
    Text,
}

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LayoutElement {
    /// Project a pane, picture, or text box section.
    /// Returns `None` for texture lists and raw sections.
    pub fn from_section(section: &Section) -> Option<Self> {
        let kind = match &section.content {
            SectionContent::Pane(_) => ElementKind::Pane,
            SectionContent::Picture(_) => ElementKind::Picture,
            SectionContent::Text(_) => ElementKind::Text,
            SectionContent::TextureList(_) | SectionContent::Raw(_) => return None,
        };
        let pane = section.content.pane()?;

        Some(Self {
            id: pane.name.clone(),
            kind,
            position: Position {
                x: pane.position[0],
                y: pane.position[1],
            },
            size: Size {
                width: pane.width,
                height: pane.height,
            },
            scale: Scale {
                x: pane.scale[0],
                y: pane.scale[1],
            },
            rotation: Rotation {
                x: pane.rotation[0],
                y: pane.rotation[1],
                z: pane.rotation[2],
            },
            visible: pane.is_visible(),
        })
    }
}

/// Project all pane, picture, and text box sections in order.
pub fn layout_elements(bflyt: &Bflyt) -> Vec<LayoutElement> {
    bflyt
        .sections
        .iter()
        .filter_map(LayoutElement::from_section)
        .collect()
}
