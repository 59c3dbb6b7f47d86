// src/canvas.rs
//! Host canvas boundary: a retained tree of stacks, text, images and
//! spacers that the host turns into a real widget.
//!
//! Only element order and the size-profile values flowing into it are
//! meaningful here; colors are semantic tokens the host maps to its own
//! palette.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::image_cache::WidgetImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    Primary,
    Secondary,
    Tertiary,
    Accent,
    Success,
    Warning,
    Error,
    New,
    Up,
    Down,
    Unchanged,
    Star,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Weight {
    Regular,
    Medium,
    Semibold,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Font {
    pub weight: Weight,
    pub size: f32,
}

impl Font {
    pub fn regular(size: f32) -> Self {
        Self { weight: Weight::Regular, size }
    }
    pub fn medium(size: f32) -> Self {
        Self { weight: Weight::Medium, size }
    }
    pub fn semibold(size: f32) -> Self {
        Self { weight: Weight::Semibold, size }
    }
    pub fn bold(size: f32) -> Self {
        Self { weight: Weight::Bold, size }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Insets {
    pub top: f32,
    pub leading: f32,
    pub bottom: f32,
    pub trailing: f32,
}

impl Insets {
    pub fn new(top: f32, leading: f32, bottom: f32, trailing: f32) -> Self {
        Self { top, leading, bottom, trailing }
    }

    /// Small pill padding used by badges.
    pub fn badge() -> Self {
        Self::new(2.0, 4.0, 2.0, 4.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub content: String,
    pub font: Font,
    pub color: ColorToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_limit: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

impl Text {
    pub fn new(content: impl Into<String>, font: Font) -> Self {
        Self {
            content: content.into(),
            font,
            color: ColorToken::Primary,
            line_limit: None,
            align: None,
        }
    }

    pub fn color(mut self, color: ColorToken) -> Self {
        self.color = color;
        self
    }

    pub fn line_limit(mut self, n: u8) -> Self {
        self.line_limit = Some(n);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    /// A named system symbol.
    Symbol { name: String },
    Bitmap(Arc<WidgetImage>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub source: ImageSource,
    /// Square edge length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint: Option<ColorToken>,
}

impl Image {
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::from_source(ImageSource::Symbol { name: name.into() })
    }

    pub fn bitmap(img: Arc<WidgetImage>) -> Self {
        Self::from_source(ImageSource::Bitmap(img))
    }

    fn from_source(source: ImageSource) -> Self {
        Self {
            source,
            size: None,
            corner_radius: None,
            tint: None,
        }
    }

    pub fn size(mut self, edge: f32) -> Self {
        self.size = Some(edge);
        self
    }

    pub fn corner_radius(mut self, r: f32) -> Self {
        self.corner_radius = Some(r);
        self
    }

    pub fn tint(mut self, color: ColorToken) -> Self {
        self.tint = Some(color);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stack {
    pub layout: Layout,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub center_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<ColorToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Insets>,
    pub children: Vec<Element>,
}

impl Stack {
    pub fn horizontal() -> Self {
        Self::with_layout(Layout::Horizontal)
    }

    pub fn vertical() -> Self {
        Self::with_layout(Layout::Vertical)
    }

    fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            center_content: false,
            background: None,
            corner_radius: None,
            padding: None,
            children: Vec::new(),
        }
    }

    pub fn centered(mut self) -> Self {
        self.center_content = true;
        self
    }

    /// Filled rounded pill, as used for rating and language badges.
    pub fn badge(mut self, background: ColorToken, corner_radius: f32) -> Self {
        self.background = Some(background);
        self.corner_radius = Some(corner_radius);
        self.padding = Some(Insets::badge());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Stack(Stack),
    Text(Text),
    Image(Image),
    /// Fixed length, or flexible when `None`.
    Spacer { length: Option<f32> },
}

impl From<Stack> for Element {
    fn from(s: Stack) -> Self {
        Element::Stack(s)
    }
}

impl From<Text> for Element {
    fn from(t: Text) -> Self {
        Element::Text(t)
    }
}

impl From<Image> for Element {
    fn from(i: Image) -> Self {
        Element::Image(i)
    }
}

/// Anything that holds child elements: the widget root and stacks.
pub trait Container {
    fn children(&self) -> &[Element];
    fn children_mut(&mut self) -> &mut Vec<Element>;

    fn push(&mut self, el: impl Into<Element>) {
        self.children_mut().push(el.into());
    }

    fn add_spacer(&mut self, length: f32) {
        self.children_mut().push(Element::Spacer {
            length: Some(length),
        });
    }

    fn add_flexible_spacer(&mut self) {
        self.children_mut().push(Element::Spacer { length: None });
    }

    /// Every text content, depth-first.
    fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_texts(self.children(), &mut out);
        out
    }

    /// Every symbol name, depth-first.
    fn symbols(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_symbols(self.children(), &mut out);
        out
    }
}

fn collect_texts<'a>(els: &'a [Element], out: &mut Vec<&'a str>) {
    for el in els {
        match el {
            Element::Text(t) => out.push(&t.content),
            Element::Stack(s) => collect_texts(&s.children, out),
            _ => {}
        }
    }
}

fn collect_symbols<'a>(els: &'a [Element], out: &mut Vec<&'a str>) {
    for el in els {
        match el {
            Element::Image(Image {
                source: ImageSource::Symbol { name },
                ..
            }) => out.push(name),
            Element::Stack(s) => collect_symbols(&s.children, out),
            _ => {}
        }
    }
}

impl Container for Stack {
    fn children(&self) -> &[Element] {
        &self.children
    }
    fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }
}

/// The root canvas handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    pub padding: f32,
    /// Deep link opened when the whole widget is tapped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_after: Option<DateTime<Utc>>,
    pub children: Vec<Element>,
}

impl Widget {
    pub fn new(padding: f32) -> Self {
        Self {
            padding,
            url: None,
            refresh_after: None,
            children: Vec::new(),
        }
    }
}

impl Container for Widget {
    fn children(&self) -> &[Element] {
        &self.children
    }
    fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texts_and_symbols_walk_nested_stacks() {
        let mut w = Widget::new(12.0);
        let mut row = Stack::horizontal().centered();
        row.push(Image::symbol("star.circle.fill").size(14.0).tint(ColorToken::New));
        row.add_spacer(4.0);
        let mut col = Stack::vertical();
        col.push(Text::new("Title", Font::medium(11.0)).line_limit(1));
        col.push(Text::new("Artist", Font::regular(9.0)).color(ColorToken::Secondary));
        row.push(col);
        w.push(row);
        w.add_flexible_spacer();

        assert_eq!(w.texts(), vec!["Title", "Artist"]);
        assert_eq!(w.symbols(), vec!["star.circle.fill"]);
        assert_eq!(w.children.len(), 2);
    }

    #[test]
    fn serializes_with_type_tags() {
        let mut w = Widget::new(14.0);
        w.push(Text::new("Hi", Font::bold(12.0)));
        w.add_spacer(6.0);
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["padding"], 14.0);
        assert_eq!(v["children"][0]["type"], "text");
        assert_eq!(v["children"][0]["font"]["weight"], "bold");
        assert_eq!(v["children"][1]["type"], "spacer");
        assert!(v.get("url").is_none());
    }
}
