use std::ops::Deref;

use crate::arena::{Arena, ArenaStr};
use crate::color::Color;
use crate::elements::{BorderWidth, CornerRadius};
use crate::math::BoundingBox;

/// Represents a rectangle with a specified color and corner radii.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rectangle {
    pub color: Color,
    pub corner_radius: CornerRadius,
}

/// One line of laid-out text. Resolve the string with [`RenderCommands::text`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Text {
    pub text: ArenaStr,
    pub color: Color,
    pub font_id: u16,
    pub font_size: u16,
    pub letter_spacing: u16,
    pub line_height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Border {
    pub color: Color,
    pub corner_radius: CornerRadius,
    pub width: BorderWidth,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Image {
    pub background_color: Color,
    pub corner_radius: CornerRadius,
    /// The host's handle for the image.
    pub image: usize,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Custom<C> {
    pub background_color: Color,
    pub corner_radius: CornerRadius,
    pub data: C,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderCommandConfig<C> {
    Rectangle(Rectangle),
    Border(Border),
    Text(Text),
    Image(Image),
    /// Start clipping to the command's bounding box. Always matched by a
    /// later `ScissorEnd`, and properly nested.
    ScissorStart(),
    ScissorEnd(),
    Custom(Custom<C>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderCommand<C> {
    pub bounding_box: BoundingBox,
    pub config: RenderCommandConfig<C>,
    /// Id of the element that produced this command.
    pub id: u32,
    pub z_index: i16,
    pub user_data: usize,
}

impl<C: Default> Default for RenderCommand<C> {
    fn default() -> Self {
        Self {
            bounding_box: BoundingBox::default(),
            config: RenderCommandConfig::ScissorEnd(),
            id: 0,
            z_index: 0,
            user_data: 0,
        }
    }
}

/// The ordered output of one frame. Draw it front to back as given.
pub struct RenderCommands<'a, C> {
    pub(crate) commands: &'a [RenderCommand<C>],
    pub(crate) arena: &'a Arena,
}

impl<'a, C> RenderCommands<'a, C> {
    /// The string a text command draws.
    pub fn text(&self, text: &Text) -> &'a str {
        self.arena.str(text.text)
    }

    pub fn as_slice(&self) -> &'a [RenderCommand<C>] {
        self.commands
    }
}

impl<C> Deref for RenderCommands<'_, C> {
    type Target = [RenderCommand<C>];

    fn deref(&self) -> &Self::Target {
        self.commands
    }
}

impl<'a, C> IntoIterator for &RenderCommands<'a, C> {
    type Item = &'a RenderCommand<C>;
    type IntoIter = std::slice::Iter<'a, RenderCommand<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_resolves_through_arena() {
        let mut arena = Arena::with_capacity(64);
        let handle = arena.alloc_str("label").unwrap();
        let commands = vec![RenderCommand::<()> {
            config: RenderCommandConfig::Text(Text {
                text: handle,
                color: Color::rgb(0.0, 0.0, 0.0),
                font_id: 0,
                font_size: 16,
                letter_spacing: 0,
                line_height: 0,
            }),
            ..Default::default()
        }];
        let output = RenderCommands {
            commands: &commands,
            arena: &arena,
        };
        assert_eq!(output.len(), 1);
        match &output[0].config {
            RenderCommandConfig::Text(text) => assert_eq!(output.text(text), "label"),
            _ => panic!("Expected Text config"),
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn rectangle_command_serializes() {
        let command = RenderCommand::<()> {
            bounding_box: BoundingBox::new(1.0, 2.0, 3.0, 4.0),
            config: RenderCommandConfig::Rectangle(Rectangle {
                color: Color::rgb(1.0, 2.0, 3.0),
                corner_radius: CornerRadius::default(),
            }),
            id: 9,
            z_index: 0,
            user_data: 0,
        };
        let json = serde_json::to_string(&command).unwrap();
        let back: RenderCommand<()> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, command);
    }
}
