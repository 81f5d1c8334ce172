use std::fmt::Debug;

use super::{LayoutContext, LayoutElement, TreeNode, TreeRoot};
use crate::elements::{ConfigSliceExt, CornerRadius, ElementConfig, SharedConfig};
use crate::errors::ErrorType;
use crate::id::hash_number;
use crate::layout::LayoutDirection;
use crate::math::{BoundingBox, Vector2};
use crate::render_commands::{
    Border, Custom, Image, Rectangle, RenderCommand, RenderCommandConfig, Text,
};
use crate::text::TextConfig;

/// Id of the scissor end closing a floating root's clip region.
fn root_scissor_end_id(element_id: u32, clip_element_id: u32) -> u32 {
    hash_number(element_id, clip_element_id.wrapping_add(1)).id
}

impl<C: Clone + Default + Debug> LayoutContext<C> {
    /// Appends `command`, returning false if it was dropped for lack of room.
    ///
    /// Every accepted scissor start holds a slot for its end, so running out
    /// of capacity never leaves a scissor region open.
    fn add_render_command(&mut self, command: RenderCommand<C>) -> bool {
        let free = self.render_commands.capacity() - self.render_commands.len();
        let reserved = self.scissor_ends_reserved;
        let accepted = match command.config {
            RenderCommandConfig::ScissorEnd() => {
                self.scissor_ends_reserved = reserved.saturating_sub(1);
                self.render_commands.add(command).is_some()
            }
            RenderCommandConfig::ScissorStart() => {
                let fits = free >= reserved + 2;
                if fits {
                    self.render_commands.add(command);
                    self.scissor_ends_reserved += 1;
                }
                fits
            }
            _ => free > reserved && self.render_commands.add(command).is_some(),
        };
        if !accepted && !self.warnings.max_render_commands_exceeded {
            self.warnings.max_render_commands_exceeded = true;
            self.report(
                ErrorType::ElementsCapacityExceeded,
                "ran out of render command capacity; try raising max_element_count",
            );
        }
        accepted
    }

    /// Where a tree root's top-left corner lands. Floating roots are placed
    /// relative to the box of the element they attach to.
    fn root_position(&self, root: &TreeRoot, element: &LayoutElement) -> Vector2 {
        let Some(floating) = self.element_configs.slice(element.configs).floating() else {
            return Vector2::ZERO;
        };
        let target = self
            .element_map
            .get(root.parent_id, self.generation)
            .map(|item| item.bounding_box)
            .unwrap_or_default();
        let points = floating.attach_points;
        let dimensions = element.dimensions;
        Vector2::new(
            target.x + points.parent_x.lead(target.width) - points.element_x.lead(dimensions.width)
                + floating.offset.x,
            target.y + points.parent_y.lead(target.height) - points.element_y.lead(dimensions.height)
                + floating.offset.y,
        )
    }

    /// Walks every tree root in z order and emits its draw commands, parents
    /// before children, with borders and scissor ends on the way back up.
    pub(super) fn generate_render_commands(&mut self) {
        self.render_commands.reset();
        self.scissor_ends_reserved = 0;

        for root_index in 0..self.tree_roots.len() {
            let root = self.tree_roots[root_index];
            let root_element = self.layout_elements[root.element_index];
            let position = self.root_position(&root, &root_element);

            let mut root_scissor = false;
            if root.clip_element_id != 0 {
                let clip_box = self
                    .element_map
                    .get(root.clip_element_id, self.generation)
                    .map(|item| item.bounding_box);
                if let Some(clip_box) = clip_box {
                    root_scissor = self.add_render_command(RenderCommand {
                        bounding_box: clip_box,
                        config: RenderCommandConfig::ScissorStart(),
                        id: hash_number(root_element.id, root.clip_element_id).id,
                        z_index: root.z_index,
                        user_data: 0,
                    });
                }
            }

            self.tree_nodes.reset();
            self.tree_node_visited.reset();
            self.tree_nodes.add(TreeNode {
                element_index: root.element_index,
                position,
                ..Default::default()
            });
            self.tree_node_visited.add(false);

            while !self.tree_nodes.is_empty() {
                let top = self.tree_nodes.len() - 1;
                if !self.tree_node_visited[top] {
                    self.tree_node_visited[top] = true;
                    self.enter_node(top, root.z_index);
                } else {
                    let node = self.tree_nodes[top];
                    self.tree_nodes.pop();
                    self.tree_node_visited.pop();
                    self.leave_node(&node, root.z_index);
                }
            }

            if root_scissor {
                self.add_render_command(RenderCommand {
                    bounding_box: BoundingBox::default(),
                    config: RenderCommandConfig::ScissorEnd(),
                    id: root_scissor_end_id(root_element.id, root.clip_element_id),
                    z_index: root.z_index,
                    user_data: 0,
                });
            }
        }
    }

    fn enter_node(&mut self, top: usize, z_index: i16) {
        let node = self.tree_nodes[top];
        let element = self.layout_elements[node.element_index];
        let configs = self.element_configs.slice(element.configs);
        let shared = configs.shared().copied().unwrap_or_default();
        let clip = configs.clip().copied();
        let expand = configs.floating().map(|floating| floating.expand);

        let mut bounding_box = BoundingBox::new(
            node.position.x,
            node.position.y,
            element.dimensions.width,
            element.dimensions.height,
        );
        if let Some(expand) = expand {
            bounding_box.x -= expand.width;
            bounding_box.y -= expand.height;
            bounding_box.width += expand.width * 2.0;
            bounding_box.height += expand.height * 2.0;
        }
        self.tree_nodes[top].bounding_box = bounding_box;

        let scroll_container = (0..self.scroll_containers.len()).find(|&i| {
            let container = &self.scroll_containers[i];
            container.declared_generation == self.generation
                && container.element_index == node.element_index
        });
        if let Some(i) = scroll_container {
            self.scroll_containers[i].bounding_box = bounding_box;
        }
        if let Some(item) = self.element_map.get_mut(element.id, self.generation) {
            if item.element_index == node.element_index {
                item.bounding_box = bounding_box;
            }
        }

        let offscreen =
            self.settings.culling_enabled && bounding_box.is_outside(self.layout_dimensions);
        let mut emit_rectangle = shared.background_color.is_visible();

        for i in 0..element.configs.length {
            let config = self.element_configs[element.configs.at(i)].clone();
            match config {
                ElementConfig::Clip(_) => {
                    if !offscreen {
                        self.tree_nodes[top].clipping = self.add_render_command(RenderCommand {
                            bounding_box,
                            config: RenderCommandConfig::ScissorStart(),
                            id: element.id,
                            z_index,
                            user_data: shared.user_data,
                        });
                    }
                }
                ElementConfig::Image(image) => {
                    emit_rectangle = false;
                    if !offscreen {
                        self.add_render_command(RenderCommand {
                            bounding_box,
                            config: RenderCommandConfig::Image(Image {
                                background_color: shared.background_color,
                                corner_radius: shared.corner_radius,
                                image: image.image,
                            }),
                            id: element.id,
                            z_index,
                            user_data: shared.user_data,
                        });
                    }
                }
                ElementConfig::Text(text_config) => {
                    if !offscreen {
                        self.emit_text_lines(&element, bounding_box, &text_config, z_index);
                    }
                }
                ElementConfig::Custom(data) => {
                    emit_rectangle = false;
                    if !offscreen {
                        self.add_render_command(RenderCommand {
                            bounding_box,
                            config: RenderCommandConfig::Custom(Custom {
                                background_color: shared.background_color,
                                corner_radius: shared.corner_radius,
                                data,
                            }),
                            id: element.id,
                            z_index,
                            user_data: shared.user_data,
                        });
                    }
                }
                _ => {}
            }
        }

        if emit_rectangle && !offscreen {
            self.add_render_command(RenderCommand {
                bounding_box,
                config: RenderCommandConfig::Rectangle(Rectangle {
                    color: shared.background_color,
                    corner_radius: shared.corner_radius,
                }),
                id: element.id,
                z_index,
                user_data: shared.user_data,
            });
        }

        if element.text_data.is_some() || element.children.is_empty() {
            return;
        }

        let layout = element.layout;
        let x_along = layout.layout_direction == LayoutDirection::LeftToRight;
        let children = element.children;

        let mut content = ChildExtent::default();
        for i in 0..children.length {
            let child = &self.layout_elements[self.layout_element_children[children.at(i)]];
            content.along += child.dimensions.along(x_along);
            content.across = content.across.max(child.dimensions.along(!x_along));
        }
        content.along += children.length.saturating_sub(1) as f32 * layout.child_gap as f32;

        if let Some(i) = scroll_container {
            let mut content_size = element.dimensions;
            *content_size.along_mut(x_along) = content.along + layout.padding.along(x_along);
            *content_size.along_mut(!x_along) = content.across + layout.padding.along(!x_along);
            self.scroll_containers[i].content_size = content_size;
        }

        let extra_space =
            element.dimensions.along(x_along) - layout.padding.along(x_along) - content.along;
        let mut next_offset = layout.padding.leading(x_along)
            + layout.child_alignment.lead(x_along, extra_space);
        let scroll_offset = clip.map_or(Vector2::ZERO, |clip| clip.child_offset);

        let base = self.tree_nodes.len();
        if !self.tree_nodes.extend_default(children.length)
            || !self.tree_node_visited.extend_default(children.length)
        {
            self.report(ErrorType::InternalError, "render traversal stack overflowed");
            return;
        }

        for i in 0..children.length {
            let child_index = self.layout_element_children[children.at(i)];
            let child = self.layout_elements[child_index];

            let across_space = element.dimensions.along(!x_along)
                - layout.padding.along(!x_along)
                - child.dimensions.along(!x_along);
            let across_offset = layout.padding.leading(!x_along)
                + layout.child_alignment.lead(!x_along, across_space);
            let (offset_x, offset_y) = if x_along {
                (next_offset, across_offset)
            } else {
                (across_offset, next_offset)
            };

            // last child on top of the stack comes out first
            let slot = base + children.length - 1 - i;
            self.tree_nodes[slot] = TreeNode {
                element_index: child_index,
                position: Vector2::new(
                    node.position.x + offset_x + scroll_offset.x,
                    node.position.y + offset_y + scroll_offset.y,
                ),
                ..Default::default()
            };
            self.tree_node_visited[slot] = false;

            next_offset += child.dimensions.along(x_along) + layout.child_gap as f32;
        }
    }

    fn leave_node(&mut self, node: &TreeNode, z_index: i16) {
        let element = self.layout_elements[node.element_index];
        let configs = self.element_configs.slice(element.configs);
        let border = configs.border().copied();
        let shared: SharedConfig = configs.shared().copied().unwrap_or_default();
        let scroll_offset = configs
            .clip()
            .map_or(Vector2::ZERO, |clip| clip.child_offset);
        let bounding_box = node.bounding_box;
        let offscreen =
            self.settings.culling_enabled && bounding_box.is_outside(self.layout_dimensions);

        if let Some(border) = border.filter(|_| !offscreen) {
            let children = element.children;
            self.add_render_command(RenderCommand {
                bounding_box,
                config: RenderCommandConfig::Border(Border {
                    color: border.color,
                    corner_radius: shared.corner_radius,
                    width: border.width,
                }),
                id: hash_number(children.length as u32, element.id).id,
                z_index,
                user_data: shared.user_data,
            });

            let divider = border.width.between_children as f32;
            if divider > 0.0 && border.color.is_visible() {
                let layout = element.layout;
                let x_along = layout.layout_direction == LayoutDirection::LeftToRight;
                let gap = layout.child_gap as f32;
                let mut content = children.length.saturating_sub(1) as f32 * gap;
                for i in 0..children.length {
                    let child_index = self.layout_element_children[children.at(i)];
                    content += self.layout_elements[child_index].dimensions.along(x_along);
                }
                let extra_space =
                    element.dimensions.along(x_along) - layout.padding.along(x_along) - content;
                let mut offset = layout.padding.leading(x_along)
                    + layout.child_alignment.lead(x_along, extra_space);
                for i in 0..children.length {
                    let child_index = self.layout_element_children[children.at(i)];
                    if i > 0 {
                        // centred in the gap before this child
                        let at = offset - gap / 2.0 - divider / 2.0;
                        let bar = if x_along {
                            BoundingBox::new(
                                bounding_box.x + at + scroll_offset.x,
                                bounding_box.y + scroll_offset.y,
                                divider,
                                element.dimensions.height,
                            )
                        } else {
                            BoundingBox::new(
                                bounding_box.x + scroll_offset.x,
                                bounding_box.y + at + scroll_offset.y,
                                element.dimensions.width,
                                divider,
                            )
                        };
                        self.add_render_command(RenderCommand {
                            bounding_box: bar,
                            config: RenderCommandConfig::Rectangle(Rectangle {
                                color: border.color,
                                corner_radius: CornerRadius::default(),
                            }),
                            id: hash_number(children.length as u32 + 1 + i as u32, element.id).id,
                            z_index,
                            user_data: shared.user_data,
                        });
                    }
                    offset += self.layout_elements[child_index].dimensions.along(x_along) + gap;
                }
            }
        }

        if node.clipping {
            self.add_render_command(RenderCommand {
                bounding_box,
                config: RenderCommandConfig::ScissorEnd(),
                id: hash_number(element.id, element.children.length as u32 + 11).id,
                z_index,
                user_data: 0,
            });
        }
    }

    fn emit_text_lines(
        &mut self,
        element: &LayoutElement,
        bounding_box: BoundingBox,
        config: &TextConfig,
        z_index: i16,
    ) {
        let Some(data_index) = element.text_data else {
            return;
        };
        let data = self.text_element_data[data_index];
        let natural_height = data.preferred_dimensions.height;
        let line_height = if config.line_height > 0 {
            config.line_height as f32
        } else {
            natural_height
        };

        let mut y = (line_height - natural_height) / 2.0;
        for i in 0..data.wrapped_lines.length {
            let line = self.wrapped_text_lines[data.wrapped_lines.at(i)];
            if line.line.is_empty() {
                y += line_height;
                continue;
            }
            let x = config
                .alignment
                .lead(bounding_box.width - line.dimensions.width);
            self.add_render_command(RenderCommand {
                bounding_box: BoundingBox::new(
                    bounding_box.x + x,
                    bounding_box.y + y,
                    line.dimensions.width,
                    line.dimensions.height,
                ),
                config: RenderCommandConfig::Text(Text {
                    text: line.line,
                    color: config.color,
                    font_id: config.font_id,
                    font_size: config.font_size,
                    letter_spacing: config.letter_spacing,
                    line_height: config.line_height,
                }),
                id: hash_number(i as u32, element.id).id,
                z_index,
                user_data: config.user_data,
            });
            y += line_height;
        }
    }
}

/// Children's extent along and across the layout direction.
#[derive(Default)]
struct ChildExtent {
    along: f32,
    across: f32,
}
