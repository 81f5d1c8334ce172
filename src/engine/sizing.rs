use std::fmt::Debug;

use super::{float_equal, LayoutContext, TreeNode, WrappedTextLine, EPSILON, MAXFLOAT};
use crate::array::ArrayView;
use crate::elements::ConfigSliceExt;
use crate::errors::ErrorType;
use crate::layout::{LayoutDirection, SizingType};
use crate::math::Dimensions;
use crate::text::{wrap_words, WrapMode};

impl<C: Clone + Default + Debug> LayoutContext<C> {
    /// Runs every pass over the closed tree and fills the render command list.
    pub(super) fn calculate_final_layout(&mut self) {
        self.size_containers_along_axis(true);
        self.wrap_text();

        // Width is final now; derive heights for aspect-locked elements.
        for i in 0..self.aspect_ratio_elements.len() {
            let index = self.aspect_ratio_elements[i];
            let element = self.layout_elements[index];
            let Some(ratio) = self.element_configs.slice(element.configs).aspect() else {
                continue;
            };
            let element = &mut self.layout_elements[index];
            element.dimensions.height = element.dimensions.width / ratio;
            element.layout.sizing.height.min_max.max = element.dimensions.height;
        }

        self.propagate_sizes_up_tree();
        self.size_containers_along_axis(false);

        for i in 0..self.aspect_ratio_elements.len() {
            let index = self.aspect_ratio_elements[i];
            let element = self.layout_elements[index];
            let Some(ratio) = self.element_configs.slice(element.configs).aspect() else {
                continue;
            };
            let element = &mut self.layout_elements[index];
            element.dimensions.width = ratio * element.dimensions.height;
        }

        self.sort_tree_roots_by_z();
        self.generate_render_commands();
    }

    /// Stable bubble sort: roots with equal z keep declaration order.
    fn sort_tree_roots_by_z(&mut self) {
        let roots = self.tree_roots.as_mut_slice();
        let mut sorted = roots.len().saturating_sub(1);
        while sorted > 0 {
            for i in 0..sorted {
                if roots[i + 1].z_index < roots[i].z_index {
                    roots.swap(i, i + 1);
                }
            }
            sorted -= 1;
        }
    }

    /// Resolves sizes along one axis for every tree, parents before children.
    pub(super) fn size_containers_along_axis(&mut self, x_axis: bool) {
        for root_index in 0..self.tree_roots.len() {
            let root = self.tree_roots[root_index];
            let root_element = self.layout_elements[root.element_index];
            let sizing = *root_element.layout.sizing.along(x_axis);

            let is_floating = self
                .element_configs
                .slice(root_element.configs)
                .floating()
                .is_some();
            if is_floating {
                let parent_index = self
                    .element_map
                    .get(root.parent_id, self.generation)
                    .map(|item| item.element_index);
                if let Some(parent_index) = parent_index {
                    let parent_size = self.layout_elements[parent_index].dimensions.along(x_axis);
                    let size = self.layout_elements[root.element_index]
                        .dimensions
                        .along_mut(x_axis);
                    match sizing.type_ {
                        SizingType::Grow => *size = parent_size,
                        SizingType::Percent => *size = parent_size * sizing.percent,
                        _ => {}
                    }
                }
            }

            if sizing.type_ != SizingType::Percent {
                let size = self.layout_elements[root.element_index]
                    .dimensions
                    .along_mut(x_axis);
                *size = size.max(sizing.min_max.min).min(sizing.min_max.max);
            }

            self.element_index_buffer.reset();
            self.element_index_buffer.add(root.element_index);
            let mut i = 0;
            while i < self.element_index_buffer.len() {
                let parent_index = self.element_index_buffer[i];
                i += 1;
                self.size_children_along_axis(parent_index, x_axis);
            }
        }
    }

    fn size_children_along_axis(&mut self, parent_index: usize, x_axis: bool) {
        let parent = self.layout_elements[parent_index];
        let layout = parent.layout;
        let parent_size = parent.dimensions.along(x_axis);
        let parent_padding = layout.padding.along(x_axis);
        let along = layout.layout_direction.is_along(x_axis);
        let parent_clips = self
            .element_configs
            .slice(parent.configs)
            .clip()
            .is_some_and(|clip| clip.along(x_axis));
        let gap = layout.child_gap as f32;

        let mut inner_content_size = 0.0f32;
        let mut total_padding_and_gaps = parent_padding;
        let mut grow_count = 0;
        self.resizable_buffer.reset();

        for offset in 0..parent.children.length {
            let child_index = self.layout_element_children[parent.children.at(offset)];
            let child = self.layout_elements[child_index];
            let sizing = *child.layout.sizing.along(x_axis);
            let size = child.dimensions.along(x_axis);
            let text = self.element_configs.slice(child.configs).text();
            let is_text = text.is_some();
            let wraps = text.is_some_and(|config| config.wrap_mode == WrapMode::Words);

            if !is_text && child.children.length > 0 {
                self.element_index_buffer.add(child_index);
            }
            if sizing.type_ != SizingType::Percent
                && sizing.type_ != SizingType::Fixed
                && (!is_text || wraps)
            {
                self.resizable_buffer.add(child_index);
            }

            if along {
                if sizing.type_ != SizingType::Percent {
                    inner_content_size += size;
                }
                if sizing.type_ == SizingType::Grow {
                    grow_count += 1;
                }
                if offset > 0 {
                    inner_content_size += gap;
                    total_padding_and_gaps += gap;
                }
            } else {
                inner_content_size = inner_content_size.max(size);
            }
        }

        for offset in 0..parent.children.length {
            let child_index = self.layout_element_children[parent.children.at(offset)];
            let sizing = *self.layout_elements[child_index].layout.sizing.along(x_axis);
            if sizing.type_ != SizingType::Percent {
                continue;
            }
            let size = (parent_size - total_padding_and_gaps) * sizing.percent;
            *self.layout_elements[child_index].dimensions.along_mut(x_axis) = size;
            if along {
                inner_content_size += size;
            }
            self.update_aspect_ratio_box(child_index);
        }

        if along {
            let size_to_distribute = parent_size - parent_padding - inner_content_size;
            if size_to_distribute < 0.0 {
                // content scrolls instead
                if parent_clips {
                    return;
                }
                self.compress_children(x_axis, size_to_distribute);
            } else if size_to_distribute > 0.0 && grow_count > 0 {
                self.grow_children(x_axis, size_to_distribute);
            }
        } else {
            for i in 0..self.resizable_buffer.len() {
                let child_index = self.resizable_buffer[i];
                let child = &mut self.layout_elements[child_index];
                let sizing = *child.layout.sizing.along(x_axis);
                let min_size = child.min_dimensions.along(x_axis);
                let size = child.dimensions.along_mut(x_axis);

                let mut max_size = parent_size - parent_padding;
                if parent_clips {
                    max_size = max_size.max(inner_content_size);
                }
                if sizing.type_ == SizingType::Grow {
                    *size = max_size.min(sizing.min_max.max);
                }
                *size = min_size.max(size.min(max_size));
            }
        }
    }

    /// Takes `size_to_distribute` (negative) away from the largest resizable
    /// children first, never going under their minimum.
    fn compress_children(&mut self, x_axis: bool, mut size_to_distribute: f32) {
        while size_to_distribute < -EPSILON && !self.resizable_buffer.is_empty() {
            let mut largest = 0.0f32;
            let mut second_largest = 0.0f32;
            let mut width_to_add = size_to_distribute;

            for &child_index in self.resizable_buffer.iter() {
                let size = self.layout_elements[child_index].dimensions.along(x_axis);
                if float_equal(size, largest) {
                    continue;
                }
                if size > largest {
                    second_largest = largest;
                    largest = size;
                }
                if size < largest {
                    second_largest = second_largest.max(size);
                    width_to_add = second_largest - largest;
                }
            }
            width_to_add = width_to_add.max(size_to_distribute / self.resizable_buffer.len() as f32);

            let mut j = 0;
            while j < self.resizable_buffer.len() {
                let child_index = self.resizable_buffer[j];
                let child = &mut self.layout_elements[child_index];
                let min_size = child.min_dimensions.along(x_axis);
                let size = child.dimensions.along_mut(x_axis);
                let previous = *size;
                if float_equal(previous, largest) {
                    *size += width_to_add;
                    if *size <= min_size {
                        *size = min_size;
                        size_to_distribute -= min_size - previous;
                        let _ = self.resizable_buffer.swap_remove(j);
                        continue;
                    }
                    size_to_distribute -= *size - previous;
                }
                j += 1;
            }
        }
    }

    /// Hands `size_to_distribute` (positive) to the smallest growing children
    /// first, never going over their maximum.
    fn grow_children(&mut self, x_axis: bool, mut size_to_distribute: f32) {
        let mut j = 0;
        while j < self.resizable_buffer.len() {
            let child_index = self.resizable_buffer[j];
            let sizing = self.layout_elements[child_index].layout.sizing.along(x_axis);
            if sizing.type_ == SizingType::Grow {
                j += 1;
            } else {
                let _ = self.resizable_buffer.swap_remove(j);
            }
        }

        while size_to_distribute > EPSILON && !self.resizable_buffer.is_empty() {
            let mut smallest = MAXFLOAT;
            let mut second_smallest = MAXFLOAT;
            let mut width_to_add = size_to_distribute;

            for &child_index in self.resizable_buffer.iter() {
                let size = self.layout_elements[child_index].dimensions.along(x_axis);
                if float_equal(size, smallest) {
                    continue;
                }
                if size < smallest {
                    second_smallest = smallest;
                    smallest = size;
                }
                if size > smallest {
                    second_smallest = second_smallest.min(size);
                    width_to_add = second_smallest - smallest;
                }
            }
            width_to_add = width_to_add.min(size_to_distribute / self.resizable_buffer.len() as f32);

            let mut j = 0;
            while j < self.resizable_buffer.len() {
                let child_index = self.resizable_buffer[j];
                let child = &mut self.layout_elements[child_index];
                let max_size = child.layout.sizing.along(x_axis).min_max.max;
                let size = child.dimensions.along_mut(x_axis);
                let previous = *size;
                if float_equal(previous, smallest) {
                    *size += width_to_add;
                    if *size >= max_size {
                        *size = max_size;
                        size_to_distribute -= max_size - previous;
                        let _ = self.resizable_buffer.swap_remove(j);
                        continue;
                    }
                    size_to_distribute -= *size - previous;
                }
                j += 1;
            }
        }
    }

    /// Breaks every text element into lines at its final width and sets its
    /// height to the line count times the line height.
    pub(super) fn wrap_text(&mut self) {
        let Some(measure) = self.measure_text_fn.as_deref() else {
            return;
        };
        let mut overflowed = false;

        for text_index in 0..self.text_element_data.len() {
            let data = self.text_element_data[text_index];
            let element = self.layout_elements[data.element_index];
            let Some(config) = self.element_configs.slice(element.configs).text().copied() else {
                continue;
            };
            let container_width = element.dimensions.width;
            let line_height = if config.line_height > 0 {
                config.line_height as f32
            } else {
                data.preferred_dimensions.height
            };
            let lines_start = self.wrapped_text_lines.len();

            let single_line = config.wrap_mode == WrapMode::None
                || (!data.measured.contains_newlines
                    && data.preferred_dimensions.width <= container_width);
            if single_line {
                let line = WrappedTextLine {
                    dimensions: Dimensions::new(data.preferred_dimensions.width, line_height),
                    line: data.text,
                };
                overflowed |= self.wrapped_text_lines.add(line).is_none();
            } else {
                let text = self.arena.str(data.text);
                let space_width = measure(" ", &config).width;
                let lines = &mut self.wrapped_text_lines;
                wrap_words(
                    &self.text_cache,
                    data.measured.first_word,
                    text,
                    container_width,
                    &config,
                    space_width,
                    |wrapped| {
                        let line = WrappedTextLine {
                            dimensions: Dimensions::new(wrapped.width, line_height),
                            line: data.text.slice(wrapped.start, wrapped.length),
                        };
                        overflowed |= lines.add(line).is_none();
                    },
                );
            }

            let count = self.wrapped_text_lines.len() - lines_start;
            self.text_element_data[text_index].wrapped_lines = ArrayView {
                start: lines_start,
                length: count,
            };
            self.layout_elements[data.element_index].dimensions.height =
                line_height * count as f32;
        }

        if overflowed && !self.warnings.max_text_lines_exceeded {
            self.warnings.max_text_lines_exceeded = true;
            self.report(
                ErrorType::ElementsCapacityExceeded,
                "wrapped text produced more lines than max_element_count allows",
            );
        }
    }

    /// Recomputes container heights from their children after text wrapping
    /// changed the heights of text leaves. Children are finished before parents.
    pub(super) fn propagate_sizes_up_tree(&mut self) {
        self.tree_nodes.reset();
        self.tree_node_visited.reset();
        for i in 0..self.tree_roots.len() {
            let element_index = self.tree_roots[i].element_index;
            self.tree_nodes.add(TreeNode {
                element_index,
                ..Default::default()
            });
            self.tree_node_visited.add(false);
        }

        while let Some(node) = self.tree_nodes.last().copied() {
            let top = self.tree_nodes.len() - 1;
            let element = self.layout_elements[node.element_index];

            if !self.tree_node_visited[top] {
                self.tree_node_visited[top] = true;
                let is_text = self.element_configs.slice(element.configs).text().is_some();
                if is_text || element.children.is_empty() {
                    self.tree_nodes.pop();
                    self.tree_node_visited.pop();
                    continue;
                }
                for i in 0..element.children.length {
                    let child_index = self.layout_element_children[element.children.at(i)];
                    self.tree_nodes.add(TreeNode {
                        element_index: child_index,
                        ..Default::default()
                    });
                    self.tree_node_visited.add(false);
                }
                continue;
            }

            self.tree_nodes.pop();
            self.tree_node_visited.pop();

            let layout = element.layout;
            let limits = layout.sizing.height.min_max;
            let padding = layout.padding.along(false);
            let mut height = element.dimensions.height;

            if layout.layout_direction == LayoutDirection::LeftToRight {
                for i in 0..element.children.length {
                    let child_index = self.layout_element_children[element.children.at(i)];
                    let child_height = self.layout_elements[child_index].dimensions.height;
                    let with_padding = (child_height + padding).max(height);
                    height = with_padding.max(limits.min).min(limits.max);
                }
            } else {
                let mut content = padding;
                for i in 0..element.children.length {
                    let child_index = self.layout_element_children[element.children.at(i)];
                    content += self.layout_elements[child_index].dimensions.height;
                }
                content += element.children.length.saturating_sub(1) as f32 * layout.child_gap as f32;
                height = content.max(limits.min).min(limits.max);
            }
            self.layout_elements[node.element_index].dimensions.height = height;
        }
    }
}
