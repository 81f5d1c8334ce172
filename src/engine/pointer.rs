use std::fmt::Debug;

use super::{LayoutContext, TreeNode};
use crate::elements::{ConfigSliceExt, PointerCaptureMode};
use crate::id::Id;
use crate::math::{BoundingBox, Dimensions, Vector2};

/// Drag distance below which a release does not start momentum scrolling.
const MOMENTUM_DRAG_THRESHOLD: f32 = 10.0;
const MOMENTUM_DECAY: f32 = 0.95;
const MOMENTUM_STOP: f32 = 0.1;
/// A drag that stalls for this long restarts its momentum measurement.
const DRAG_STALL_SECONDS: f32 = 0.15;

/// Represents the current state of interaction with an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerDataInteractionState {
    /// The pointer went down during this frame.
    PressedThisFrame,
    /// The pointer has been held down for more than one frame.
    Pressed,
    /// The pointer was let go during this frame.
    ReleasedThisFrame,
    #[default]
    Released,
}

impl PointerDataInteractionState {
    pub fn is_down(self) -> bool {
        matches!(self, Self::PressedThisFrame | Self::Pressed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerData {
    pub position: Vector2,
    pub state: PointerDataInteractionState,
}

/// Scroll state of a clip element as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollContainerData {
    pub scroll_position: Vector2,
    pub scroll_container_dimensions: Dimensions,
    pub content_dimensions: Dimensions,
    pub horizontal: bool,
    pub vertical: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ScrollContainerDataInternal {
    pub element_id: u32,
    /// Index into the layout elements of the frame it was last declared in.
    pub element_index: usize,
    pub declared_generation: u32,
    pub bounding_box: BoundingBox,
    pub content_size: Dimensions,
    pub scroll_position: Vector2,
    pub scroll_origin: Vector2,
    pub pointer_origin: Vector2,
    pub momentum: Vector2,
    pub momentum_time: f32,
    pub pointer_scroll_active: bool,
    pub open_this_frame: bool,
    pub horizontal: bool,
    pub vertical: bool,
}

impl ScrollContainerDataInternal {
    fn max_scroll(&self) -> Vector2 {
        Vector2::new(
            (self.content_size.width - self.bounding_box.width).max(0.0),
            (self.content_size.height - self.bounding_box.height).max(0.0),
        )
    }

    fn clamp_x(&mut self) {
        let max = self.max_scroll().x;
        self.scroll_position.x = self.scroll_position.x.max(-max).min(0.0);
    }

    fn clamp_y(&mut self) {
        let max = self.max_scroll().y;
        self.scroll_position.y = self.scroll_position.y.max(-max).min(0.0);
    }

    fn can_scroll(&self) -> (bool, bool) {
        (
            self.horizontal && self.content_size.width > self.bounding_box.width,
            self.vertical && self.content_size.height > self.bounding_box.height,
        )
    }

    fn release_drag(&mut self) {
        let diff = Vector2::new(
            self.scroll_position.x - self.scroll_origin.x,
            self.scroll_position.y - self.scroll_origin.y,
        );
        if self.momentum_time > 0.0 {
            let scale = self.momentum_time * 25.0;
            if diff.x.abs() > MOMENTUM_DRAG_THRESHOLD {
                self.momentum.x = diff.x / scale;
            }
            if diff.y.abs() > MOMENTUM_DRAG_THRESHOLD {
                self.momentum.y = diff.y / scale;
            }
        }
        self.pointer_scroll_active = false;
        self.pointer_origin = Vector2::ZERO;
        self.scroll_origin = Vector2::ZERO;
        self.momentum_time = 0.0;
    }

    fn apply_momentum(&mut self, wheel_moved: bool) {
        self.scroll_position.x += self.momentum.x;
        self.scroll_position.y += self.momentum.y;
        self.momentum.x *= MOMENTUM_DECAY;
        self.momentum.y *= MOMENTUM_DECAY;
        if self.momentum.x.abs() < MOMENTUM_STOP || wheel_moved {
            self.momentum.x = 0.0;
        }
        if self.momentum.y.abs() < MOMENTUM_STOP || wheel_moved {
            self.momentum.y = 0.0;
        }
        self.clamp_x();
        self.clamp_y();
    }

    fn drag(&mut self, pointer: Vector2, delta_time: f32) {
        if !self.pointer_scroll_active {
            self.pointer_origin = pointer;
            self.scroll_origin = self.scroll_position;
            self.pointer_scroll_active = true;
            return;
        }

        let (horizontal, vertical) = self.can_scroll();
        let mut moved = Vector2::ZERO;
        if horizontal {
            let before = self.scroll_position.x;
            self.scroll_position.x = self.scroll_origin.x + (pointer.x - self.pointer_origin.x);
            self.clamp_x();
            moved.x = self.scroll_position.x - before;
        }
        if vertical {
            let before = self.scroll_position.y;
            self.scroll_position.y = self.scroll_origin.y + (pointer.y - self.pointer_origin.y);
            self.clamp_y();
            moved.y = self.scroll_position.y - before;
        }

        let stalled = moved.x.abs() < MOMENTUM_STOP && moved.y.abs() < MOMENTUM_STOP;
        if stalled && self.momentum_time > DRAG_STALL_SECONDS {
            self.momentum_time = 0.0;
            self.pointer_origin = pointer;
            self.scroll_origin = self.scroll_position;
        } else {
            self.momentum_time += delta_time;
        }
    }
}

impl<C: Clone + Default + Debug> LayoutContext<C> {
    /// Records where the pointer is and whether it is held down, and
    /// hit-tests it against the boxes of the last finished layout.
    ///
    /// Roots are tested top-most first. Inside a root, every element whose
    /// box and clip region contain the point is recorded, parents before
    /// children. A hit on a floating root that captures the pointer hides
    /// everything underneath it.
    pub fn set_pointer_state(&mut self, position: Vector2, is_down: bool) {
        if self.warnings.max_elements_exceeded {
            return;
        }
        self.pointer_info.position = position;
        self.pointer_over_ids.reset();

        for root_index in (0..self.tree_roots.len()).rev() {
            let root = self.tree_roots[root_index];
            self.tree_nodes.reset();
            self.tree_node_visited.reset();
            self.tree_nodes.add(TreeNode {
                element_index: root.element_index,
                ..Default::default()
            });
            self.tree_node_visited.add(false);
            let mut found = false;

            while let Some(&node) = self.tree_nodes.last() {
                let top = self.tree_nodes.len() - 1;
                if self.tree_node_visited[top] {
                    self.tree_nodes.pop();
                    self.tree_node_visited.pop();
                    continue;
                }
                self.tree_node_visited[top] = true;

                let element = self.layout_elements[node.element_index];
                let Some(item) = self.element_map.get(element.id, self.generation) else {
                    self.tree_nodes.pop();
                    self.tree_node_visited.pop();
                    continue;
                };
                let (bounding_box, element_id) = (item.bounding_box, item.element_id);

                let clip_id = self.clip_element_ids[node.element_index];
                let inside_clip = clip_id == 0
                    || self
                        .element_map
                        .get(clip_id, self.generation)
                        .is_some_and(|clip| clip.bounding_box.contains(position));

                if inside_clip && bounding_box.contains(position) {
                    self.pointer_over_ids.add(element_id);
                    found = true;
                }

                if element.text_data.is_some() {
                    continue;
                }
                for i in (0..element.children.len()).rev() {
                    let child = self.layout_element_children[element.children.at(i)];
                    self.tree_nodes.add(TreeNode {
                        element_index: child,
                        ..Default::default()
                    });
                    self.tree_node_visited.add(false);
                }
            }

            let configs = self.layout_elements[root.element_index].configs;
            let captures = self
                .element_configs
                .slice(configs)
                .floating()
                .is_some_and(|f| f.pointer_capture_mode == PointerCaptureMode::Capture);
            if found && captures {
                break;
            }
        }

        use PointerDataInteractionState::*;
        let state = &mut self.pointer_info.state;
        *state = match (is_down, *state) {
            (true, PressedThisFrame) => Pressed,
            (true, Pressed) => Pressed,
            (true, _) => PressedThisFrame,
            (false, ReleasedThisFrame) => Released,
            (false, Released) => Released,
            (false, _) => ReleasedThisFrame,
        };
    }

    /// Drops scroll records of clip elements not declared in the frame that
    /// just ended, so a stale record is never matched to a reused element
    /// index. Returns how many were dropped.
    pub(super) fn retain_declared_scroll_containers(&mut self) -> usize {
        let mut i = 0;
        let mut pruned = 0;
        while i < self.scroll_containers.len() {
            if self.scroll_containers[i].declared_generation != self.generation {
                let _ = self.scroll_containers.swap_remove(i);
                pruned += 1;
                continue;
            }
            i += 1;
        }
        pruned
    }

    /// Advances scroll state by one tick.
    ///
    /// Records of clip elements that were not declared since the last call
    /// are dropped. Momentum left over from a drag is applied and decays.
    /// The wheel delta and, with `enable_drag_scrolling`, a held pointer
    /// scroll the deepest container under the pointer.
    pub fn update_scroll_containers(
        &mut self,
        enable_drag_scrolling: bool,
        scroll_delta: Vector2,
        delta_time: f32,
    ) {
        let pointer_down = self.pointer_info.state.is_down();
        let wheel_moved = !scroll_delta.is_zero();
        let mut deepest: Option<(usize, usize)> = None;

        let mut i = 0;
        let mut pruned = 0;
        while i < self.scroll_containers.len() {
            if !self.scroll_containers[i].open_this_frame {
                // swapped-in record is examined next
                let _ = self.scroll_containers.swap_remove(i);
                pruned += 1;
                continue;
            }
            let container = &mut self.scroll_containers[i];
            container.open_this_frame = false;

            if !pointer_down && container.pointer_scroll_active {
                container.release_drag();
            }
            container.apply_momentum(wheel_moved);

            let element_id = container.element_id;
            if let Some(depth) = self.pointer_over_ids.iter().rposition(|id| id.id == element_id) {
                if deepest.map_or(true, |(best, _)| depth > best) {
                    deepest = Some((depth, i));
                }
            }
            i += 1;
        }
        if pruned > 0 {
            tracing::trace!(pruned, "stale scroll containers removed");
        }

        let Some((_, index)) = deepest else {
            return;
        };
        let pointer = self.pointer_info.position;
        let container = &mut self.scroll_containers[index];
        let (horizontal, vertical) = container.can_scroll();
        if horizontal {
            container.scroll_position.x += scroll_delta.x;
        }
        if vertical {
            container.scroll_position.y += scroll_delta.y;
        }
        if enable_drag_scrolling && pointer_down {
            container.drag(pointer, delta_time);
        }
        if horizontal {
            container.clamp_x();
        }
        if vertical {
            container.clamp_y();
        }
    }

    /// Scroll state of the clip element `id`, if one has been declared.
    pub fn scroll_container_data(&self, id: Id) -> Option<ScrollContainerData> {
        self.scroll_containers
            .iter()
            .find(|c| c.element_id == id.id)
            .map(|c| ScrollContainerData {
                scroll_position: c.scroll_position,
                scroll_container_dimensions: Dimensions::new(
                    c.bounding_box.width,
                    c.bounding_box.height,
                ),
                content_dimensions: c.content_size,
                horizontal: c.horizontal,
                vertical: c.vertical,
            })
    }

    /// Final box of `id` in the latest frame it was declared in.
    pub fn element_data(&self, id: Id) -> Option<BoundingBox> {
        self.element_map
            .get(id.id, self.generation)
            .map(|item| item.bounding_box)
    }

    /// Whether the pointer was over the currently open element, as of the
    /// last call to [`set_pointer_state`](Self::set_pointer_state).
    pub fn hovered(&self) -> bool {
        self.pointer_over(Id {
            id: self.open_element_id(),
            ..Default::default()
        })
    }

    pub fn pointer_over(&self, id: Id) -> bool {
        self.pointer_over_ids.iter().any(|over| over.id == id.id)
    }

    /// Elements under the pointer, top-most root first, parents before children.
    pub fn pointer_over_ids(&self) -> &[Id] {
        self.pointer_over_ids.as_slice()
    }

    pub fn pointer_state(&self) -> PointerData {
        self.pointer_info
    }

    /// Stored scroll position of the open element, zero if it does not clip.
    pub fn scroll_offset(&self) -> Vector2 {
        let open = self.open_element_id();
        self.scroll_containers
            .iter()
            .find(|c| c.element_id == open)
            .map_or(Vector2::ZERO, |c| c.scroll_position)
    }
}
