use rivet_engine::coords::Vec2;
use rivet_engine::gfx::{Vertex, ViewRect};

use crate::handle::TextureHandle;

/// Immediate-mode geometry waiting for the next flush.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BatchedDraw {
    pub vertices: Vec<Vertex>,
    /// Empty means "draw the vertex list as is".
    pub indices: Vec<u32>,
    /// Already checked against the texture table; re-resolved at flush.
    pub texture: TextureHandle,
    pub translation: Vec2,
    /// View scissor in effect when the geometry was recorded.
    pub scissor: ViewRect,
}

/// FIFO of [`BatchedDraw`]s. Flush order is enqueue order.
#[derive(Debug, Default)]
pub(crate) struct GeometryQueue {
    items: Vec<BatchedDraw>,
}

impl GeometryQueue {
    /// Copies the caller's data into a new entry. Geometry without vertices
    /// draws nothing and is dropped; returns whether an entry was queued.
    pub fn push(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
        translation: Vec2,
        scissor: ViewRect,
    ) -> bool {
        if vertices.is_empty() {
            return false;
        }
        self.items.push(BatchedDraw {
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
            texture,
            translation,
            scissor,
        });
        true
    }

    /// Takes every queued entry, oldest first.
    pub fn take(&mut self) -> Vec<BatchedDraw> {
        std::mem::take(&mut self.items)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
